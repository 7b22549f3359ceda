// src/correlation/mod.rs
// Session correlation: linking credentials, conversations and uploaded images

mod engine;
mod extract;
mod identifiers;
mod images;
mod pending;
mod resolve;
mod splice;
mod store;
mod types;

pub use engine::{Augmented, CorrelationEngine, EngineOptions, Upload};
pub use extract::{
    DEFAULT_CONTAINERS, DEFAULT_ID_FIELDS, IdExtractor, IdProbe, NestedField, TopLevelField,
};
pub use identifiers::IdentifierMap;
pub use images::ImageContextTable;
pub use pending::PendingSession;
pub use resolve::{Resolution, ResolutionStep, Tables, resolve};
pub use splice::{DEFAULT_IMAGE_NOTE, image_message, splice_image_message};
pub use store::{Claim, CorrelationStats, CorrelationStore};
pub use types::{ExternalId, ImageReference, SessionToken};
