// src/correlation/engine.rs
// Per-request correlation: upload recording, resolution, and image injection

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::extract::IdProbe;
use super::resolve::Resolution;
use super::splice::{DEFAULT_IMAGE_NOTE, image_message, splice_image_message};
use super::store::{CorrelationStats, CorrelationStore};
use super::types::{ExternalId, ImageReference, SessionToken};
use crate::error::{IrisError, Result};
use crate::llm::ChatMessage;
use crate::storage::{ImageStore, detect_image, render_image_url};

/// Knobs for how images are accepted and injected
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub max_upload_bytes: usize,
    pub inline_images: bool,
    pub image_note: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            inline_images: false,
            image_note: DEFAULT_IMAGE_NOTE.to_string(),
        }
    }
}

/// Result of augmenting one completion request
#[derive(Debug, Clone)]
pub struct Augmented {
    pub messages: Vec<ChatMessage>,
    pub resolution: Resolution,
    pub injected: Option<ImageReference>,
}

/// A stored upload and the URL it can be fetched from
#[derive(Debug, Clone)]
pub struct Upload {
    pub image: ImageReference,
    pub url: String,
}

pub struct CorrelationEngine {
    store: Arc<CorrelationStore>,
    images: Arc<dyn ImageStore>,
    probe: IdProbe,
    options: EngineOptions,
}

impl CorrelationEngine {
    pub fn new(store: Arc<CorrelationStore>, images: Arc<dyn ImageStore>, options: EngineOptions) -> Self {
        Self {
            store,
            images,
            probe: IdProbe::default(),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn stats(&self) -> CorrelationStats {
        self.store.stats()
    }

    pub fn issue_session(&self) -> SessionToken {
        self.store.issue_session()
    }

    /// Validate and persist an upload, then record it for `token`.
    /// Bytes hit the store before the correlation lock is taken.
    pub async fn upload_image(&self, token: SessionToken, bytes: &[u8]) -> Result<Upload> {
        if bytes.len() > self.options.max_upload_bytes {
            return Err(IrisError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.options.max_upload_bytes,
            });
        }
        let detected = detect_image(bytes)?;
        let image = self.images.save(bytes, &detected).await?;
        let url = self.images.url_for(&image);
        self.store.record_image(token, image.clone());
        Ok(Upload { image, url })
    }

    /// Find the platform's conversation id in a header value or the raw payload
    pub fn external_id(&self, header: Option<&str>, payload: &Value) -> Option<ExternalId> {
        self.probe.probe_with_header(header, payload)
    }

    /// Resolve, consume and splice. Never fails: a missing or unreadable
    /// image leaves the messages as they were.
    pub async fn augment(&self, external_id: Option<&ExternalId>, messages: Vec<ChatMessage>) -> Augmented {
        let claim = self.store.claim_for_completion(external_id);

        let Some(image) = claim.image else {
            return Augmented {
                messages,
                resolution: claim.resolution,
                injected: None,
            };
        };

        match render_image_url(self.images.as_ref(), &image, self.options.inline_images).await {
            Ok(url) => {
                info!(
                    image = %image.name,
                    inline = self.options.inline_images,
                    message_count = messages.len(),
                    "Injecting image into completion"
                );
                let spliced = splice_image_message(messages, image_message(&self.options.image_note, &url));
                Augmented {
                    messages: spliced,
                    resolution: claim.resolution,
                    injected: Some(image),
                }
            }
            Err(e) => {
                warn!(image = %image.name, error = %e, "Stored image unreadable, continuing without it");
                Augmented {
                    messages,
                    resolution: claim.resolution,
                    injected: None,
                }
            }
        }
    }
}
