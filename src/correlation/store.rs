// src/correlation/store.rs
// Process-wide correlation state behind a single lock

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::resolve::{Resolution, Tables, resolve};
use super::types::{ExternalId, ImageReference, SessionToken};

/// Outcome of resolving and consuming in one critical section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub resolution: Resolution,
    pub image: Option<ImageReference>,
}

/// Point-in-time table sizes, for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrelationStats {
    pub pending_session: bool,
    pub bound_ids: usize,
    pub pending_images: usize,
}

/// Owns the pending slot, identifier map and image context table.
///
/// Every method takes the lock once and releases it before returning, so no
/// caller can hold it across an await point.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    tables: Mutex<Tables>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a session token and park it in the pending slot
    pub fn issue_session(&self) -> SessionToken {
        let token = self.lock().pending.issue();
        debug!(session_token = %token, "Session token issued");
        token
    }

    /// Take the pending token, if any
    pub fn claim_pending(&self) -> Option<SessionToken> {
        self.lock().pending.claim()
    }

    /// Record an uploaded image for `token` (last write wins)
    pub fn record_image(&self, token: SessionToken, image: ImageReference) -> Option<ImageReference> {
        let displaced = self.lock().images.record(token.clone(), image.clone());
        info!(
            session_token = %token,
            image = %image.name,
            replaced = ?displaced.as_ref().map(|i| &i.name),
            "Image context recorded"
        );
        displaced
    }

    pub fn resolve_session(&self, external_id: Option<&ExternalId>) -> Option<SessionToken> {
        resolve(&mut self.lock(), external_id).token
    }

    /// Atomically read and delete the pending image for `token`
    pub fn consume_image(&self, token: &SessionToken) -> Option<ImageReference> {
        self.lock().images.take(token)
    }

    /// Resolve a session and consume its image as one atomic unit
    pub fn claim_for_completion(&self, external_id: Option<&ExternalId>) -> Claim {
        let mut tables = self.lock();
        let resolution = resolve(&mut tables, external_id);
        let image = resolution
            .token
            .as_ref()
            .and_then(|token| tables.images.take(token));
        drop(tables);

        info!(
            external_id = ?external_id.map(ExternalId::as_str),
            session_token = ?resolution.token.as_ref().map(SessionToken::as_str),
            step = %resolution.step,
            image = ?image.as_ref().map(|i| &i.name),
            "Completion correlated"
        );

        Claim { resolution, image }
    }

    pub fn stats(&self) -> CorrelationStats {
        let tables = self.lock();
        CorrelationStats {
            pending_session: tables.pending.is_occupied(),
            bound_ids: tables.identifiers.len(),
            pending_images: tables.images.len(),
        }
    }
}
