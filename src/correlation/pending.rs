// src/correlation/pending.rs
// Single-slot registry for the latest unclaimed session token

use super::types::SessionToken;

/// Holds at most one minted token that no conversation has claimed yet.
///
/// Issuing overwrites the slot instead of queueing, so only the most recent
/// credential request can be picked up by an unbound conversation.
#[derive(Debug, Default)]
pub struct PendingSession {
    slot: Option<SessionToken>,
}

impl PendingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and store a fresh token, discarding any unclaimed predecessor
    pub fn issue(&mut self) -> SessionToken {
        let token = SessionToken::mint();
        self.slot = Some(token.clone());
        token
    }

    /// Take the token out of the slot
    pub fn claim(&mut self) -> Option<SessionToken> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&SessionToken> {
        self.slot.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }
}
