// src/correlation/images.rs
// Session token -> pending image reference, one live entry per token

use indexmap::IndexMap;

use super::types::{ImageReference, SessionToken};

/// Pending images awaiting injection, kept in insertion order.
///
/// Re-recording an image for a token replaces the old reference and moves the
/// entry to the newest position. Entries leave the table only when consumed.
#[derive(Debug, Default)]
pub struct ImageContextTable {
    entries: IndexMap<SessionToken, ImageReference>,
}

impl ImageContextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `image` for `token`, returning the reference it displaced
    pub fn record(&mut self, token: SessionToken, image: ImageReference) -> Option<ImageReference> {
        let previous = self.entries.shift_remove(&token);
        self.entries.insert(token, image);
        previous
    }

    /// Remove and return the entry for `token`
    pub fn take(&mut self, token: &SessionToken) -> Option<ImageReference> {
        self.entries.shift_remove(token)
    }

    pub fn get(&self, token: &SessionToken) -> Option<&ImageReference> {
        self.entries.get(token)
    }

    /// Token of the only entry, if there is exactly one
    pub fn sole_token(&self) -> Option<&SessionToken> {
        if self.entries.len() == 1 {
            self.entries.keys().next()
        } else {
            None
        }
    }

    /// Token of the most recently recorded entry
    pub fn newest_token(&self) -> Option<&SessionToken> {
        self.entries.last().map(|(token, _)| token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
