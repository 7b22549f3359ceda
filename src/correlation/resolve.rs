// src/correlation/resolve.rs
// Fallback chain mapping a completion call to a session token

use std::fmt;

use super::identifiers::IdentifierMap;
use super::images::ImageContextTable;
use super::pending::PendingSession;
use super::types::{ExternalId, SessionToken};

/// The three correlation tables, always mutated together under one lock
#[derive(Debug, Default)]
pub struct Tables {
    pub pending: PendingSession,
    pub identifiers: IdentifierMap,
    pub images: ImageContextTable,
}

/// Which rule of the fallback chain produced a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// External id was already bound
    BoundId,
    /// External id was unbound and claimed the pending session
    ClaimedPending,
    /// External id was unbound and bound to the only pending image
    BoundSoleImage,
    /// No external id; a session is pending and exactly one image waits
    AnonymousSoleImage,
    /// Last resort: the newest pending image
    NewestImage,
    /// Nothing matched
    Unresolved,
}

impl ResolutionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoundId => "bound_id",
            Self::ClaimedPending => "claimed_pending",
            Self::BoundSoleImage => "bound_sole_image",
            Self::AnonymousSoleImage => "anonymous_sole_image",
            Self::NewestImage => "newest_image",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub token: Option<SessionToken>,
    pub step: ResolutionStep,
}

impl Resolution {
    fn matched(token: SessionToken, step: ResolutionStep) -> Self {
        Self {
            token: Some(token),
            step,
        }
    }

    fn unresolved() -> Self {
        Self {
            token: None,
            step: ResolutionStep::Unresolved,
        }
    }
}

/// Run the fallback chain against `tables`. First matching rule wins:
///
/// 1. bound external id → its token
/// 2. unbound external id → claim the pending token, else the sole image's
///    token; either way the id is bound
/// 3. no external id, pending token present, exactly one image → that image's token
/// 4. any pending image → the newest one's token
/// 5. nothing
pub fn resolve(tables: &mut Tables, external_id: Option<&ExternalId>) -> Resolution {
    match external_id {
        Some(id) => {
            if let Some(token) = tables.identifiers.get(id) {
                return Resolution::matched(token.clone(), ResolutionStep::BoundId);
            }

            if let Some(token) = tables.pending.claim() {
                let token = tables.identifiers.bind(id.clone(), token);
                return Resolution::matched(token, ResolutionStep::ClaimedPending);
            }

            if let Some(token) = tables.images.sole_token().cloned() {
                let token = tables.identifiers.bind(id.clone(), token);
                return Resolution::matched(token, ResolutionStep::BoundSoleImage);
            }
        }
        None => {
            if tables.pending.is_occupied()
                && let Some(token) = tables.images.sole_token()
            {
                return Resolution::matched(token.clone(), ResolutionStep::AnonymousSoleImage);
            }
        }
    }

    match tables.images.newest_token() {
        Some(token) => Resolution::matched(token.clone(), ResolutionStep::NewestImage),
        None => Resolution::unresolved(),
    }
}
