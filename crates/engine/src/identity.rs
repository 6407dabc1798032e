//! Identity boundary.
//!
//! Every gateway call asks an [`IdentityResolver`] who is calling before it
//! touches the store. The resolver is a blocking precondition: it answers with
//! the signed-in identity or with nothing.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

/// An authenticated user. Rows of every resource are scoped to `username`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

pub trait IdentityResolver: Send + Sync {
    /// Returns the calling identity, or `None` when nobody is signed in.
    fn current_identity(&self) -> Option<Identity>;
}

/// Cloneable handle on the signed-in identity of a session.
///
/// Clones share the same slot, so signing out through one handle is observed by
/// every engine built on another.
#[derive(Clone, Debug, Default)]
pub struct SharedIdentity {
    slot: Arc<RwLock<Option<Identity>>>,
}

impl SharedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(identity))),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(identity);
    }

    /// Clears the slot and returns the identity that was signed in, if any.
    pub fn sign_out(&self) -> Option<Identity> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }
}

impl IdentityResolver for SharedIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
