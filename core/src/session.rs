//! Read access to the caller's authentication state.
//!
//! # Design
//! The client never owns the session. An authentication component elsewhere
//! in the SDK logs users in and out; the client only asks "is there a session
//! right now, and what is its token" once per request. Anything that can
//! answer that question implements `SessionSource`.

use std::sync::{Arc, PoisonError, RwLock};

pub trait SessionSource: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn session_token(&self) -> Option<String>;

    /// The token to attach to a request, if any. Read once per request; later
    /// changes do not affect a request already built.
    fn snapshot(&self) -> Option<String> {
        if self.is_authenticated() {
            self.session_token()
        } else {
            None
        }
    }
}

/// Never authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl SessionSource for NoSession {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn session_token(&self) -> Option<String> {
        None
    }
}

/// A session slot shared between the authentication component (writer) and
/// any number of clients (readers). Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    token: Arc<RwLock<Option<String>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set(token);
        session
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionSource for SharedSession {
    fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn session_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn snapshot(&self) -> Option<String> {
        // Single read so the flag and the token cannot disagree.
        self.session_token()
    }
}

/// Closures returning the current token act as a session source; `Some`
/// means authenticated.
impl<F> SessionSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn is_authenticated(&self) -> bool {
        self().is_some()
    }

    fn session_token(&self) -> Option<String> {
        self()
    }

    fn snapshot(&self) -> Option<String> {
        self()
    }
}
