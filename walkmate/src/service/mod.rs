//! Social graph and feed aggregation.
//!
//! [`Service`] is stateless between calls: every operation reads the session from the identity
//! provider and talks to the store. Each operation comes in two forms:
//!
//! - `try_*` returns `Result<_, WalkError>` so callers can tell "nothing" from "failed";
//! - the plain form folds every error into that operation's sentinel (`None`, `false`, `0` or an
//!   empty list), which is what the screens consume.
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let service = Service::new(store.clone(), StoreIdentity::new(store), FeedSettings::default());
//! service.create_user("ann@example.com", "secret1", User::new("Ann")).await;
//! service.authenticate("ann@example.com", "secret1").await;
//! let feed = service.get_feed().await; // None until Ann follows someone
//! ```

mod feed;
mod graph;
mod posts;
mod users;

pub use feed::{FeedOrdering, FeedOutcome, FeedSettings};
pub use graph::UserStats;

use log::{debug, warn};

use crate::{
    errors::WalkError,
    identity::{IdentityProvider, UserId},
    store::DocumentStore,
};

pub struct Service<S, I> {
    store: S,
    identity: I,
    feed: FeedSettings,
}

impl<S, I> Service<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    pub fn new(store: S, identity: I, feed: FeedSettings) -> Self {
        Self { store, identity, feed }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn feed_settings(&self) -> &FeedSettings {
        &self.feed
    }

    /// The session's user id; `None` when signed out. Never fails.
    pub fn current_user_id(&self) -> Option<UserId> {
        self.identity.current_user_id()
    }

    pub fn is_session_active(&self) -> bool {
        self.current_user_id().is_some()
    }

    fn require_session(&self) -> Result<UserId, WalkError> {
        self.identity.current_user_id().ok_or(WalkError::NoActiveSession)
    }

    /// An explicit id wins; otherwise the session's user.
    fn resolve_user_id(&self, user_id: Option<&str>) -> Result<UserId, WalkError> {
        match user_id {
            Some(id) => Ok(id.to_string()),
            None => self.require_session(),
        }
    }
}

/// Collapses a failed operation into its sentinel. A missing session is an expected outcome and
/// only logged at debug.
fn fold<T>(operation: &str, result: Result<T, WalkError>, sentinel: T) -> T {
    match result {
        Ok(value) => value,
        Err(WalkError::NoActiveSession) => {
            debug!("{operation}: no active session");
            sentinel
        }
        Err(err) => {
            warn!("{operation} failed: {err}");
            sentinel
        }
    }
}
