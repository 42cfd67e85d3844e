//! Identity provider boundary: credential in, user id and session out.

mod password;
mod store_identity;

pub use password::{hash_password, verify_password};
pub use store_identity::StoreIdentity;

use crate::errors::IdentityError;

pub type UserId = String;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// `NoSession -> Authenticating -> Active -> NoSession`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoSession,
    Authenticating,
    Active { user_id: UserId, token: String },
}

impl SessionState {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            SessionState::Active { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Active { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }
}

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Registers a credential and returns the new user's id. Does not open a session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError>;

    /// Opens a session for the credential's user.
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// The active session's user, if any. Never fails.
    fn current_user_id(&self) -> Option<UserId>;

    /// Snapshot of the session state machine.
    fn session(&self) -> SessionState;

    /// Reopens a session from a token issued by an earlier `sign_in`.
    async fn resume(&self, token: &str) -> Result<UserId, IdentityError>;

    /// Removes a credential; used to undo a sign-up whose profile write failed.
    async fn delete_identity(&self, user_id: &str) -> Result<(), IdentityError>;
}
