use std::borrow::Cow;

use thiserror::Error;

/// Failure raised by a [`DocumentStore`](crate::store::DocumentStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is not reachable.
    #[error("store unavailable")]
    Unavailable,

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Failure raised by an [`IdentityProvider`](crate::identity::IdentityProvider).
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid email address: {email}")]
    InvalidEmail { email: String },

    /// Passwords shorter than [`MIN_PASSWORD_LEN`](crate::identity::MIN_PASSWORD_LEN).
    #[error("password is too weak")]
    WeakPassword,

    #[error("email already in use")]
    EmailInUse,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// A persisted session token no longer resolves to a live session.
    #[error("session expired")]
    SessionExpired,

    #[error("password hashing failed: {message}")]
    Hashing { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service-level error taxonomy.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("no active session")]
    NoActiveSession,

    #[error("not found")]
    NotFound { id: Option<String> },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("validation failed")]
    ValidationFailed(#[from] ValidationError),

    /// The session user does not own the targeted record.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error(transparent)]
    Identity(IdentityError),
}

impl From<IdentityError> for WalkError {
    /// Store failures inside the identity provider surface as [`WalkError::StoreUnavailable`].
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Store(store) => WalkError::StoreUnavailable(store),
            other => WalkError::Identity(other),
        }
    }
}

/// Collection of validation issues encountered while preparing a write.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `Ok(())` when no issue was collected.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
