//! WalkMate core library.
//!
//! Users record geo-tagged walks, follow each other and read a feed built from the people they
//! follow. The crate holds the data model, the document-store and identity boundaries, and the
//! [`Service`] that aggregates the social graph and feed over them.

extern crate self as walkmate;

pub mod config;
pub mod errors;
pub mod id;
pub mod identity;
pub mod keys;
pub mod models;
pub mod records;
pub mod service;
pub mod store;
pub mod validators;

pub use config::{StoreBackend, WalkmateConfig};
pub use errors::*;
pub use identity::{IdentityProvider, SessionState, StoreIdentity, UserId};
pub use models::{Follow, GeoPoint, Post, User};
pub use records::Record;
pub use service::{FeedOrdering, FeedOutcome, FeedSettings, Service, UserStats};
pub use store::{DocumentStore, MemoryStore, RedisStore};

// Re-export redis types so users don't need to depend on a specific redis version
pub use redis;
pub use redis::aio::ConnectionManager;
