pub(crate) use chrono::{Duration, SubsecRound, Utc};
pub(crate) use serde_json::{Map, Value};
pub(crate) use walkmate::{
    FeedOrdering, FeedOutcome, FeedSettings, GeoPoint, IdentityProvider, MemoryStore, Post, Record, Service,
    StoreIdentity, User, WalkError,
    errors::StoreError,
    store::{Document, DocumentId, DocumentStore, Query},
};

pub(crate) const PASSWORD: &str = "walkmate";

pub(crate) type TestService = Service<MemoryStore, StoreIdentity<MemoryStore>>;

/// A fresh in-memory world with its own store and session.
pub(crate) struct World {
    pub(crate) store: MemoryStore,
    pub(crate) service: TestService,
}

impl World {
    pub(crate) fn new() -> Self {
        Self::with_feed(FeedSettings::default())
    }

    pub(crate) fn with_feed(feed: FeedSettings) -> Self {
        let store = MemoryStore::new();
        let service = Service::new(store.clone(), StoreIdentity::new(store.clone()), feed);
        Self { store, service }
    }

    /// Registers `name` as `{name}@example.com` and returns the user id. The session is left as it was.
    pub(crate) async fn walker(&self, name: &str) -> String {
        let user = self
            .service
            .create_user(&email(name), PASSWORD, User::new(name))
            .await
            .expect("create user");
        user.id
    }

    /// Switches the session to `name`.
    pub(crate) async fn sign_in(&self, name: &str) {
        self.service.log_out().await;
        assert!(self.service.authenticate(&email(name), PASSWORD).await, "sign in {name}");
    }

    /// Shares a walk as the signed-in user, `minutes_ago` in the past.
    pub(crate) async fn share(&self, title: &str, minutes_ago: i64) -> Post {
        let mut post = Post::draft(title, "", madrid());
        post.created_at = (Utc::now() - Duration::minutes(minutes_ago)).trunc_subsecs(3);
        self.service.try_create_post(post).await.expect("create post")
    }
}

pub(crate) fn email(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

pub(crate) fn madrid() -> GeoPoint {
    GeoPoint::new(40.4168, -3.7038)
}

pub(crate) fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|post| post.title.as_str()).collect()
}
