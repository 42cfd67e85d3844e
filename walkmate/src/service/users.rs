use log::{debug, error, info};

use super::{Service, fold};
use crate::{
    errors::{StoreError, WalkError},
    identity::{IdentityProvider, UserId},
    models::{User, fields, search_keywords},
    records::{self, Record},
    store::{DocumentId, DocumentStore},
};

impl<S, I> Service<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    /// Fetches a user, defaulting to the session's user when `user_id` is omitted.
    pub async fn try_resolve_user(&self, user_id: Option<&str>) -> Result<User, WalkError> {
        let user_id = self.resolve_user_id(user_id)?;
        let document = self
            .store
            .get(User::COLLECTION, &user_id)
            .await?
            .ok_or(WalkError::NotFound { id: Some(user_id) })?;
        Ok(records::from_document(document)?)
    }

    pub async fn resolve_user(&self, user_id: Option<&str>) -> Option<User> {
        fold("resolve_user", self.try_resolve_user(user_id).await.map(Some), None)
    }

    /// Creates the identity, then the profile keyed by the issued id.
    ///
    /// If the profile write fails the identity is deleted again so no credential is left without
    /// a profile.
    pub async fn try_create_user(&self, email: &str, password: &str, profile: User) -> Result<User, WalkError> {
        profile.validate()?;
        let user_id = self.identity.sign_up(email, password).await?;

        let mut user = profile;
        user.set_record_id(user_id.clone());
        user.search_keywords = search_keywords(&user.name);

        if let Err(err) = self.write_profile(&user).await {
            match self.identity.delete_identity(&user_id).await {
                Ok(()) => debug!("rolled back identity {user_id} after failed profile write"),
                Err(rollback) => error!("orphaned identity {user_id}: profile write failed ({err}), rollback failed ({rollback})"),
            }
            return Err(err.into());
        }

        info!("created user {user_id}");
        Ok(user)
    }

    pub async fn create_user(&self, email: &str, password: &str, profile: User) -> Option<User> {
        fold(
            "create_user",
            self.try_create_user(email, password, profile).await.map(Some),
            None,
        )
    }

    async fn write_profile(&self, user: &User) -> Result<String, StoreError> {
        self.store
            .put(
                User::COLLECTION,
                DocumentId::key(user.record_id()),
                records::to_fields(user)?,
            )
            .await
    }

    pub async fn try_authenticate(&self, email: &str, password: &str) -> Result<UserId, WalkError> {
        self.identity.sign_in(email, password).await?;
        self.require_session()
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> bool {
        fold("authenticate", self.try_authenticate(email, password).await.map(|_| true), false)
    }

    pub async fn try_log_out(&self) -> Result<(), WalkError> {
        Ok(self.identity.sign_out().await?)
    }

    pub async fn log_out(&self) -> bool {
        fold("log_out", self.try_log_out().await.map(|_| true), false)
    }

    /// Reopens a persisted session token.
    pub async fn try_resume_session(&self, token: &str) -> Result<UserId, WalkError> {
        Ok(self.identity.resume(token).await?)
    }

    /// Users whose name has `query` as a case-insensitive prefix.
    pub async fn try_search_users(&self, query: &str) -> Result<Vec<User>, WalkError> {
        self.require_session()?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let documents = self
            .store
            .query_array_contains(User::COLLECTION, fields::SEARCH_KEYWORDS, needle.into())
            .await?;
        Ok(records::from_documents(documents)?)
    }

    pub async fn search_users(&self, query: &str) -> Vec<User> {
        fold("search_users", self.try_search_users(query).await, Vec::new())
    }

    /// [`search_users`](Self::search_users) without the session's own user.
    pub async fn search_other_users(&self, query: &str) -> Vec<User> {
        let result = self.try_search_users(query).await.map(|users| {
            let me = self.current_user_id();
            users
                .into_iter()
                .filter(|user| Some(user.id.as_str()) != me.as_deref())
                .collect()
        });
        fold("search_other_users", result, Vec::new())
    }
}
