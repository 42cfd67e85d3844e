use log::info;
use serde::Serialize;

use super::{Service, fold};
use crate::{
    errors::{ValidationError, WalkError},
    identity::IdentityProvider,
    models::{Follow, Post, fields},
    records::{self, Record},
    store::{DocumentId, DocumentStore},
};

/// Profile header counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

impl<S, I> Service<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    /// Edges pointing at the user.
    pub async fn try_count_followers(&self, user_id: Option<&str>) -> Result<u64, WalkError> {
        self.require_session()?;
        let user_id = self.resolve_user_id(user_id)?;
        Ok(self
            .store
            .count_equals(Follow::COLLECTION, fields::FOLLOWEE, user_id.into())
            .await?)
    }

    pub async fn count_followers(&self, user_id: Option<&str>) -> u64 {
        fold("count_followers", self.try_count_followers(user_id).await, 0)
    }

    /// Edges leaving the user.
    pub async fn try_count_following(&self, user_id: Option<&str>) -> Result<u64, WalkError> {
        self.require_session()?;
        let user_id = self.resolve_user_id(user_id)?;
        Ok(self
            .store
            .count_equals(Follow::COLLECTION, fields::FOLLOWER, user_id.into())
            .await?)
    }

    pub async fn count_following(&self, user_id: Option<&str>) -> u64 {
        fold("count_following", self.try_count_following(user_id).await, 0)
    }

    pub async fn try_is_following(&self, other_user_id: &str) -> Result<bool, WalkError> {
        let me = self.require_session()?;
        let edge = self
            .store
            .get(Follow::COLLECTION, &Follow::edge_id(&me, other_user_id))
            .await?;
        Ok(edge.is_some())
    }

    pub async fn is_following(&self, other_user_id: &str) -> bool {
        fold("is_following", self.try_is_following(other_user_id).await, false)
    }

    /// Writes the edge `{me}_{target}`. Following twice rewrites the same document.
    pub async fn try_follow(&self, target_user_id: &str) -> Result<(), WalkError> {
        let me = self.require_session()?;
        check_target(&me, target_user_id)?;
        let edge = Follow::new(me, target_user_id);
        self.store
            .put(
                Follow::COLLECTION,
                DocumentId::key(edge.record_id()),
                records::to_fields(&edge)?,
            )
            .await?;
        info!("{} now follows {}", edge.follower, edge.followee);
        Ok(())
    }

    pub async fn follow(&self, target_user_id: &str) -> bool {
        fold("follow", self.try_follow(target_user_id).await.map(|_| true), false)
    }

    /// Deletes the edge `{me}_{target}`; a missing edge (including one to yourself) is not an
    /// error.
    pub async fn try_unfollow(&self, target_user_id: &str) -> Result<(), WalkError> {
        let me = self.require_session()?;
        if target_user_id.trim().is_empty() {
            return Err(ValidationError::single("target", "required", "target user id must not be empty").into());
        }
        self.store
            .delete(Follow::COLLECTION, &Follow::edge_id(&me, target_user_id))
            .await?;
        info!("{me} unfollowed {target_user_id}");
        Ok(())
    }

    pub async fn unfollow(&self, target_user_id: &str) -> bool {
        fold("unfollow", self.try_unfollow(target_user_id).await.map(|_| true), false)
    }

    /// Ids of everyone the user follows, in store order.
    pub async fn try_followee_ids(&self, user_id: &str) -> Result<Vec<String>, WalkError> {
        let edges = self
            .store
            .query_equals(Follow::COLLECTION, fields::FOLLOWER, user_id.into())
            .await?;
        let edges: Vec<Follow> = records::from_documents(edges)?;
        Ok(edges.into_iter().map(|edge| edge.followee).collect())
    }

    pub async fn try_user_stats(&self, user_id: Option<&str>) -> Result<UserStats, WalkError> {
        let user_id = self.resolve_user_id(user_id)?;
        Ok(UserStats {
            followers: self.try_count_followers(Some(&user_id)).await?,
            following: self.try_count_following(Some(&user_id)).await?,
            posts: self
                .store
                .count_equals(Post::COLLECTION, fields::CREATOR_ID, user_id.into())
                .await?,
        })
    }

    pub async fn user_stats(&self, user_id: Option<&str>) -> UserStats {
        fold("user_stats", self.try_user_stats(user_id).await, UserStats::default())
    }
}

fn check_target(me: &str, target: &str) -> Result<(), ValidationError> {
    if target.trim().is_empty() {
        return Err(ValidationError::single("target", "required", "target user id must not be empty"));
    }
    if me == target {
        return Err(ValidationError::single("target", "self", "users cannot follow themselves"));
    }
    Ok(())
}
