use log::debug;
use serde::{Deserialize, Serialize};

use super::{Service, fold};
use crate::{errors::WalkError, identity::IdentityProvider, models::Post, store::DocumentStore};

/// How the merged feed is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrdering {
    /// Followee by followee, each followee's posts newest first.
    #[default]
    Followee,
    /// Whole feed newest first.
    Recency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeedSettings {
    /// Posts fetched per followee; `None` fetches all of them.
    #[serde(default)]
    pub per_followee_limit: Option<usize>,
    #[serde(default)]
    pub ordering: FeedOrdering,
}

/// Result of a feed read. Following nobody is distinct from followees that have not posted.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    NoFollowees,
    Posts(Vec<Post>),
}

impl FeedOutcome {
    pub fn into_posts(self) -> Option<Vec<Post>> {
        match self {
            FeedOutcome::NoFollowees => None,
            FeedOutcome::Posts(posts) => Some(posts),
        }
    }
}

impl<S, I> Service<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    /// Posts of everyone the session user follows, with exact duplicates dropped.
    ///
    /// Any store failure fails the whole read; no partial feed is returned.
    pub async fn try_get_feed(&self) -> Result<FeedOutcome, WalkError> {
        let me = self.require_session()?;
        let followees = self.try_followee_ids(&me).await?;
        if followees.is_empty() {
            return Ok(FeedOutcome::NoFollowees);
        }

        let mut feed: Vec<Post> = Vec::new();
        for followee in &followees {
            let posts = self.posts_by(followee, self.feed.per_followee_limit).await?;
            for post in posts {
                if !feed.contains(&post) {
                    feed.push(post);
                }
            }
        }

        if self.feed.ordering == FeedOrdering::Recency {
            feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        debug!("feed for {me}: {} posts from {} followees", feed.len(), followees.len());
        Ok(FeedOutcome::Posts(feed))
    }

    /// `None` when the user follows nobody, has no session, or the read failed.
    pub async fn get_feed(&self) -> Option<Vec<Post>> {
        fold(
            "get_feed",
            self.try_get_feed().await.map(FeedOutcome::into_posts),
            None,
        )
    }
}
