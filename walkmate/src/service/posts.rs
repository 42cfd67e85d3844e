use log::info;

use super::{Service, fold};
use crate::{
    errors::{ValidationError, WalkError},
    identity::IdentityProvider,
    models::{Post, fields},
    records::{self, Record},
    store::{DocumentId, DocumentStore, Filter, Query, SortOrder},
};

impl<S, I> Service<S, I>
where
    S: DocumentStore,
    I: IdentityProvider,
{
    /// Stores a post under a fresh id and returns it with that id.
    ///
    /// `creator_id` may be left empty (it is filled from the session) but may not name anyone
    /// else.
    pub async fn try_create_post(&self, post: Post) -> Result<Post, WalkError> {
        let user_id = self.require_session()?;
        post.validate()?;

        let mut post = post;
        if post.creator_id.is_empty() {
            post.creator_id = user_id;
        } else if post.creator_id != user_id {
            return Err(WalkError::Forbidden {
                message: "posts can only be created for the signed-in user".to_string(),
            });
        }

        let id = self
            .store
            .put(Post::COLLECTION, DocumentId::Auto, records::to_fields(&post)?)
            .await?;
        post.set_record_id(id);
        info!("user {} created post {}", post.creator_id, post.id);
        Ok(post)
    }

    pub async fn create_post(&self, post: Post) -> bool {
        fold("create_post", self.try_create_post(post).await.map(|_| true), false)
    }

    /// Deletes one of the session user's posts. Deleting a post that is already gone succeeds.
    pub async fn try_delete_post(&self, post: &Post) -> Result<(), WalkError> {
        let user_id = self.require_session()?;
        if post.id.trim().is_empty() {
            return Err(ValidationError::single("id", "required", "post id must not be empty").into());
        }

        let Some(document) = self.store.get(Post::COLLECTION, &post.id).await? else {
            return Ok(());
        };
        let stored: Post = records::from_document(document)?;
        if stored.creator_id != user_id {
            return Err(WalkError::Forbidden {
                message: format!("post {} belongs to another user", post.id),
            });
        }

        self.store.delete(Post::COLLECTION, &post.id).await?;
        info!("user {user_id} deleted post {}", post.id);
        Ok(())
    }

    pub async fn delete_post(&self, post: &Post) -> bool {
        fold("delete_post", self.try_delete_post(post).await.map(|_| true), false)
    }

    /// A user's posts, newest first. Defaults to the session's user.
    pub async fn try_list_posts(&self, user_id: Option<&str>) -> Result<Vec<Post>, WalkError> {
        self.require_session()?;
        let creator = self.resolve_user_id(user_id)?;
        self.posts_by(&creator, None).await
    }

    pub async fn list_posts(&self, user_id: Option<&str>) -> Option<Vec<Post>> {
        fold("list_posts", self.try_list_posts(user_id).await.map(Some), None)
    }

    pub(super) async fn posts_by(&self, creator_id: &str, limit: Option<usize>) -> Result<Vec<Post>, WalkError> {
        let query = Query::new(Post::COLLECTION, Filter::equals(fields::CREATOR_ID, creator_id))
            .order_by(fields::CREATED_AT, SortOrder::Desc)
            .limit(limit);
        let documents = self.store.query(query).await?;
        Ok(records::from_documents(documents)?)
    }
}
