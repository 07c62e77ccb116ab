use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mosaic_concepts::{CommentConcept, ConceptError, ConceptResult, Payload, PostConcept};
use mosaic_db::Filter;
use mosaic_types::models::{Comment, Post};

/// Posts and comments with referential checks and cascading deletes.
pub struct PostComment<P: Payload, C: Payload> {
    post: Arc<dyn PostConcept<P>>,
    comment: Arc<dyn CommentConcept<C>>,
}

impl<P: Payload, C: Payload> PostComment<P, C> {
    pub fn new(post: Arc<dyn PostConcept<P>>, comment: Arc<dyn CommentConcept<C>>) -> Self {
        Self { post, comment }
    }

    /// Delete every comment whose `original_post` is `parent`.
    ///
    /// Deletions run concurrently and all of them are awaited. One failing
    /// does not stop the rest, and nothing is undone; the first failure is
    /// returned.
    async fn cascade(&self, parent: Uuid) -> ConceptResult<()> {
        let replies = self
            .comment
            .get_comments(Filter::eq("original_post", parent.to_string()))
            .await?;
        if replies.is_empty() {
            return Ok(());
        }

        let results = join_all(replies.iter().map(|c| self.comment.delete_comment(c.id))).await;

        let mut first_err = None;
        for (reply, result) in replies.iter().zip(results) {
            if let Err(e) = result {
                warn!(comment_id = %reply.id, parent = %parent, "cascade delete failed: {}", e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                info!(parent = %parent, count = replies.len(), "cascade deleted comments");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<P: Payload, C: Payload> PostConcept<P> for PostComment<P, C> {
    async fn create_post(&self, author: Uuid, content: P) -> ConceptResult<Uuid> {
        self.post.create_post(author, content).await
    }

    async fn delete_post(&self, id: Uuid) -> ConceptResult<()> {
        self.post.delete_post(id).await?;
        self.cascade(id).await
    }

    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<P>>> {
        debug!(?query, "get_posts");
        self.post.get_posts(query).await
    }

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<P>> {
        debug!(post_id = %id, "get_post");
        self.post.get_post(id).await
    }

    async fn post_exists(&self, id: Uuid) -> ConceptResult<bool> {
        self.post.post_exists(id).await
    }
}

#[async_trait]
impl<P: Payload, C: Payload> CommentConcept<C> for PostComment<P, C> {
    async fn create_comment(
        &self,
        author: Uuid,
        content: C,
        original_post: Uuid,
    ) -> ConceptResult<Uuid> {
        // Any record in the post collection counts, so with a shared
        // collection a comment can be the parent of another comment.
        if !self.post.post_exists(original_post).await? {
            debug!(original_post = %original_post, "comment refused: no such post");
            return Err(ConceptError::NotFound(format!(
                "Post {} does not exist!",
                original_post
            )));
        }
        self.comment.create_comment(author, content, original_post).await
    }

    /// Also removes comments that name this comment as their original post.
    /// That only happens when comments share the post collection.
    async fn delete_comment(&self, id: Uuid) -> ConceptResult<()> {
        self.comment.delete_comment(id).await?;
        self.cascade(id).await
    }

    async fn get_comments(&self, query: Filter) -> ConceptResult<Vec<Comment<C>>> {
        debug!(?query, "get_comments");
        self.comment.get_comments(query).await
    }

    async fn get_comment(&self, id: Uuid) -> ConceptResult<Comment<C>> {
        debug!(comment_id = %id, "get_comment");
        self.comment.get_comment(id).await
    }
}
