use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use mosaic_db::{Collection, Database, Filter, Sort, Stored};
use mosaic_types::models::Comment;

use crate::Payload;
use crate::error::{ConceptError, ConceptResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommentDoc<C> {
    author: Uuid,
    content: C,
    original_post: Uuid,
}

#[async_trait]
pub trait CommentConcept<C: Payload>: Send + Sync {
    /// Neither `author` nor `original_post` is resolved here.
    async fn create_comment(
        &self,
        author: Uuid,
        content: C,
        original_post: Uuid,
    ) -> ConceptResult<Uuid>;

    async fn delete_comment(&self, id: Uuid) -> ConceptResult<()>;

    /// Matching comments, most recently updated first.
    async fn get_comments(&self, query: Filter) -> ConceptResult<Vec<Comment<C>>>;

    async fn get_comment(&self, id: Uuid) -> ConceptResult<Comment<C>>;
}

pub struct BasicCommentConcept<C> {
    comments: Collection<CommentDoc<C>>,
}

impl<C: Payload> BasicCommentConcept<C> {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_collection(db, "comments")
    }

    /// Pass `"posts"` to share the post collection, as older deployments did.
    pub fn with_collection(db: Arc<Database>, collection: &str) -> Self {
        Self {
            comments: Collection::new(db, collection),
        }
    }
}

#[async_trait]
impl<C: Payload> CommentConcept<C> for BasicCommentConcept<C> {
    async fn create_comment(
        &self,
        author: Uuid,
        content: C,
        original_post: Uuid,
    ) -> ConceptResult<Uuid> {
        let id = self
            .comments
            .create_one(&CommentDoc {
                author,
                content,
                original_post,
            })
            .await?;
        info!(comment_id = %id, original_post = %original_post, "comment created");
        Ok(id)
    }

    async fn delete_comment(&self, id: Uuid) -> ConceptResult<()> {
        if !self.comments.delete_one(by_id(id)).await? {
            return Err(ConceptError::NotFound(format!("Comment {} does not exist!", id)));
        }
        info!(comment_id = %id, "comment deleted");
        Ok(())
    }

    async fn get_comments(&self, query: Filter) -> ConceptResult<Vec<Comment<C>>> {
        query.validate()?;
        let comments = self.comments.read_many(query, Sort::NewestUpdated).await?;
        Ok(comments.into_iter().map(into_comment).collect())
    }

    async fn get_comment(&self, id: Uuid) -> ConceptResult<Comment<C>> {
        self.comments
            .read_one(by_id(id))
            .await?
            .map(into_comment)
            .ok_or_else(|| ConceptError::NotFound(format!("Comment {} not found!", id)))
    }
}

fn by_id(id: Uuid) -> Filter {
    Filter::eq("id", id.to_string())
}

fn into_comment<C>(stored: Stored<CommentDoc<C>>) -> Comment<C> {
    let Stored { base, doc } = stored;
    Comment {
        id: base.id,
        author: doc.author,
        content: doc.content,
        original_post: doc.original_post,
        created_at: base.created_at,
        updated_at: base.updated_at,
    }
}
