use async_trait::async_trait;
use uuid::Uuid;

use mosaic_concepts::{ConceptResult, Payload};
use mosaic_db::Filter;
use mosaic_types::models::{Comment, Post};

/// Posts whose mutations name the caller by username and password instead of
/// a pre-resolved author id.
#[async_trait]
pub trait UserAwarePostConcept<P: Payload>: Send + Sync {
    async fn create_post(&self, username: &str, password: &str, content: P) -> ConceptResult<Uuid>;

    async fn delete_post(&self, username: &str, password: &str, id: Uuid) -> ConceptResult<()>;

    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<P>>>;

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<P>>;
}

#[async_trait]
pub trait UserAwareCommentConcept<C: Payload>: Send + Sync {
    async fn create_comment(
        &self,
        username: &str,
        password: &str,
        content: C,
        original_post: Uuid,
    ) -> ConceptResult<Uuid>;

    async fn delete_comment(&self, username: &str, password: &str, id: Uuid) -> ConceptResult<()>;

    async fn get_comments(&self, query: Filter) -> ConceptResult<Vec<Comment<C>>>;

    async fn get_comment(&self, id: Uuid) -> ConceptResult<Comment<C>>;
}
