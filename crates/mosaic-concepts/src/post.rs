use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use mosaic_db::{Collection, Database, Filter, Sort, Stored};
use mosaic_types::models::Post;

use crate::Payload;
use crate::error::{ConceptError, ConceptResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostDoc<C> {
    author: Uuid,
    content: C,
}

#[async_trait]
pub trait PostConcept<C: Payload>: Send + Sync {
    /// `author` is taken on trust; nothing here checks it names a user.
    async fn create_post(&self, author: Uuid, content: C) -> ConceptResult<Uuid>;

    async fn delete_post(&self, id: Uuid) -> ConceptResult<()>;

    /// Matching posts, most recently updated first.
    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<C>>>;

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<C>>;

    /// Whether any record with this id lives in the post collection, even one
    /// whose content is not a `C`.
    async fn post_exists(&self, id: Uuid) -> ConceptResult<bool>;
}

pub struct BasicPostConcept<C> {
    posts: Collection<PostDoc<C>>,
}

impl<C: Payload> BasicPostConcept<C> {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_collection(db, "posts")
    }

    pub fn with_collection(db: Arc<Database>, collection: &str) -> Self {
        Self {
            posts: Collection::new(db, collection),
        }
    }
}

#[async_trait]
impl<C: Payload> PostConcept<C> for BasicPostConcept<C> {
    async fn create_post(&self, author: Uuid, content: C) -> ConceptResult<Uuid> {
        let id = self.posts.create_one(&PostDoc { author, content }).await?;
        info!(post_id = %id, author = %author, "post created");
        Ok(id)
    }

    async fn delete_post(&self, id: Uuid) -> ConceptResult<()> {
        if !self.posts.delete_one(by_id(id)).await? {
            return Err(ConceptError::NotFound(format!("Post {} does not exist!", id)));
        }
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<C>>> {
        query.validate()?;
        let posts = self.posts.read_many(query, Sort::NewestUpdated).await?;
        Ok(posts.into_iter().map(into_post).collect())
    }

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<C>> {
        self.posts
            .read_one(by_id(id))
            .await?
            .map(into_post)
            .ok_or_else(|| ConceptError::NotFound(format!("Post {} not found!", id)))
    }

    async fn post_exists(&self, id: Uuid) -> ConceptResult<bool> {
        Ok(self.posts.exists(by_id(id)).await?)
    }
}

fn by_id(id: Uuid) -> Filter {
    Filter::eq("id", id.to_string())
}

fn into_post<C>(stored: Stored<PostDoc<C>>) -> Post<C> {
    let Stored { base, doc } = stored;
    Post {
        id: base.id,
        author: doc.author,
        content: doc.content,
        created_at: base.created_at,
        updated_at: base.updated_at,
    }
}
