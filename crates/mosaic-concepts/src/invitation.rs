use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::info;

use mosaic_db::{Collection, Database, Filter};

use crate::error::ConceptResult;

const KEY_LEN: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InvitationDoc {
    key: String,
}

#[async_trait]
pub trait InvitationConcept: Send + Sync {
    /// Mint a key no stored invitation already uses.
    async fn create_invitation(&self) -> ConceptResult<String>;

    async fn check_invitation(&self, key: &str) -> ConceptResult<bool>;
}

pub struct BasicInvitationConcept {
    invitations: Collection<InvitationDoc>,
}

impl BasicInvitationConcept {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_collection(db, "invitations")
    }

    pub fn with_collection(db: Arc<Database>, collection: &str) -> Self {
        Self {
            invitations: Collection::new(db, collection),
        }
    }
}

#[async_trait]
impl InvitationConcept for BasicInvitationConcept {
    async fn create_invitation(&self) -> ConceptResult<String> {
        loop {
            let key = generate_key();
            if self.invitations.read_one(Filter::eq("key", key.as_str())).await?.is_none() {
                self.invitations.create_one(&InvitationDoc { key: key.clone() }).await?;
                info!("invitation created");
                return Ok(key);
            }
        }
    }

    async fn check_invitation(&self, key: &str) -> ConceptResult<bool> {
        Ok(self.invitations.read_one(Filter::eq("key", key)).await?.is_some())
    }
}

fn generate_key() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitations() -> BasicInvitationConcept {
        BasicInvitationConcept::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn created_keys_check_out() {
        let invitations = invitations();
        let key = invitations.create_invitation().await.unwrap();

        assert_eq!(key.len(), KEY_LEN);
        assert!(invitations.check_invitation(&key).await.unwrap());
        assert!(!invitations.check_invitation("not-a-key").await.unwrap());
        assert!(!invitations.check_invitation("").await.unwrap());
    }

    #[tokio::test]
    async fn keys_are_unique() {
        let invitations = invitations();
        let a = invitations.create_invitation().await.unwrap();
        let b = invitations.create_invitation().await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn checking_does_not_consume() {
        let invitations = invitations();
        let key = invitations.create_invitation().await.unwrap();
        assert!(invitations.check_invitation(&key).await.unwrap());
        assert!(invitations.check_invitation(&key).await.unwrap());
    }
}
