use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use mosaic_db::{Collection, Database, Filter, Sort, Stored};
use mosaic_types::models::User;

use crate::Payload;
use crate::error::{ConceptError, ConceptResult};

/// Stored shape of a user. Only ever leaves this module as a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDoc<D> {
    username: String,
    password: String,
    data: D,
}

#[async_trait]
pub trait UserConcept<D: Payload>: Send + Sync {
    async fn register_user(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid>;

    /// Literal username/password match.
    async fn authenticate_user(&self, username: &str, password: &str) -> ConceptResult<bool>;

    async fn get_users(&self, query: Filter) -> ConceptResult<Vec<User<D>>>;

    async fn get_user(&self, username: &str) -> ConceptResult<User<D>>;
}

/// Storage and rules both user variants share.
struct UserStore<D> {
    users: Collection<UserDoc<D>>,
}

impl<D: Payload> UserStore<D> {
    fn new(db: Arc<Database>, collection: &str) -> Self {
        Self {
            users: Collection::new(db, collection),
        }
    }

    async fn register(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid> {
        self.can_create(username, password).await?;

        let id = self
            .users
            .create_one(&UserDoc {
                username: username.to_string(),
                password: password.to_string(),
                data,
            })
            .await?;

        info!(user_id = %id, username, collection = self.users.name(), "user registered");
        Ok(id)
    }

    async fn can_create(&self, username: &str, password: &str) -> ConceptResult<()> {
        if username.is_empty() || password.is_empty() {
            return Err(ConceptError::BadValues(
                "Username and password must be provided!".into(),
            ));
        }
        if self.users.read_one(Filter::eq("username", username)).await?.is_some() {
            return Err(ConceptError::Conflict(format!(
                "Username '{}' already exists!",
                username
            )));
        }
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> ConceptResult<bool> {
        let filter = Filter::eq("username", username).and(Filter::eq("password", password));
        Ok(self.users.read_one(filter).await?.is_some())
    }

    async fn list(&self, query: Filter) -> ConceptResult<Vec<User<D>>> {
        query.validate()?;
        if query.mentions("password") {
            return Err(ConceptError::BadValues(
                "Users cannot be filtered by password".into(),
            ));
        }
        let users = self.users.read_many(query, Sort::Insertion).await?;
        Ok(users.into_iter().map(remove_password).collect())
    }

    async fn get(&self, username: &str) -> ConceptResult<User<D>> {
        self.users
            .read_one(Filter::eq("username", username))
            .await?
            .map(remove_password)
            .ok_or_else(|| ConceptError::NotFound(format!("User '{}' not found!", username)))
    }
}

fn remove_password<D>(stored: Stored<UserDoc<D>>) -> User<D> {
    let Stored { base, doc } = stored;
    User {
        id: base.id,
        username: doc.username,
        data: doc.data,
        created_at: base.created_at,
        updated_at: base.updated_at,
    }
}

/// Users that anyone may list.
pub struct BasicUserConcept<D> {
    store: UserStore<D>,
}

impl<D: Payload> BasicUserConcept<D> {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_collection(db, "basic-users")
    }

    pub fn with_collection(db: Arc<Database>, collection: &str) -> Self {
        Self {
            store: UserStore::new(db, collection),
        }
    }
}

#[async_trait]
impl<D: Payload> UserConcept<D> for BasicUserConcept<D> {
    async fn register_user(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid> {
        self.store.register(username, password, data).await
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> ConceptResult<bool> {
        self.store.authenticate(username, password).await
    }

    async fn get_users(&self, query: Filter) -> ConceptResult<Vec<User<D>>> {
        self.store.list(query).await
    }

    async fn get_user(&self, username: &str) -> ConceptResult<User<D>> {
        self.store.get(username).await
    }
}

/// Same capabilities as [`BasicUserConcept`], but users can never be
/// enumerated: `get_users` is always empty.
pub struct PrivateUserConcept<D> {
    store: UserStore<D>,
}

impl<D: Payload> PrivateUserConcept<D> {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_collection(db, "private-users")
    }

    pub fn with_collection(db: Arc<Database>, collection: &str) -> Self {
        Self {
            store: UserStore::new(db, collection),
        }
    }
}

#[async_trait]
impl<D: Payload> UserConcept<D> for PrivateUserConcept<D> {
    async fn register_user(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid> {
        self.store.register(username, password, data).await
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> ConceptResult<bool> {
        self.store.authenticate(username, password).await
    }

    async fn get_users(&self, query: Filter) -> ConceptResult<Vec<User<D>>> {
        query.validate()?;
        debug!("user enumeration suppressed");
        Ok(Vec::new())
    }

    async fn get_user(&self, username: &str) -> ConceptResult<User<D>> {
        self.store.get(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Data {
        nickname: String,
    }

    fn data(nickname: &str) -> Data {
        Data {
            nickname: nickname.into(),
        }
    }

    fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let users = BasicUserConcept::new(db());
        let id = users.register_user("alice", "pw", data("al")).await.unwrap();

        assert!(users.authenticate_user("alice", "pw").await.unwrap());
        assert!(!users.authenticate_user("alice", "wrong").await.unwrap());
        assert!(!users.authenticate_user("nobody", "pw").await.unwrap());

        let alice = users.get_user("alice").await.unwrap();
        assert_eq!(alice.id, id);
        assert_eq!(alice.data, data("al"));
    }

    #[tokio::test]
    async fn empty_credentials_are_bad_values() {
        let users = BasicUserConcept::new(db());
        let err = users.register_user("", "pw", data("x")).await.unwrap_err();
        assert!(matches!(err, ConceptError::BadValues(_)));
        let err = users.register_user("alice", "", data("x")).await.unwrap_err();
        assert!(matches!(err, ConceptError::BadValues(_)));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let users = BasicUserConcept::new(db());
        users.register_user("alice", "pw", data("one")).await.unwrap();

        let err = users.register_user("alice", "other", data("two")).await.unwrap_err();
        assert!(matches!(err, ConceptError::Conflict(_)));
        assert_eq!(users.get_users(Filter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_user_missing_is_not_found() {
        let users: BasicUserConcept<Data> = BasicUserConcept::new(db());
        let err = users.get_user("ghost").await.unwrap_err();
        assert!(matches!(err, ConceptError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_filters_payload_but_not_password() {
        let users = BasicUserConcept::new(db());
        users.register_user("alice", "pw", data("al")).await.unwrap();
        users.register_user("bob", "pw", data("bo")).await.unwrap();

        let found = users.get_users(Filter::eq("data.nickname", "bo")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "bob");

        let err = users.get_users(Filter::eq("password", "pw")).await.unwrap_err();
        assert!(matches!(err, ConceptError::BadValues(_)));
    }

    #[tokio::test]
    async fn quoted_password_path_is_rejected() {
        let users = BasicUserConcept::new(db());
        users.register_user("alice", "hunter2", data("al")).await.unwrap();

        for field in ["\"password\"", "data.\"nickname\"", "password[0]"] {
            let err = users.get_users(Filter::eq(field, "hunter2")).await.unwrap_err();
            assert!(matches!(err, ConceptError::BadValues(_)), "{field}");
        }
        let sneaky = Filter::eq("username", "alice").and(Filter::eq("\"password\"", "hunter2"));
        let err = users.get_users(sneaky).await.unwrap_err();
        assert!(matches!(err, ConceptError::BadValues(_)));
    }

    #[tokio::test]
    async fn private_users_cannot_be_enumerated() {
        let users = PrivateUserConcept::new(db());
        users.register_user("alice", "pw", data("al")).await.unwrap();

        assert!(users.get_users(Filter::all()).await.unwrap().is_empty());
        assert!(users.get_users(Filter::eq("\"password\"", "pw")).await.is_err());
        assert!(users.authenticate_user("alice", "pw").await.unwrap());
        assert_eq!(users.get_user("alice").await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn variants_use_separate_collections() {
        let db = db();
        let basic = BasicUserConcept::new(db.clone());
        let private = PrivateUserConcept::new(db);
        basic.register_user("alice", "pw", data("al")).await.unwrap();

        private.register_user("alice", "pw", data("al")).await.unwrap();
    }
}
