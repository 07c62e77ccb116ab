use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mosaic_concepts::{ConceptError, ConceptResult, InvitationConcept, Payload, UserConcept};
use mosaic_db::Filter;
use mosaic_types::models::{InvitationBearer, User};

/// Registration gated on an existing invitation.
///
/// The invitation key a user registered with is write-once: it is blanked on
/// every record this composition hands out and cannot be filtered on.
pub struct UserInvite<D: Payload> {
    user: Arc<dyn UserConcept<D>>,
    invitation: Arc<dyn InvitationConcept>,
}

impl<D> UserInvite<D>
where
    D: Payload + InvitationBearer,
{
    pub fn new(user: Arc<dyn UserConcept<D>>, invitation: Arc<dyn InvitationConcept>) -> Self {
        Self { user, invitation }
    }

    fn key_path() -> String {
        format!("data.{}", D::KEY_FIELD)
    }
}

fn hide_key<D: InvitationBearer>(mut user: User<D>) -> User<D> {
    user.data.clear_invitation_key();
    user
}

#[async_trait]
impl<D> InvitationConcept for UserInvite<D>
where
    D: Payload + InvitationBearer,
{
    async fn create_invitation(&self) -> ConceptResult<String> {
        self.invitation.create_invitation().await
    }

    async fn check_invitation(&self, key: &str) -> ConceptResult<bool> {
        self.invitation.check_invitation(key).await
    }
}

#[async_trait]
impl<D> UserConcept<D> for UserInvite<D>
where
    D: Payload + InvitationBearer,
{
    async fn register_user(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid> {
        // The key is never marked used, so one invitation admits any number of users.
        if !self.invitation.check_invitation(data.invitation_key()).await? {
            warn!(username, "registration refused: unknown invitation key");
            return Err(ConceptError::InvalidInvitation);
        }
        let id = self.user.register_user(username, password, data).await?;
        info!(user_id = %id, username, "invited user registered");
        Ok(id)
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> ConceptResult<bool> {
        self.user.authenticate_user(username, password).await
    }

    async fn get_users(&self, query: Filter) -> ConceptResult<Vec<User<D>>> {
        // Quoted or bracketed paths would slip past `mentions`.
        query.validate()?;
        if query.mentions(&Self::key_path()) {
            return Err(ConceptError::BadValues(
                "Users cannot be filtered by invitation key".into(),
            ));
        }
        debug!(?query, "get_users");
        let users = self.user.get_users(query).await?;
        Ok(users.into_iter().map(hide_key).collect())
    }

    async fn get_user(&self, username: &str) -> ConceptResult<User<D>> {
        debug!(username, "get_user");
        self.user.get_user(username).await.map(hide_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_concepts::{BasicInvitationConcept, BasicUserConcept, PrivateUserConcept};
    use mosaic_db::Database;
    use mosaic_types::models::Profile;

    /// Rejects every key without touching storage.
    struct ClosedInvitations;

    #[async_trait]
    impl InvitationConcept for ClosedInvitations {
        async fn create_invitation(&self) -> ConceptResult<String> {
            Ok("unusable".into())
        }

        async fn check_invitation(&self, _key: &str) -> ConceptResult<bool> {
            Ok(false)
        }
    }

    fn profile(key: &str) -> Profile {
        Profile {
            legal_name: "Alice Liddell".into(),
            invitation_key: key.into(),
        }
    }

    fn wire(db: Arc<Database>) -> UserInvite<Profile> {
        UserInvite::new(
            Arc::new(BasicUserConcept::<Profile>::new(db.clone())),
            Arc::new(BasicInvitationConcept::new(db)),
        )
    }

    #[tokio::test]
    async fn registered_user_never_shows_key() {
        let users = wire(Arc::new(Database::open_in_memory().unwrap()));
        let key = users.create_invitation().await.unwrap();

        users.register_user("alice", "pw", profile(&key)).await.unwrap();
        assert!(users.authenticate_user("alice", "pw").await.unwrap());

        let alice = users.get_user("alice").await.unwrap();
        assert_eq!(alice.data.invitation_key, "");
        assert_eq!(alice.data.legal_name, "Alice Liddell");

        let all = users.get_users(Filter::all()).await.unwrap();
        assert!(all.iter().all(|u| u.data.invitation_key.is_empty()));
    }

    #[tokio::test]
    async fn unknown_key_never_reaches_user_concept() {
        let users = wire(Arc::new(Database::open_in_memory().unwrap()));

        let err = users
            .register_user("alice", "pw", profile("made-up"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConceptError::InvalidInvitation));
        assert!(matches!(
            users.get_user("alice").await,
            Err(ConceptError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn invitation_check_precedes_user_validation() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let users: UserInvite<Profile> = UserInvite::new(
            Arc::new(BasicUserConcept::<Profile>::new(db)),
            Arc::new(ClosedInvitations),
        );

        // Empty credentials would be BadValues, but the invitation is checked first.
        let err = users.register_user("", "", profile("k")).await.unwrap_err();
        assert!(matches!(err, ConceptError::InvalidInvitation));
    }

    #[tokio::test]
    async fn one_key_admits_many_users() {
        let users = wire(Arc::new(Database::open_in_memory().unwrap()));
        let key = users.create_invitation().await.unwrap();

        users.register_user("alice", "pw", profile(&key)).await.unwrap();
        users.register_user("bob", "pw", profile(&key)).await.unwrap();
        assert!(users.check_invitation(&key).await.unwrap());
    }

    #[tokio::test]
    async fn key_cannot_be_probed_through_filters() {
        let users = wire(Arc::new(Database::open_in_memory().unwrap()));
        let key = users.create_invitation().await.unwrap();
        users.register_user("alice", "pw", profile(&key)).await.unwrap();

        let err = users
            .get_users(Filter::eq("data.invitation_key", key.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConceptError::BadValues(_)));
    }

    #[tokio::test]
    async fn quoted_key_path_is_rejected() {
        let users = wire(Arc::new(Database::open_in_memory().unwrap()));
        let key = users.create_invitation().await.unwrap();
        users.register_user("alice", "pw", profile(&key)).await.unwrap();

        for field in ["data.\"invitation_key\"", "\"data\".invitation_key", "\"password\""] {
            let err = users
                .get_users(Filter::eq(field, key.as_str()))
                .await
                .unwrap_err();
            assert!(matches!(err, ConceptError::BadValues(_)), "{field}");
        }
    }

    #[tokio::test]
    async fn works_over_private_users() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let users: UserInvite<Profile> = UserInvite::new(
            Arc::new(PrivateUserConcept::<Profile>::new(db.clone())),
            Arc::new(BasicInvitationConcept::new(db)),
        );
        let key = users.create_invitation().await.unwrap();
        users.register_user("alice", "pw", profile(&key)).await.unwrap();

        assert!(users.get_users(Filter::all()).await.unwrap().is_empty());
        assert_eq!(users.get_user("alice").await.unwrap().data.invitation_key, "");
    }
}
