use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use mosaic_concepts::{ConceptResult, InvitationConcept, Payload, PostConcept, UserConcept};
use mosaic_db::Filter;
use mosaic_types::models::{InvitationBearer, Post, User};

use crate::guard::{authenticate, ensure_author};
use crate::user_aware::UserAwarePostConcept;
use crate::user_invite::UserInvite;

/// Invitation-gated users and posts, without comments.
///
/// Unlike [`UserInvitePostComment`](crate::UserInvitePostComment), creating a
/// post always checks the password before resolving the author.
pub struct UserInvitePost<D: Payload, P: Payload> {
    user_invite: UserInvite<D>,
    post: Arc<dyn PostConcept<P>>,
}

impl<D, P> UserInvitePost<D, P>
where
    D: Payload + InvitationBearer,
    P: Payload,
{
    /// Builds its own [`UserInvite`] from the two user-side concepts.
    pub fn new(
        user: Arc<dyn UserConcept<D>>,
        invitation: Arc<dyn InvitationConcept>,
        post: Arc<dyn PostConcept<P>>,
    ) -> Self {
        Self {
            user_invite: UserInvite::new(user, invitation),
            post,
        }
    }
}

#[async_trait]
impl<D, P> UserAwarePostConcept<P> for UserInvitePost<D, P>
where
    D: Payload + InvitationBearer,
    P: Payload,
{
    async fn create_post(&self, username: &str, password: &str, content: P) -> ConceptResult<Uuid> {
        authenticate::<D, _>(&self.user_invite, username, password).await?;
        let user = self.user_invite.get_user(username).await?;
        self.post.create_post(user.id, content).await
    }

    async fn delete_post(&self, username: &str, password: &str, id: Uuid) -> ConceptResult<()> {
        authenticate::<D, _>(&self.user_invite, username, password).await?;
        let post = self.post.get_post(id).await?;
        let user = self.user_invite.get_user(username).await?;
        ensure_author(post.author, &user, "post")?;

        self.post.delete_post(id).await?;
        info!(post_id = %id, username, "post deleted by author");
        Ok(())
    }

    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<P>>> {
        debug!(?query, "get_posts");
        self.post.get_posts(query).await
    }

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<P>> {
        debug!(post_id = %id, "get_post");
        self.post.get_post(id).await
    }
}

#[async_trait]
impl<D, P> InvitationConcept for UserInvitePost<D, P>
where
    D: Payload + InvitationBearer,
    P: Payload,
{
    async fn create_invitation(&self) -> ConceptResult<String> {
        self.user_invite.create_invitation().await
    }

    async fn check_invitation(&self, key: &str) -> ConceptResult<bool> {
        self.user_invite.check_invitation(key).await
    }
}

#[async_trait]
impl<D, P> UserConcept<D> for UserInvitePost<D, P>
where
    D: Payload + InvitationBearer,
    P: Payload,
{
    async fn register_user(&self, username: &str, password: &str, data: D) -> ConceptResult<Uuid> {
        self.user_invite.register_user(username, password, data).await
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> ConceptResult<bool> {
        self.user_invite.authenticate_user(username, password).await
    }

    async fn get_users(&self, query: Filter) -> ConceptResult<Vec<User<D>>> {
        self.user_invite.get_users(query).await
    }

    async fn get_user(&self, username: &str) -> ConceptResult<User<D>> {
        self.user_invite.get_user(username).await
    }
}
