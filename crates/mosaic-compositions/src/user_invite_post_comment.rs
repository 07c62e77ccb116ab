use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use mosaic_concepts::{
    CommentConcept, ConceptResult, InvitationConcept, Payload, PostConcept, UserConcept,
};
use mosaic_db::Filter;
use mosaic_types::models::{Comment, InvitationBearer, Post, User};

use crate::guard::{authenticate, ensure_author};
use crate::post_comment::PostComment;
use crate::user_aware::{UserAwareCommentConcept, UserAwarePostConcept};
use crate::user_invite::UserInvite;

/// Invitation-gated users on top of posts and comments, with mutations
/// identified by username and password.
///
/// Creation only resolves the username to a user id; it does not check the
/// password unless [`with_create_authentication`](Self::with_create_authentication)
/// is set. Deletion always authenticates and then requires the caller to be
/// the record's author.
pub struct UserInvitePostComment<D: Payload, P: Payload, C: Payload> {
    user_invite: Arc<UserInvite<D>>,
    post_comment: Arc<PostComment<P, C>>,
    authenticate_on_create: bool,
}

impl<D, P, C> UserInvitePostComment<D, P, C>
where
    D: Payload + InvitationBearer,
    P: Payload,
    C: Payload,
{
    pub fn new(user_invite: Arc<UserInvite<D>>, post_comment: Arc<PostComment<P, C>>) -> Self {
        Self {
            user_invite,
            post_comment,
            authenticate_on_create: false,
        }
    }

    /// Require a password match before creating posts and comments too.
    pub fn with_create_authentication(mut self, enabled: bool) -> Self {
        self.authenticate_on_create = enabled;
        self
    }

    async fn resolve_author(&self, username: &str, password: &str) -> ConceptResult<User<D>> {
        if self.authenticate_on_create {
            authenticate::<D, _>(&*self.user_invite, username, password).await?;
        }
        self.user_invite.get_user(username).await
    }
}

#[async_trait]
impl<D, P, C> UserAwarePostConcept<P> for UserInvitePostComment<D, P, C>
where
    D: Payload + InvitationBearer,
    P: Payload,
    C: Payload,
{
    async fn create_post(&self, username: &str, password: &str, content: P) -> ConceptResult<Uuid> {
        let user = self.resolve_author(username, password).await?;
        self.post_comment.create_post(user.id, content).await
    }

    async fn delete_post(&self, username: &str, password: &str, id: Uuid) -> ConceptResult<()> {
        authenticate::<D, _>(&*self.user_invite, username, password).await?;
        let post = self.post_comment.get_post(id).await?;
        let user = self.user_invite.get_user(username).await?;
        ensure_author(post.author, &user, "post")?;

        self.post_comment.delete_post(id).await?;
        info!(post_id = %id, username, "post deleted by author");
        Ok(())
    }

    async fn get_posts(&self, query: Filter) -> ConceptResult<Vec<Post<P>>> {
        self.post_comment.get_posts(query).await
    }

    async fn get_post(&self, id: Uuid) -> ConceptResult<Post<P>> {
        self.post_comment.get_post(id).await
    }
}

#[async_trait]
impl<D, P, C> UserAwareCommentConcept<C> for UserInvitePostComment<D, P, C>
where
    D: Payload + InvitationBearer,
    P: Payload,
    C: Payload,
{
    async fn create_comment(
        &self,
        username: &str,
        password: &str,
        content: C,
        original_post: Uuid,
    ) -> ConceptResult<Uuid> {
        let user = self.resolve_author(username, password).await?;
        self.post_comment
            .create_comment(user.id, content, original_post)
            .await
    }

    async fn delete_comment(&self, username: &str, password: &str, id: Uuid) -> ConceptResult<()> {
        authenticate::<D, _>(&*self.user_invite, username, password).await?;
        let comment = self.post_comment.get_comment(id).await?;
        let user = self.user_invite.get_user(username).await?;
        ensure_author(comment.author, &user, "comment")?;

        self.post_comment.delete_comment(id).await?;
        info!(comment_id = %id, username, "comment deleted by author");
        Ok(())
    }

    async fn get_comments(&self, query: Filter) -> ConceptResult<Vec<Comment<C>>> {
        self.post_comment.get_comments(query).await
    }

    async fn get_comment(&self, id: Uuid) -> ConceptResult<Comment<C>> {
        self.post_comment.get_comment(id).await
    }
}

#[async_trait]
impl<D, P, C> InvitationConcept for UserInvitePostComment<D, P, C>
where
    D: Payload + InvitationBearer,
    P: Payload,
    C: Payload,
{
    async fn create_invitation(&self) -> ConceptResult<String> {
        self.user_invite.create_invitation().await
    }

    async fn check_invitation(&self, key: &str) -> ConceptResult<bool> {
        self.user_invite.check_invitation(key).await
    }
}

#[async_trait]
impl<D, P, C> UserConcept<D> for UserInvitePostComment<D, P, C>
where
    D: Payload + InvitationBearer,
    P: Payload,
    C: Payload,
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
