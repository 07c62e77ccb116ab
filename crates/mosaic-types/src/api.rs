use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CommentBody, PostBody, Profile};

// -- Credentials --

/// Every mutating post/comment request names its caller by username+password.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthenticateResponse {
    pub authenticated: bool,
}

// -- Invitations --

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct InvitationCheckResponse {
    pub valid: bool,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub data: Profile,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub username: String,
    pub password: String,
    pub content: PostBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub author: Option<Uuid>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub username: String,
    pub password: String,
    pub content: CommentBody,
    pub original_post: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub author: Option<Uuid>,
    pub original_post: Option<Uuid>,
}

/// Returned by every create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
