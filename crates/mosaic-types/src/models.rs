use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields every persisted record carries. Assigned by storage, never by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user as seen by readers. The stored password never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User<D> {
    pub id: Uuid,
    pub username: String,
    pub data: D,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post<C> {
    pub id: Uuid,
    pub author: Uuid,
    pub content: C,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `original_post` is an opaque id into the post record space. Only a
/// composition ever checks that it resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment<C> {
    pub id: Uuid,
    pub author: Uuid,
    pub content: C,
    pub original_post: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User payloads that carry the invitation key consumed at registration.
pub trait InvitationBearer {
    /// Path of the key inside the payload, as a filter would address it.
    const KEY_FIELD: &'static str;

    fn invitation_key(&self) -> &str;

    /// Blank the key before the payload leaves the invitation-aware layer.
    fn clear_invitation_key(&mut self);
}

// -- Application payloads --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub legal_name: String,
    pub invitation_key: String,
}

impl InvitationBearer for Profile {
    const KEY_FIELD: &'static str = "invitation_key";

    fn invitation_key(&self) -> &str {
        &self.invitation_key
    }

    fn clear_invitation_key(&mut self) {
        self.invitation_key.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostBody {
    pub title: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBody {
    pub text: String,
}
