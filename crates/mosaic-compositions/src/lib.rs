//! Compositions layer cross-concept rules over independent concepts.
//!
//! Each composition holds its constituents by reference and implements the
//! union of their capabilities, adding checks before delegating. The graph is
//! wired once at startup from already-built parts, so it is always acyclic:
//!
//! ```text
//! UserInvitePostComment
//! ├── UserInvite ── UserConcept, InvitationConcept
//! └── PostComment ── PostConcept, CommentConcept
//! ```
//!
//! No step spans a transaction. A precondition checked here (invitation
//! exists, post exists) can be invalidated by a concurrent caller before the
//! dependent write lands.

mod guard;
pub mod post_comment;
pub mod user_aware;
pub mod user_invite;
pub mod user_invite_post;
pub mod user_invite_post_comment;

pub use post_comment::PostComment;
pub use user_aware::{UserAwareCommentConcept, UserAwarePostConcept};
pub use user_invite::UserInvite;
pub use user_invite_post::UserInvitePost;
pub use user_invite_post_comment::UserInvitePostComment;
