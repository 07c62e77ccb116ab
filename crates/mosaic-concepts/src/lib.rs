//! Leaf concepts: User, Invitation, Post and Comment.
//!
//! Each concept owns one collection and knows nothing about the others. Ids
//! that point into another concept's records (a post's author, a comment's
//! original post) are stored as-is and never resolved here.

pub mod comment;
pub mod error;
pub mod invitation;
pub mod post;
pub mod user;

pub use comment::{BasicCommentConcept, CommentConcept};
pub use error::{ConceptError, ConceptResult};
pub use invitation::{BasicInvitationConcept, InvitationConcept};
pub use post::{BasicPostConcept, PostConcept};
pub use user::{BasicUserConcept, PrivateUserConcept, UserConcept};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Opaque caller-supplied payload (user data, post and comment content).
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
