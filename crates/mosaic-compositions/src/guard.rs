use tracing::warn;
use uuid::Uuid;

use mosaic_concepts::{ConceptError, ConceptResult, Payload, UserConcept};
use mosaic_types::models::User;

pub(crate) async fn authenticate<D, U>(users: &U, username: &str, password: &str) -> ConceptResult<()>
where
    D: Payload,
    U: UserConcept<D> + ?Sized,
{
    if !users.authenticate_user(username, password).await? {
        warn!(username, "rejected credentials");
        return Err(ConceptError::InvalidCredentials);
    }
    Ok(())
}

/// Author ids are compared by value.
pub(crate) fn ensure_author<D>(author: Uuid, user: &User<D>, record: &str) -> ConceptResult<()> {
    if author != user.id {
        warn!(username = %user.username, record, "delete refused: not the author");
        return Err(ConceptError::Forbidden(format!(
            "You do not have permission to delete this {}!",
            record
        )));
    }
    Ok(())
}
