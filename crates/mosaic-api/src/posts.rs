use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use mosaic_compositions::UserAwarePostConcept;
use mosaic_db::Filter;
use mosaic_types::api::{CreatePostRequest, CreatedResponse, Credentials, PostQuery};

use crate::AppState;
use crate::error::ApiError;

pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .app
        .create_post(&req.username, &req.password, req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match query.author {
        Some(author) => Filter::eq("author", author.to_string()),
        None => Filter::all(),
    };
    let posts = state.app.get_posts(filter).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.app.get_post(id).await?;
    Ok(Json(post))
}

/// Credentials travel in the request body.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    state.app.delete_post(&req.username, &req.password, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
