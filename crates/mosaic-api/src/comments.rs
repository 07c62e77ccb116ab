use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use mosaic_compositions::UserAwareCommentConcept;
use mosaic_db::Filter;
use mosaic_types::api::{CommentQuery, CreateCommentRequest, CreatedResponse, Credentials};

use crate::AppState;
use crate::error::ApiError;

pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .app
        .create_comment(&req.username, &req.password, req.content, req.original_post)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut filter = Filter::all();
    if let Some(author) = query.author {
        filter = filter.and(Filter::eq("author", author.to_string()));
    }
    if let Some(post) = query.original_post {
        filter = filter.and(Filter::eq("original_post", post.to_string()));
    }
    let comments = state.app.get_comments(filter).await?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state.app.get_comment(id).await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    state.app.delete_comment(&req.username, &req.password, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
