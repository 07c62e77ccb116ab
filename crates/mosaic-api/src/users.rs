use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use mosaic_concepts::{InvitationConcept, UserConcept};
use mosaic_db::Filter;
use mosaic_types::api::{
    AuthenticateResponse, CreatedResponse, Credentials, InvitationCheckResponse,
    InvitationResponse, RegisterRequest, UserQuery,
};

use crate::AppState;
use crate::error::ApiError;

// -- Invitations --

pub async fn create_invitation(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let key = state.app.create_invitation().await?;
    Ok((StatusCode::CREATED, Json(InvitationResponse { key })))
}

pub async fn check_invitation(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = state.app.check_invitation(&key).await?;
    Ok(Json(InvitationCheckResponse { valid }))
}

// -- Users --

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .app
        .register_user(&req.username, &req.password, req.data)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let authenticated = state.app.authenticate_user(&req.username, &req.password).await?;
    Ok(Json(AuthenticateResponse { authenticated }))
}

pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match query.username {
        Some(username) => Filter::eq("username", username),
        None => Filter::all(),
    };
    let users = state.app.get_users(filter).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.app.get_user(&username).await?;
    Ok(Json(user))
}
