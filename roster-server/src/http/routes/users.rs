//! User endpoints
//!
//! Direct mapping from HTTP verbs to single store operations.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::UserId;
use crate::http::server::AppState;
use crate::models::{NewUser, User};

/// GET /users - all users ordered by id
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list().await?;
    Ok(Json(users))
}

/// POST /users - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.store.create(req).await?;
    tracing::debug!(id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/{id} - replace name, email and age
async fn update_user(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
    Json(req): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let user = state.store.update(id, req).await?;
    Ok(Json(user))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    UserId(id): UserId,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}
