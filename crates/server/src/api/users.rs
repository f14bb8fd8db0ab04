use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use course_core::model::{Role, User, UserId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::api::CreatedResponse;
use crate::api::auth::SessionUser;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub display_name: String,
    pub role: Role,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            display_name: user.display_name().to_owned(),
            role: user.role(),
            is_premium: user.is_premium(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub display_name: String,
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<SignUp>,
) -> Result<(StatusCode, Json<CreatedResponse<UserId>>), ApiError> {
    let id = state.services.users().register(input.display_name).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/me
pub async fn me(SessionUser(user): SessionUser) -> Json<UserResponse> {
    Json(user.into())
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(register))
        .route("/api/me", get(me))
}
