//! Caller identity extractors.
//!
//! The identity provider in front of this service asserts the caller in the
//! `x-user-id` header. Handlers take `SessionUser` or `AdminUser` and hand the
//! resolved `User` to services explicitly.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use course_core::model::{User, UserId};
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing caller identity".into()))?;
        let id: UserId = raw
            .parse()
            .map_err(|_| ApiError::Unauthorized("malformed caller identity".into()))?;

        match state.services.users().get_user(id).await? {
            Some(user) => Ok(Self(user)),
            None => {
                warn!(user_id = %id, "request from unknown user");
                Err(ApiError::Unauthorized("unknown user".into()))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionUser(user) = SessionUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("admin role required".into()));
        }
        Ok(Self(user))
    }
}
