//! HTTP handlers, grouped by resource.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod course;
pub mod health;
pub mod progress;
pub mod users;

use serde::Serialize;

/// Body of a 201 response.
#[derive(Debug, Serialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}
