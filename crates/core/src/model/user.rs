use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

pub const MAX_DISPLAY_NAME_CHARS: usize = 80;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("display name is too long ({len} > {max} chars)")]
    DisplayNameTooLong { len: usize, max: usize },

    #[error("invalid role: {0}")]
    InvalidRole(String),
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Authorization tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    /// Parses the persisted form produced by [`Role::as_str`].
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidRole` for unknown values.
    pub fn parse(s: &str) -> Result<Self, UserError> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(UserError::InvalidRole(other.to_owned())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Signup input before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub display_name: String,
    pub role: Role,
}

impl UserDraft {
    #[must_use]
    pub fn member(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role: Role::Member,
        }
    }

    #[must_use]
    pub fn admin(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role: Role::Admin,
        }
    }

    /// Validate the draft at `now`.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the display name is blank or too long.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedUser, UserError> {
        let display_name = normalize_display_name(&self.display_name)?;
        Ok(ValidatedUser {
            display_name,
            role: self.role,
            created_at: now,
        })
    }
}

fn normalize_display_name(raw: &str) -> Result<String, UserError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserError::EmptyDisplayName);
    }
    let len = trimmed.chars().count();
    if len > MAX_DISPLAY_NAME_CHARS {
        return Err(UserError::DisplayNameTooLong {
            len,
            max: MAX_DISPLAY_NAME_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

/// A validated user that has not been assigned an id yet.
///
/// New users never start with a premium entitlement; billing grants it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl ValidatedUser {
    #[must_use]
    pub fn assign_id(self, id: UserId) -> User {
        User {
            id,
            display_name: self.display_name,
            role: self.role,
            is_premium: false,
            created_at: self.created_at,
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    display_name: String,
    role: Role,
    is_premium: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Rehydrate a user from storage.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the stored display name no longer validates.
    pub fn from_persisted(
        id: UserId,
        display_name: String,
        role: Role,
        is_premium: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let display_name = normalize_display_name(&display_name)?;
        Ok(Self {
            id,
            display_name,
            role,
            is_premium,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_premium(&mut self, is_premium: bool) {
        self.is_premium = is_premium;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn draft_trims_display_name() {
        let user = UserDraft::member("  Ada  ")
            .validate(fixed_now())
            .unwrap()
            .assign_id(UserId::new(1));
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.role(), Role::Member);
        assert!(!user.is_premium());
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let err = UserDraft::member("   ").validate(fixed_now()).unwrap_err();
        assert_eq!(err, UserError::EmptyDisplayName);
    }

    #[test]
    fn long_display_name_is_rejected() {
        let name = "x".repeat(MAX_DISPLAY_NAME_CHARS + 1);
        let err = UserDraft::admin(name).validate(fixed_now()).unwrap_err();
        assert!(matches!(err, UserError::DisplayNameTooLong { len: 81, max: 80 }));
    }

    #[test]
    fn role_round_trips_through_persisted_form() {
        for role in [Role::Member, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("owner").is_err());
    }
}
