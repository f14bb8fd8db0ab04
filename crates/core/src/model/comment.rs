use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CommentId, SegmentId, UserId};

pub const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommentError {
    #[error("comment cannot be empty")]
    Empty,

    #[error("comment is too long ({len} > {max} chars)")]
    TooLong { len: usize, max: usize },
}

fn normalize_body(raw: &str) -> Result<String, CommentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommentError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMENT_CHARS {
        return Err(CommentError::TooLong {
            len,
            max: MAX_COMMENT_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub segment_id: SegmentId,
    pub user_id: UserId,
    pub body: String,
}

impl CommentDraft {
    /// Validate the draft at `now`.
    ///
    /// # Errors
    ///
    /// Returns `CommentError` if the body is blank or longer than
    /// [`MAX_COMMENT_CHARS`].
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedComment, CommentError> {
        Ok(ValidatedComment {
            segment_id: self.segment_id,
            user_id: self.user_id,
            body: normalize_body(&self.body)?,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedComment {
    pub segment_id: SegmentId,
    pub user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ValidatedComment {
    #[must_use]
    pub fn assign_id(self, id: CommentId) -> Comment {
        Comment {
            id,
            segment_id: self.segment_id,
            user_id: self.user_id,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub segment_id: SegmentId,
    pub user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
