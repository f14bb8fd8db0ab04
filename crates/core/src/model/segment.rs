use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ModuleId, SegmentId};

pub const MAX_TITLE_CHARS: usize = 200;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("title is too long ({len} > {max} chars)")]
    TitleTooLong { len: usize, max: usize },

    #[error("video key cannot be blank")]
    BlankVideoKey,

    #[error("position must be >= 1")]
    InvalidPosition,
}

pub(crate) fn normalize_title(raw: &str) -> Result<String, SegmentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SegmentError::EmptyTitle);
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(SegmentError::TitleTooLong {
            len,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

fn normalize_video_key(raw: Option<String>) -> Result<Option<String>, SegmentError> {
    match raw {
        None => Ok(None),
        Some(key) if key.trim().is_empty() => Err(SegmentError::BlankVideoKey),
        Some(key) => Ok(Some(key.trim().to_owned())),
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Admin input for a new segment. Position is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDraft {
    pub module_id: ModuleId,
    pub title: String,
    pub is_premium: bool,
    pub video_key: Option<String>,
}

impl SegmentDraft {
    /// Validate the draft at `now`.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError` for a blank/oversized title or a blank video key.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedSegment, SegmentError> {
        Ok(ValidatedSegment {
            module_id: self.module_id,
            title: normalize_title(&self.title)?,
            is_premium: self.is_premium,
            video_key: normalize_video_key(self.video_key)?,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSegment {
    pub module_id: ModuleId,
    pub title: String,
    pub is_premium: bool,
    pub video_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidatedSegment {
    #[must_use]
    pub fn assign(self, id: SegmentId, position: u32) -> Segment {
        Segment {
            id,
            module_id: self.module_id,
            title: self.title,
            position,
            is_premium: self.is_premium,
            video_key: self.video_key,
            created_at: self.created_at,
        }
    }
}

//
// ─── SEGMENT ───────────────────────────────────────────────────────────────────
//

/// An addressable unit of video content within a course module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: SegmentId,
    module_id: ModuleId,
    title: String,
    position: u32,
    is_premium: bool,
    video_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl Segment {
    /// Rehydrate a segment from storage.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError` if persisted fields no longer validate.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SegmentId,
        module_id: ModuleId,
        title: String,
        position: u32,
        is_premium: bool,
        video_key: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SegmentError> {
        if position == 0 {
            return Err(SegmentError::InvalidPosition);
        }
        Ok(Self {
            id,
            module_id,
            title: normalize_title(&title)?,
            position,
            is_premium,
            video_key: normalize_video_key(video_key)?,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    #[must_use]
    pub fn video_key(&self) -> Option<&str> {
        self.video_key.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
