use chrono::{DateTime, Utc};

use crate::model::ids::ModuleId;
use crate::model::segment::{SegmentError, normalize_title};

/// An ordered group of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    id: ModuleId,
    title: String,
    position: u32,
    created_at: DateTime<Utc>,
}

impl CourseModule {
    /// Build a module, validating its title.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::EmptyTitle`/`TitleTooLong` for bad titles and
    /// `SegmentError::InvalidPosition` for a zero position.
    pub fn new(
        id: ModuleId,
        title: impl AsRef<str>,
        position: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SegmentError> {
        if position == 0 {
            return Err(SegmentError::InvalidPosition);
        }
        Ok(Self {
            id,
            title: normalize_title(title.as_ref())?,
            position,
            created_at,
        })
    }

    /// Validate a module title without building a module.
    ///
    /// # Errors
    ///
    /// Same title rules as [`CourseModule::new`].
    pub fn validate_title(title: &str) -> Result<String, SegmentError> {
        normalize_title(title)
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
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
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
