use std::collections::HashSet;
use std::sync::Arc;

use course_core::model::{CourseModule, ModuleId, Segment, SegmentDraft, SegmentId};
use storage::repository::{CourseRepository, NewModuleRecord, StorageError};
use tracing::info;

use crate::Clock;
use crate::error::CourseServiceError;

/// Admin-side management of modules and segments, plus public reads.
#[derive(Clone)]
pub struct CourseService {
    clock: Clock,
    course: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(clock: Clock, course: Arc<dyn CourseRepository>) -> Self {
        Self { clock, course }
    }

    /// Append a module after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Segment` for an invalid title.
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn create_module(&self, title: String) -> Result<ModuleId, CourseServiceError> {
        let title = CourseModule::validate_title(&title)?;
        let id = self
            .course
            .insert_new_module(NewModuleRecord {
                title,
                created_at: self.clock.now(),
            })
            .await?;
        info!(module_id = %id, "created module");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_modules(&self) -> Result<Vec<CourseModule>, CourseServiceError> {
        Ok(self.course.list_modules().await?)
    }

    /// Append a segment to the end of its module.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::ModuleNotFound` if the module is missing.
    /// Returns `CourseServiceError::Segment` for validation failures.
    pub async fn create_segment(&self, draft: SegmentDraft) -> Result<SegmentId, CourseServiceError> {
        let module_id = draft.module_id;
        if self.course.get_module(module_id).await?.is_none() {
            return Err(CourseServiceError::ModuleNotFound(module_id));
        }

        let segment = draft.validate(self.clock.now())?;
        let id = match self.course.insert_new_segment(&segment).await {
            Ok(id) => id,
            // Module deleted between the check and the insert.
            Err(StorageError::Conflict) => {
                return Err(CourseServiceError::ModuleNotFound(module_id));
            }
            Err(e) => return Err(e.into()),
        };
        info!(segment_id = %id, module_id = %module_id, premium = segment.is_premium, "created segment");
        Ok(id)
    }

    /// Returns `Ok(None)` when the segment does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_segment(&self, id: SegmentId) -> Result<Option<Segment>, CourseServiceError> {
        Ok(self.course.get_segment(id).await?)
    }

    /// Segments in course order, optionally restricted to one module.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_segments(
        &self,
        module: Option<ModuleId>,
    ) -> Result<Vec<Segment>, CourseServiceError> {
        Ok(self.course.list_segments(module).await?)
    }

    /// Rewrite a module's segment positions to follow `ordered`.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::ModuleNotFound` if the module is missing and
    /// `CourseServiceError::InvalidOrder` unless `ordered` is a permutation of
    /// the module's segments.
    pub async fn reorder_segments(
        &self,
        module_id: ModuleId,
        ordered: &[SegmentId],
    ) -> Result<(), CourseServiceError> {
        if self.course.get_module(module_id).await?.is_none() {
            return Err(CourseServiceError::ModuleNotFound(module_id));
        }

        let current: HashSet<SegmentId> = self
            .course
            .list_segments(Some(module_id))
            .await?
            .iter()
            .map(Segment::id)
            .collect();
        let requested: HashSet<SegmentId> = ordered.iter().copied().collect();
        if requested.len() != ordered.len() || requested != current {
            return Err(CourseServiceError::InvalidOrder);
        }

        match self.course.reorder_segments(module_id, ordered).await {
            Ok(()) => {
                info!(module_id = %module_id, count = ordered.len(), "reordered segments");
                Ok(())
            }
            Err(StorageError::NotFound) => Err(CourseServiceError::InvalidOrder),
            Err(e) => Err(e.into()),
        }
    }
}
