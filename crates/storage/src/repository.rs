use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{
    Comment, CommentId, CourseModule, ModuleId, ProgressRecord, Segment, SegmentId, User, UserId,
    ValidatedComment, ValidatedSegment, ValidatedUser,
};
use course_core::stats::Audience;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// A referenced row is missing (foreign key) or the write contradicts stored state.
    #[error("conflict")]
    Conflict,

    #[error("unique constraint violation")]
    UniqueViolation,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a module that has not been assigned an id or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModuleRecord {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, letting storage assign the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn insert_new_user(&self, user: &ValidatedUser) -> Result<UserId, StorageError>;

    /// Fetch a user by id. Returns `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Set or clear the premium entitlement.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn set_premium(&self, id: UserId, is_premium: bool) -> Result<(), StorageError>;

    /// Count users belonging to `audience`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn count_users(&self, audience: Audience) -> Result<u64, StorageError>;
}

/// Repository contract for course modules and their segments.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a module after the last existing one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn insert_new_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError>;

    async fn get_module(&self, id: ModuleId) -> Result<Option<CourseModule>, StorageError>;

    /// All modules ordered by position.
    async fn list_modules(&self) -> Result<Vec<CourseModule>, StorageError>;

    /// Insert a segment at the end of its module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the module does not exist.
    async fn insert_new_segment(&self, segment: &ValidatedSegment)
    -> Result<SegmentId, StorageError>;

    async fn get_segment(&self, id: SegmentId) -> Result<Option<Segment>, StorageError>;

    /// Segments ordered by module position then segment position.
    /// `None` lists the whole course.
    async fn list_segments(&self, module: Option<ModuleId>) -> Result<Vec<Segment>, StorageError>;

    /// Assign positions `1..=n` to `ordered`, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if any id is not a segment of `module`.
    async fn reorder_segments(
        &self,
        module: ModuleId,
        ordered: &[SegmentId],
    ) -> Result<(), StorageError>;
}

/// Data access for the `(user, segment)` watch log.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Point lookup by composite key.
    async fn get_progress(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Every segment the user has watched, sorted by segment id.
    async fn get_all_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Unconditional insert.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueViolation` if the pair is already recorded
    /// and `StorageError::Conflict` if the user or segment does not exist.
    async fn mark_as_watched(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<(), StorageError>;

    /// Number of distinct users who watched the segment.
    async fn get_segment_completed_progress(
        &self,
        segment_id: SegmentId,
    ) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the segment or author does not exist.
    async fn insert_new_comment(
        &self,
        comment: &ValidatedComment,
    ) -> Result<CommentId, StorageError>;

    /// Comments on a segment, newest first.
    async fn list_comments(&self, segment_id: SegmentId) -> Result<Vec<Comment>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Enforces the same key and reference constraints as the `SQLite` schema.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<BTreeMap<UserId, User>>>,
    modules: Arc<Mutex<BTreeMap<ModuleId, CourseModule>>>,
    segments: Arc<Mutex<BTreeMap<SegmentId, Segment>>>,
    progress: Arc<Mutex<BTreeSet<ProgressRecord>>>,
    comments: Arc<Mutex<HashMap<SegmentId, Vec<Comment>>>>,
    next_comment_id: Arc<Mutex<u64>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    m.lock().map_err(|e| StorageError::Connection(e.to_string()))
}

fn next_id(last: Option<u64>) -> u64 {
    last.map_or(1, |v| v + 1)
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_new_user(&self, user: &ValidatedUser) -> Result<UserId, StorageError> {
        let mut guard = lock(&self.users)?;
        let id = UserId::new(next_id(guard.keys().next_back().map(UserId::value)));
        guard.insert(id, user.clone().assign_id(id));
        Ok(id)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    async fn set_premium(&self, id: UserId, is_premium: bool) -> Result<(), StorageError> {
        let mut guard = lock(&self.users)?;
        let user = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        user.set_premium(is_premium);
        Ok(())
    }

    async fn count_users(&self, audience: Audience) -> Result<u64, StorageError> {
        let guard = lock(&self.users)?;
        let count = match audience {
            Audience::AllUsers => guard.len(),
            Audience::PremiumOnly => guard.values().filter(|u| u.is_premium()).count(),
        };
        Ok(count as u64)
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn insert_new_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError> {
        let mut guard = lock(&self.modules)?;
        let id = ModuleId::new(next_id(guard.keys().next_back().map(ModuleId::value)));
        let position = guard.values().map(CourseModule::position).max().unwrap_or(0) + 1;
        let module = CourseModule::new(id, module.title, position, module.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.insert(id, module);
        Ok(id)
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<CourseModule>, StorageError> {
        Ok(lock(&self.modules)?.get(&id).cloned())
    }

    async fn list_modules(&self) -> Result<Vec<CourseModule>, StorageError> {
        let mut modules: Vec<_> = lock(&self.modules)?.values().cloned().collect();
        modules.sort_by_key(|m| (m.position(), m.id()));
        Ok(modules)
    }

    async fn insert_new_segment(
        &self,
        segment: &ValidatedSegment,
    ) -> Result<SegmentId, StorageError> {
        let modules = lock(&self.modules)?;
        if !modules.contains_key(&segment.module_id) {
            return Err(StorageError::Conflict);
        }
        let mut guard = lock(&self.segments)?;
        let id = SegmentId::new(next_id(guard.keys().next_back().map(SegmentId::value)));
        let position = guard
            .values()
            .filter(|s| s.module_id() == segment.module_id)
            .map(Segment::position)
            .max()
            .unwrap_or(0)
            + 1;
        guard.insert(id, segment.clone().assign(id, position));
        Ok(id)
    }

    async fn get_segment(&self, id: SegmentId) -> Result<Option<Segment>, StorageError> {
        Ok(lock(&self.segments)?.get(&id).cloned())
    }

    async fn list_segments(&self, module: Option<ModuleId>) -> Result<Vec<Segment>, StorageError> {
        let modules = lock(&self.modules)?;
        let guard = lock(&self.segments)?;
        let mut segments: Vec<_> = guard
            .values()
            .filter(|s| module.is_none_or(|m| s.module_id() == m))
            .cloned()
            .collect();
        segments.sort_by_key(|s| {
            let module_pos = modules.get(&s.module_id()).map_or(0, CourseModule::position);
            (module_pos, s.module_id(), s.position(), s.id())
        });
        Ok(segments)
    }

    async fn reorder_segments(
        &self,
        module: ModuleId,
        ordered: &[SegmentId],
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.segments)?;
        let all_in_module = ordered
            .iter()
            .all(|id| guard.get(id).is_some_and(|s| s.module_id() == module));
        if !all_in_module {
            return Err(StorageError::NotFound);
        }
        for (idx, id) in ordered.iter().enumerate() {
            let position = u32::try_from(idx + 1)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            if let Some(segment) = guard.get_mut(id) {
                segment.set_position(position);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let record = ProgressRecord::new(user_id, segment_id);
        Ok(lock(&self.progress)?.get(&record).copied())
    }

    async fn get_all_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = lock(&self.progress)?;
        let mut records: Vec<_> = guard.iter().filter(|p| p.user_id == user_id).copied().collect();
        records.sort_by_key(|p| p.segment_id);
        Ok(records)
    }

    async fn mark_as_watched(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<(), StorageError> {
        if !lock(&self.users)?.contains_key(&user_id)
            || !lock(&self.segments)?.contains_key(&segment_id)
        {
            return Err(StorageError::Conflict);
        }
        let mut guard = lock(&self.progress)?;
        if !guard.insert(ProgressRecord::new(user_id, segment_id)) {
            return Err(StorageError::UniqueViolation);
        }
        Ok(())
    }

    async fn get_segment_completed_progress(
        &self,
        segment_id: SegmentId,
    ) -> Result<u64, StorageError> {
        let guard = lock(&self.progress)?;
        let users: BTreeSet<UserId> = guard
            .iter()
            .filter(|p| p.segment_id == segment_id)
            .map(|p| p.user_id)
            .collect();
        Ok(users.len() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository {
    async fn insert_new_comment(
        &self,
        comment: &ValidatedComment,
    ) -> Result<CommentId, StorageError> {
        if !lock(&self.users)?.contains_key(&comment.user_id)
            || !lock(&self.segments)?.contains_key(&comment.segment_id)
        {
            return Err(StorageError::Conflict);
        }
        let mut counter = lock(&self.next_comment_id)?;
        *counter += 1;
        let id = CommentId::new(*counter);
        lock(&self.comments)?
            .entry(comment.segment_id)
            .or_default()
            .push(comment.clone().assign_id(id));
        Ok(id)
    }

    async fn list_comments(&self, segment_id: SegmentId) -> Result<Vec<Comment>, StorageError> {
        let guard = lock(&self.comments)?;
        let mut comments = guard.get(&segment_id).cloned().unwrap_or_default();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub course: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Expose one repository value through every trait object.
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + CourseRepository
            + ProgressRepository
            + CommentRepository
            + Clone
            + 'static,
    {
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let course: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let comments: Arc<dyn CommentRepository> = Arc::new(repo);
        Self {
            users,
            course,
            progress,
            comments,
        }
    }
}
