use chrono::{DateTime, Utc};
use course_core::model::{
    Comment, CommentId, CourseModule, ModuleId, Role, Segment, SegmentId, User, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Classify driver errors: key violations get their own variants, the rest
/// are treated as connection failures.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StorageError::UniqueViolation;
        }
        if db.is_foreign_key_violation() {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

pub(crate) fn count_from_i64(v: i64) -> Result<u64, StorageError> {
    i64_to_u64("count", v)
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn module_id_from_i64(v: i64) -> Result<ModuleId, StorageError> {
    Ok(ModuleId::new(i64_to_u64("module_id", v)?))
}

pub(crate) fn segment_id_from_i64(v: i64) -> Result<SegmentId, StorageError> {
    Ok(SegmentId::new(i64_to_u64("segment_id", v)?))
}

pub(crate) fn comment_id_from_i64(v: i64) -> Result<CommentId, StorageError> {
    Ok(CommentId::new(i64_to_u64("comment_id", v)?))
}

pub(crate) fn flag_to_i64(flag: bool) -> i64 {
    if flag { 1 } else { 0 }
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let role = Role::parse(&row.try_get::<String, _>("role").map_err(ser)?).map_err(ser)?;
    User::from_persisted(
        user_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("display_name").map_err(ser)?,
        role,
        row.try_get::<i64, _>("is_premium").map_err(ser)? != 0,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<CourseModule, StorageError> {
    CourseModule::new(
        module_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        i64_to_u32("position", row.try_get("position").map_err(ser)?)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_segment_row(row: &SqliteRow) -> Result<Segment, StorageError> {
    Segment::from_persisted(
        segment_id_from_i64(row.try_get("id").map_err(ser)?)?,
        module_id_from_i64(row.try_get("module_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        i64_to_u32("position", row.try_get("position").map_err(ser)?)?,
        row.try_get::<i64, _>("is_premium").map_err(ser)? != 0,
        row.try_get::<Option<String>, _>("video_key").map_err(ser)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_comment_row(row: &SqliteRow) -> Result<Comment, StorageError> {
    Ok(Comment {
        id: comment_id_from_i64(row.try_get("id").map_err(ser)?)?,
        segment_id: segment_id_from_i64(row.try_get("segment_id").map_err(ser)?)?,
        user_id: user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
        body: row.try_get::<String, _>("body").map_err(ser)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(ser)?,
    })
}
