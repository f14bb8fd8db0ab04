use course_core::model::{ProgressRecord, SegmentId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    count_from_i64, db_err, id_i64, ser, segment_id_from_i64, user_id_from_i64,
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT user_id, segment_id FROM progress WHERE user_id = ?1 AND segment_id = ?2",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(id_i64("segment_id", segment_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(ProgressRecord::new(
                user_id_from_i64(row.try_get("user_id").map_err(ser)?)?,
                segment_id_from_i64(row.try_get("segment_id").map_err(ser)?)?,
            ))),
            None => Ok(None),
        }
    }

    async fn get_all_progress_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT segment_id FROM progress WHERE user_id = ?1 ORDER BY segment_id",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let segment_id = segment_id_from_i64(row.try_get("segment_id").map_err(ser)?)?;
            out.push(ProgressRecord::new(user_id, segment_id));
        }
        Ok(out)
    }

    async fn mark_as_watched(
        &self,
        user_id: UserId,
        segment_id: SegmentId,
    ) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO progress (user_id, segment_id) VALUES (?1, ?2)")
            .bind(id_i64("user_id", user_id.value())?)
            .bind(id_i64("segment_id", segment_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_segment_completed_progress(
        &self,
        segment_id: SegmentId,
    ) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM progress WHERE segment_id = ?1")
                .bind(id_i64("segment_id", segment_id.value())?)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
        count_from_i64(count)
    }
}
