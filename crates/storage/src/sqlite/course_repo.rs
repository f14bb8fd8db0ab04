use course_core::model::{CourseModule, ModuleId, Segment, SegmentId, ValidatedSegment};

use super::SqliteRepository;
use super::mapping::{
    db_err, flag_to_i64, id_i64, map_module_row, map_segment_row, module_id_from_i64,
    segment_id_from_i64,
};
use crate::repository::{CourseRepository, NewModuleRecord, StorageError};

const SEGMENT_COLUMNS: &str =
    "s.id, s.module_id, s.title, s.position, s.is_premium, s.video_key, s.created_at";

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn insert_new_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO course_modules (title, position, created_at)
            VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM course_modules), ?2)
            ",
        )
        .bind(module.title)
        .bind(module.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        module_id_from_i64(res.last_insert_rowid())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<CourseModule>, StorageError> {
        let row = sqlx::query(
            "SELECT id, title, position, created_at FROM course_modules WHERE id = ?1",
        )
        .bind(id_i64("module_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_module_row).transpose()
    }

    async fn list_modules(&self) -> Result<Vec<CourseModule>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, title, position, created_at FROM course_modules ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_module_row).collect()
    }

    async fn insert_new_segment(
        &self,
        segment: &ValidatedSegment,
    ) -> Result<SegmentId, StorageError> {
        let module_id = id_i64("module_id", segment.module_id.value())?;

        // MAX(position) is read inside the INSERT so concurrent appends cannot collide.
        let res = sqlx::query(
            r"
            INSERT INTO segments (module_id, title, position, is_premium, video_key, created_at)
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM segments WHERE module_id = ?1),
                ?3, ?4, ?5
            )
            ",
        )
        .bind(module_id)
        .bind(&segment.title)
        .bind(flag_to_i64(segment.is_premium))
        .bind(segment.video_key.as_deref())
        .bind(segment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        segment_id_from_i64(res.last_insert_rowid())
    }

    async fn get_segment(&self, id: SegmentId) -> Result<Option<Segment>, StorageError> {
        let sql = format!("SELECT {SEGMENT_COLUMNS} FROM segments s WHERE s.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_i64("segment_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_segment_row).transpose()
    }

    async fn list_segments(&self, module: Option<ModuleId>) -> Result<Vec<Segment>, StorageError> {
        let sql = format!(
            r"
            SELECT {SEGMENT_COLUMNS}
            FROM segments s
            JOIN course_modules m ON m.id = s.module_id
            WHERE ?1 IS NULL OR s.module_id = ?1
            ORDER BY m.position, m.id, s.position, s.id
            "
        );
        let module = module
            .map(|m| id_i64("module_id", m.value()))
            .transpose()?;

        let rows = sqlx::query(&sql)
            .bind(module)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(map_segment_row).collect()
    }

    async fn reorder_segments(
        &self,
        module: ModuleId,
        ordered: &[SegmentId],
    ) -> Result<(), StorageError> {
        let module = id_i64("module_id", module.value())?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for (idx, id) in ordered.iter().enumerate() {
            let position = i64::try_from(idx + 1)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            let res = sqlx::query(
                "UPDATE segments SET position = ?1 WHERE id = ?2 AND module_id = ?3",
            )
            .bind(position)
            .bind(id_i64("segment_id", id.value())?)
            .bind(module)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            if res.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Err(StorageError::NotFound);
            }
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
