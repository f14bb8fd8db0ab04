use course_core::model::{Comment, CommentId, SegmentId, ValidatedComment};

use super::SqliteRepository;
use super::mapping::{comment_id_from_i64, db_err, id_i64, map_comment_row};
use crate::repository::{CommentRepository, StorageError};

#[async_trait::async_trait]
impl CommentRepository for SqliteRepository {
    async fn insert_new_comment(
        &self,
        comment: &ValidatedComment,
    ) -> Result<CommentId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO comments (segment_id, user_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_i64("segment_id", comment.segment_id.value())?)
        .bind(id_i64("user_id", comment.user_id.value())?)
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        comment_id_from_i64(res.last_insert_rowid())
    }

    async fn list_comments(&self, segment_id: SegmentId) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, segment_id, user_id, body, created_at
            FROM comments
            WHERE segment_id = ?1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(id_i64("segment_id", segment_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_comment_row).collect()
    }
}
