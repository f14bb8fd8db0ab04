use course_core::model::{User, UserId, ValidatedUser};
use course_core::stats::Audience;

use super::SqliteRepository;
use super::mapping::{count_from_i64, db_err, flag_to_i64, id_i64, map_user_row, user_id_from_i64};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_new_user(&self, user: &ValidatedUser) -> Result<UserId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO users (display_name, role, is_premium, created_at)
            VALUES (?1, ?2, 0, ?3)
            ",
        )
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        user_id_from_i64(res.last_insert_rowid())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, display_name, role, is_premium, created_at
            FROM users WHERE id = ?1
            ",
        )
        .bind(id_i64("user_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn set_premium(&self, id: UserId, is_premium: bool) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE users SET is_premium = ?1 WHERE id = ?2")
            .bind(flag_to_i64(is_premium))
            .bind(id_i64("user_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn count_users(&self, audience: Audience) -> Result<u64, StorageError> {
        let sql = match audience {
            Audience::AllUsers => "SELECT COUNT(*) FROM users",
            Audience::PremiumOnly => "SELECT COUNT(*) FROM users WHERE is_premium = 1",
        };
        let count: i64 = sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        count_from_i64(count)
    }
}
