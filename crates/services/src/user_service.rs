use std::sync::Arc;

use course_core::model::{User, UserDraft, UserId};
use course_core::stats::Audience;
use storage::repository::{StorageError, UserRepository};
use tracing::info;

use crate::Clock;
use crate::error::UserServiceError;

/// Signup, entitlement changes, and audience counts.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Create a member account. New users are never premium.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for an invalid display name.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn register(&self, display_name: String) -> Result<UserId, UserServiceError> {
        self.insert(UserDraft::member(display_name)).await
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Same as [`UserService::register`].
    pub async fn register_admin(&self, display_name: String) -> Result<UserId, UserServiceError> {
        self.insert(UserDraft::admin(display_name)).await
    }

    async fn insert(&self, draft: UserDraft) -> Result<UserId, UserServiceError> {
        let user = draft.validate(self.clock.now())?;
        let id = self.users.insert_new_user(&user).await?;
        info!(user_id = %id, role = user.role.as_str(), "registered user");
        Ok(id)
    }

    /// Create an admin when the user table is empty.
    ///
    /// Returns the new admin's id, or `None` if any user already exists.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError` if counting or insertion fails.
    pub async fn ensure_admin(
        &self,
        display_name: String,
    ) -> Result<Option<UserId>, UserServiceError> {
        if self.users.count_users(Audience::AllUsers).await? > 0 {
            return Ok(None);
        }
        self.register_admin(display_name).await.map(Some)
    }

    /// Returns `Ok(None)` when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        Ok(self.users.get_user(id).await?)
    }

    /// Grant or revoke the premium entitlement. Called on behalf of billing.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::UserNotFound` if the user does not exist.
    pub async fn set_premium(&self, id: UserId, is_premium: bool) -> Result<(), UserServiceError> {
        match self.users.set_premium(id, is_premium).await {
            Ok(()) => {
                info!(user_id = %id, is_premium, "updated premium entitlement");
                Ok(())
            }
            Err(StorageError::NotFound) => Err(UserServiceError::UserNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn count_eligible_users(&self, audience: Audience) -> Result<u64, UserServiceError> {
        Ok(self.users.count_users(audience).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use course_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> UserService {
        UserService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn premium_toggle_changes_audience_counts() {
        let service = service();
        let a = service.register("A".into()).await.unwrap();
        service.register("B".into()).await.unwrap();

        service.set_premium(a, true).await.unwrap();
        assert_eq!(service.count_eligible_users(Audience::AllUsers).await.unwrap(), 2);
        assert_eq!(service.count_eligible_users(Audience::PremiumOnly).await.unwrap(), 1);

        service.set_premium(a, false).await.unwrap();
        assert_eq!(service.count_eligible_users(Audience::PremiumOnly).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn set_premium_on_missing_user_is_not_found() {
        let err = service().set_premium(UserId::new(9), true).await.unwrap_err();
        assert!(matches!(err, UserServiceError::UserNotFound(id) if id == UserId::new(9)));
    }

    #[tokio::test]
    async fn ensure_admin_only_bootstraps_empty_store() {
        let service = service();
        let admin = service.ensure_admin("root".into()).await.unwrap();
        let admin = admin.expect("admin created");
        assert!(service.get_user(admin).await.unwrap().unwrap().is_admin());

        assert!(service.ensure_admin("again".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_rejects_blank_names() {
        let err = service().register("  ".into()).await.unwrap_err();
        assert!(matches!(err, UserServiceError::User(_)));
    }
}
