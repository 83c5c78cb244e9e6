//! Session repository for server-side session state.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::sessions;

/// Session repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a session token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Records a newly issued session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<sessions::Model, DbErr> {
        let session = sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(Self::hash_token(token)),
            expires_at: Set(expires_at.into()),
            revoked_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        session.insert(&self.db).await
    }

    /// Finds the live session for a token, if any.
    ///
    /// A session is live when it is not revoked and not past its expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_live(&self, token: &str) -> Result<Option<sessions::Model>, DbErr> {
        sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(Self::hash_token(token)))
            .filter(sessions::Column::RevokedAt.is_null())
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
    }

    /// Revokes the session for a token. Revoking an unknown or already
    /// revoked token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke(&self, token: &str) -> Result<(), DbErr> {
        let Some(session) = self.find_live(token).await? else {
            return Ok(());
        };

        let mut active: sessions::ActiveModel = session.into();
        active.revoked_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;

        Ok(())
    }
}
