//! Persistence seam used by the HTTP layer.
//!
//! [`PgStore`] runs every mutation in its own transaction on a pooled
//! connection. The connection goes back to the pool when the guard drops,
//! on success and failure alike.

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};

use crate::models::profile::{Profile, ProfileFields};
use crate::models::project::{Project, ProjectFields};
use crate::services::{profile_service, project_service};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection unavailable: {0}")]
    Pool(String),
    #[error("rejected by the database: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation,
                info,
            ) => StoreError::Invalid(info.message().to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// Durable storage for the profile singleton and the project list.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn get_profile(&self) -> Result<Option<Profile>, StoreError>;

    /// Upsert the profile. `avatar` replaces the stored image only when `Some`.
    async fn save_profile(
        &self,
        fields: ProfileFields,
        avatar: Option<Vec<u8>>,
    ) -> Result<Profile, StoreError>;

    async fn get_profile_image(&self) -> Result<Option<Vec<u8>>, StoreError>;

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError>;

    async fn add_project(&self, fields: ProjectFields) -> Result<Project, StoreError>;

    /// `Ok(None)` when no project has this id; nothing is written.
    async fn update_project(
        &self,
        id: i32,
        fields: ProjectFields,
    ) -> Result<Option<Project>, StoreError>;

    /// `Ok(false)` when no project had this id.
    async fn delete_project(&self, id: i32) -> Result<bool, StoreError>;
}

pub type PgPool = Pool<AsyncPgConnection>;

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn connect(database_url: &str, max_connections: usize) -> anyhow::Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(max_connections)
            .build()
            .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))?;
        Ok(Self { pool })
    }

    /// Create the tables if needed and optionally seed a placeholder profile.
    pub async fn migrate(&self, seed_profile: bool) -> anyhow::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))?;

        tracing::info!("Running portfolio migration...");
        crate::migration::run_migration(&mut conn).await?;
        tracing::info!("Portfolio migration completed.");

        if seed_profile {
            crate::migration::seed_profile(&mut conn).await?;
        }
        Ok(())
    }

    async fn conn(&self) -> Result<Object<AsyncPgConnection>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl PortfolioStore for PgStore {
    async fn get_profile(&self) -> Result<Option<Profile>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(profile_service::get_profile(&mut conn).await?)
    }

    async fn save_profile(
        &self,
        fields: ProfileFields,
        avatar: Option<Vec<u8>>,
    ) -> Result<Profile, StoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                Ok(profile_service::save_profile(conn, &fields, avatar.as_deref()).await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_profile_image(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(profile_service::get_profile_image(&mut conn).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(project_service::list_projects(&mut conn).await?)
    }

    async fn get_project(&self, id: i32) -> Result<Option<Project>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(project_service::get_project(&mut conn, id).await?)
    }

    async fn add_project(&self, fields: ProjectFields) -> Result<Project, StoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move { Ok(project_service::add_project(conn, &fields).await?) }.scope_boxed()
        })
        .await
    }

    async fn update_project(
        &self,
        id: i32,
        fields: ProjectFields,
    ) -> Result<Option<Project>, StoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move { Ok(project_service::update_project(conn, id, &fields).await?) }
                .scope_boxed()
        })
        .await
    }

    async fn delete_project(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        conn.transaction::<_, StoreError, _>(|conn| {
            async move { Ok(project_service::delete_project(conn, id).await?) }.scope_boxed()
        })
        .await
    }
}
