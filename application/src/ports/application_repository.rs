//! Application repository port
//!
//! Receives a write-through snapshot of the session's record after every
//! mutation. Durability is entirely the adapter's concern; the workflow keeps
//! running if a save fails.

use async_trait::async_trait;
use permitflow_domain::{ApplicationId, ApplicationRecord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Port for storing application records
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert or replace the record with the same id
    async fn save(&self, record: &ApplicationRecord) -> Result<(), RepositoryError>;

    async fn get(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;

    async fn remove(&self, id: ApplicationId) -> Result<(), RepositoryError>;
}

/// Repository that stores nothing.
pub struct NoApplicationRepository;

#[async_trait]
impl ApplicationRepository for NoApplicationRepository {
    async fn save(&self, _record: &ApplicationRecord) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get(&self, _id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    async fn remove(&self, _id: ApplicationId) -> Result<(), RepositoryError> {
        Ok(())
    }
}
