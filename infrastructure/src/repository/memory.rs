//! Process-local record store

use async_trait::async_trait;
use permitflow_application::{ApplicationRepository, RepositoryError};
use permitflow_domain::{ApplicationId, ApplicationRecord};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps the latest snapshot of every record in memory.
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    records: RwLock<HashMap<ApplicationId, ApplicationRecord>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records belonging to a session, oldest first
    pub fn by_session(&self, session_id: &str) -> Vec<ApplicationRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut found: Vec<_> = records
            .values()
            .filter(|r| r.session_id() == session_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.created_at_ms(), r.id()));
        found
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn save(&self, record: &ApplicationRecord) -> Result<(), RepositoryError> {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id(), record.clone());
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }

    async fn remove(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        Ok(())
    }
}
