//! In-memory credential storage for development and testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::CredentialRepository;
use crate::auth::user::CredentialRecord;
use crate::error::{GymGuardError, Result};

/// In-memory credential storage keyed by email
#[derive(Clone, Default)]
pub struct MemoryCredentialRepository {
    records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
}

impl MemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn insert(&self, record: CredentialRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.email) {
            return Err(GymGuardError::AccountExists);
        }
        records.insert(record.email.clone(), record);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.records.read().await.get(email).cloned())
    }

    async fn replace(&self, record: CredentialRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.email) {
            Some(existing) if existing.id == record.id => {
                *existing = record;
                Ok(())
            }
            _ => Err(GymGuardError::StorageError(format!(
                "No credential record {} to replace",
                record.id
            ))),
        }
    }
}
