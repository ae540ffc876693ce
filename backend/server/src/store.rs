//! # Stores
//!
//! Storage seams for the config document and the registrations.
//!
//! - [`crate::database::RedisStore`] backs production
//! - [`MemoryStore`] backs tests and runs without `REDIS_URL`
//!
//! Email uniqueness belongs to the store. Two concurrent inserts with the
//! same address must end with one record and one `DuplicateEmail`.
use std::collections::HashMap;

use async_trait::async_trait;
use bank::{Registration, Section, SiteConfig, Status};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current document, created with defaults on first read.
    async fn load_config(&self) -> Result<SiteConfig, StoreError>;

    async fn save_config(&self, config: &SiteConfig) -> Result<(), StoreError>;

    /// Persists only `section` (and `updatedAt`) from `config`.
    async fn save_section(&self, section: Section, config: &SiteConfig) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn insert(&self, registration: &Registration) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Registration, StoreError>;

    async fn all(&self) -> Result<Vec<Registration>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn update_status(&self, id: Uuid, status: Status) -> Result<Registration, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Registrations {
    by_id: HashMap<Uuid, Registration>,
    emails: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    config: Mutex<Option<SiteConfig>>,
    registrations: Mutex<Registrations>,
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load_config(&self) -> Result<SiteConfig, StoreError> {
        let mut stored = self.config.lock().await;

        Ok(stored.get_or_insert_with(SiteConfig::default).clone())
    }

    async fn save_config(&self, config: &SiteConfig) -> Result<(), StoreError> {
        *self.config.lock().await = Some(config.clone());

        Ok(())
    }

    async fn save_section(&self, section: Section, config: &SiteConfig) -> Result<(), StoreError> {
        let mut stored = self.config.lock().await;

        stored
            .get_or_insert_with(SiteConfig::default)
            .copy_section(section, config);

        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn insert(&self, registration: &Registration) -> Result<(), StoreError> {
        let mut registrations = self.registrations.lock().await;
        let email = registration.email.to_lowercase();

        if registrations.emails.contains_key(&email) {
            return Err(StoreError::DuplicateEmail);
        }

        registrations.emails.insert(email, registration.id);
        registrations
            .by_id
            .insert(registration.id, registration.clone());

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Registration, StoreError> {
        self.registrations
            .lock()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn all(&self) -> Result<Vec<Registration>, StoreError> {
        Ok(self
            .registrations
            .lock()
            .await
            .by_id
            .values()
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.registrations.lock().await.by_id.len())
    }

    async fn update_status(&self, id: Uuid, status: Status) -> Result<Registration, StoreError> {
        let mut registrations = self.registrations.lock().await;
        let registration = registrations
            .by_id
            .get_mut(&id)
            .ok_or(StoreError::NotFound)?;

        registration.status = status;

        Ok(registration.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut registrations = self.registrations.lock().await;
        let removed = registrations
            .by_id
            .remove(&id)
            .ok_or(StoreError::NotFound)?;

        registrations.emails.remove(&removed.email.to_lowercase());

        Ok(())
    }
}
