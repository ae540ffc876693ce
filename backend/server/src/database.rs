//! # Redis
//!
//! Persistent store for the site config and the registrations.
//!
//! ## Layout
//!
//! - `{prefix}:config`: hash, one field per section holding its JSON, plus `updatedAt`
//! - `{prefix}:registrations`: hash, registration id to record JSON
//! - `{prefix}:emails`: hash, lowercased email to registration id
//!
//! ## Consistency
//!
//! - Section writes touch their own hash field only, so writes to different
//!   sections interleave safely and writes to the same section are last-writer-wins
//! - Email uniqueness is claimed with `HSETNX` before the record is written,
//!   which Redis runs atomically, so a racing second insert always loses
//! - The default document is seeded with `HSETNX` per field, so two first reads
//!   cannot overwrite each other or an admin's early write
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use bank::{Registration, Section, SiteConfig, Status};
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::StoreError,
    store::{ConfigStore, RegistrationStore},
};

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config_key: String,
    registrations_key: String,
    emails_key: String,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, prefix: &str) -> Self {
        Self {
            connection,
            config_key: format!("{prefix}:config"),
            registrations_key: format!("{prefix}:registrations"),
            emails_key: format!("{prefix}:emails"),
        }
    }

    async fn seed_defaults(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let mut pipe = redis::pipe();

        for (field, value) in SiteConfig::default().to_fields()? {
            pipe.hset_nx(&self.config_key, field, value).ignore();
        }

        let _: () = pipe.query_async(&mut connection).await?;
        info!("Seeded default site config");

        Ok(())
    }
}

#[async_trait]
impl ConfigStore for RedisStore {
    async fn load_config(&self) -> Result<SiteConfig, StoreError> {
        let mut connection = self.connection.clone();
        let mut fields: HashMap<String, String> = connection.hgetall(&self.config_key).await?;

        if fields.is_empty() {
            self.seed_defaults().await?;
            fields = connection.hgetall(&self.config_key).await?;
        }

        Ok(SiteConfig::from_fields(&fields)?)
    }

    async fn save_config(&self, config: &SiteConfig) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let fields = config.to_fields()?;

        let _: () = connection.hset_multiple(&self.config_key, &fields[..]).await?;

        Ok(())
    }

    async fn save_section(&self, section: Section, config: &SiteConfig) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let fields = [
            (section.key(), config.section_value(section)?.to_string()),
            (
                bank::config::UPDATED_AT_KEY,
                serde_json::to_string(&config.updated_at)?,
            ),
        ];

        let _: () = connection.hset_multiple(&self.config_key, &fields[..]).await?;

        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for RedisStore {
    async fn insert(&self, registration: &Registration) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let email = registration.email.to_lowercase();
        let id = registration.id.to_string();
        let record = serde_json::to_string(registration)?;

        let claimed: bool = connection.hset_nx(&self.emails_key, &email, &id).await?;
        if !claimed {
            return Err(StoreError::DuplicateEmail);
        }

        let written: Result<(), redis::RedisError> =
            connection.hset(&self.registrations_key, &id, record).await;

        if let Err(e) = written {
            warn!("Releasing email claim for {id} after failed write");
            let _: Result<(), _> = connection.hdel(&self.emails_key, &email).await;

            return Err(e.into());
        }

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Registration, StoreError> {
        let mut connection = self.connection.clone();
        let record: Option<String> = connection
            .hget(&self.registrations_key, id.to_string())
            .await?;

        let record = record.ok_or(StoreError::NotFound)?;

        Ok(serde_json::from_str(&record)?)
    }

    async fn all(&self) -> Result<Vec<Registration>, StoreError> {
        let mut connection = self.connection.clone();
        let records: Vec<String> = connection.hvals(&self.registrations_key).await?;

        records
            .iter()
            .map(|record| serde_json::from_str(record).map_err(StoreError::from))
            .collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hlen(&self.registrations_key).await?)
    }

    async fn update_status(&self, id: Uuid, status: Status) -> Result<Registration, StoreError> {
        let mut registration = self.get(id).await?;
        registration.status = status;

        let mut connection = self.connection.clone();
        let _: () = connection
            .hset(
                &self.registrations_key,
                id.to_string(),
                serde_json::to_string(&registration)?,
            )
            .await?;

        Ok(registration)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let registration = self.get(id).await?;

        let mut connection = self.connection.clone();
        let _: () = redis::pipe()
            .atomic()
            .hdel(&self.registrations_key, id.to_string())
            .ignore()
            .hdel(&self.emails_key, registration.email.to_lowercase())
            .ignore()
            .query_async(&mut connection)
            .await?;

        Ok(())
    }
}
