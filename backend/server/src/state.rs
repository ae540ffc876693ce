use std::sync::Arc;

use tracing::{info, warn};

use super::{
    config::Config,
    database::{RedisStore, init_redis},
    error::AppError,
    store::{ConfigStore, MemoryStore, RegistrationStore},
};

pub struct State {
    pub config: Config,
    pub config_store: Arc<dyn ConfigStore>,
    pub registrations: Arc<dyn RegistrationStore>,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        match config.redis_url.clone() {
            Some(redis_url) => {
                info!("Connecting to Redis...");
                let connection = init_redis(&redis_url).await?;
                let store = Arc::new(RedisStore::new(connection, &config.redis_prefix));

                Ok(Self::with_stores(config, store.clone(), store))
            }
            None => {
                warn!("REDIS_URL not set, keeping everything in memory");

                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn in_memory(config: Config) -> Arc<Self> {
        let store = Arc::new(MemoryStore::default());

        Self::with_stores(config, store.clone(), store)
    }

    pub fn with_stores(
        config: Config,
        config_store: Arc<dyn ConfigStore>,
        registrations: Arc<dyn RegistrationStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            config_store,
            registrations,
        })
    }
}
