//! Handler registry
//!
//! One handler per (database, driver kind) for the lifetime of the process.
//! The map lock is only held to fetch a key's slot; construction runs inside
//! the slot's init-once cell, so racing first callers wait on a single
//! construction instead of building their own.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::MongoConfig;
use crate::error::BenchResult;

use super::{AsyncHandler, BlockingHandler, DatabaseName, DriverKind, Handler};

/// Cache key of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct HandlerKey {
    pub database: DatabaseName,
    pub driver: DriverKind,
}

type Slot = Arc<OnceCell<Arc<Handler>>>;

pub struct HandlerManager {
    config: Arc<MongoConfig>,
    slots: Mutex<HashMap<HandlerKey, Slot>>,
    constructed: AtomicUsize,
}

impl HandlerManager {
    pub fn new(config: MongoConfig) -> Self {
        Self {
            config: Arc::new(config),
            slots: Mutex::new(HashMap::new()),
            constructed: AtomicUsize::new(0),
        }
    }

    /// Handler for the default pair: the `testing` database, blocking driver.
    pub async fn default_handler(&self) -> BenchResult<Arc<Handler>> {
        self.get_handler(DatabaseName::default(), DriverKind::default())
            .await
    }

    /// Return the handler for `(database, driver)`, constructing it on first use.
    ///
    /// A failed construction caches nothing; the next call tries again.
    pub async fn get_handler(
        &self,
        database: DatabaseName,
        driver: DriverKind,
    ) -> BenchResult<Arc<Handler>> {
        let key = HandlerKey { database, driver };
        let slot = self.slots.lock().entry(key).or_default().clone();

        let handler = slot.get_or_try_init(|| self.construct(key)).await?;
        Ok(handler.clone())
    }

    /// Same as [`get_handler`](Self::get_handler) with string labels.
    /// Unknown labels fail before anything is constructed.
    pub async fn get_handler_named(
        &self,
        database: &str,
        driver: &str,
    ) -> BenchResult<Arc<Handler>> {
        let database: DatabaseName = database.parse()?;
        let driver: DriverKind = driver.parse()?;
        self.get_handler(database, driver).await
    }

    async fn construct(&self, key: HandlerKey) -> BenchResult<Arc<Handler>> {
        tracing::info!(
            "Creating {} handler for database {}",
            key.driver,
            key.database
        );

        let handler = match key.driver {
            DriverKind::Blocking => {
                let config = self.config.clone();
                let handler = tokio::task::spawn_blocking(move || {
                    BlockingHandler::connect(&config, key.database)
                })
                .await??;
                Handler::Blocking(handler)
            }
            DriverKind::NonBlocking => {
                Handler::NonBlocking(AsyncHandler::connect(&self.config, key.database).await?)
            }
        };

        self.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(handler))
    }

    /// Number of handlers built so far.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// Keys whose handler is built, sorted for stable output.
    pub fn live_handlers(&self) -> Vec<HandlerKey> {
        let mut keys: Vec<HandlerKey> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| *key)
            .collect();
        keys.sort_by_key(|key| (key.database.as_str(), key.driver.as_str()));
        keys
    }
}
