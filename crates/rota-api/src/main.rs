//! `rota-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP
//! server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use rota_api::config::Config;
use rota_api::server::Server;
use rota_core::model::default_rooms;
use rota_core::store::{BookingStore, MemoryStore, RoomCatalog};
use rota_core::{SqliteStore, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(config.log_format.resolve(config.debug));

    let (store, catalog): (Arc<dyn BookingStore>, Arc<dyn RoomCatalog>) =
        if let Some(path) = config.db_path.as_deref() {
            tracing::info!(path = %path, "Using SQLite store");
            let store = Arc::new(SqliteStore::open(path)?);
            (store.clone(), store)
        } else {
            if !config.debug {
                anyhow::bail!("ROTA_DB_PATH is required when ROTA_DEBUG=false");
            }
            tracing::warn!("ROTA_DB_PATH not set; using in-memory store (debug only)");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        };

    let seeded = catalog.seed_rooms(&default_rooms()).await?;
    if seeded > 0 {
        tracing::info!(rooms = seeded, "Seeded default room catalog");
    }

    let server = Server::with_storage(config, store, catalog);
    server.serve().await?;
    Ok(())
}
