//! Startup wiring: config checks, storage, schema migrations.

use std::fs;
use std::net::ToSocketAddrs;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use taskkeeper_sql::SqliteStore;
use taskkeeper_task::TaskModule;

use crate::config::ServerConfig;

/// Verify the configuration and bring storage up to date. Runs before
/// the listener binds, so no request ever sees an unmigrated database.
pub fn prepare(config: &ServerConfig) -> anyhow::Result<TaskModule> {
    config
        .http
        .listen
        .to_socket_addrs()
        .with_context(|| format!("invalid listen address {}", config.http.listen))?;

    fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!("failed to create data dir {}", config.storage.data_dir.display())
    })?;

    let db_path = config.db_path();
    let db = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let module = TaskModule::new(Arc::new(db));
    module.migrate().context("schema migration failed")?;
    let version = module.store().schema_version().context("schema version check failed")?;
    info!(db = %db_path.display(), version, "storage ready");
    Ok(module)
}
