pub mod backup;
pub mod campaign;
pub mod config;
pub mod enrich;
pub mod import;
pub mod init;
pub mod lead;
pub mod report;
pub mod run;

use anyhow::Context;
use leadgen_core::{config::Config, store::LeadStore};
use std::path::Path;

/// Load the project config and open its lead store.
pub(crate) fn open_project(root: &Path) -> anyhow::Result<(Config, LeadStore)> {
    let config = Config::load(root).context("failed to load config")?;
    let db = config.database_path(root);
    let store = LeadStore::open(&db)
        .with_context(|| format!("failed to open lead store at {}", db.display()))?;
    Ok((config, store))
}
