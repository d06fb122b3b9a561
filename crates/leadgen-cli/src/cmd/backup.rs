use super::open_project;
use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use leadgen_core::{paths, store::LeadStore};
use std::path::{Path, PathBuf};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let dest = write_backup(root, &store)?;

    if json {
        print_json(&serde_json::json!({ "backup": dest }))?;
    } else {
        println!("Backup written: {}", dest.display());
    }
    Ok(())
}

/// Copy the store to `.leadgen/backups/leads_backup_<timestamp>.db`.
pub(crate) fn write_backup(root: &Path, store: &LeadStore) -> anyhow::Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let dest = paths::backup_file(root, &stamp);
    store
        .backup_to(&dest)
        .with_context(|| format!("failed to write backup {}", dest.display()))?;
    Ok(dest)
}
