use crate::output::print_json;
use anyhow::Context;
use leadgen_core::{config::Config, io, paths, store::LeadStore};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "leadgen".to_string());

    if !json {
        println!("Initializing leadgen in: {}", root.display());
    }

    for dir in [paths::LEADGEN_DIR, paths::BACKUPS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_created = if paths::config_path(root).exists() {
        false
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        true
    };
    let config = Config::load(root).context("failed to load config")?;

    let db = config.database_path(root);
    let db_created = !db.exists();
    let store = LeadStore::open(&db)
        .with_context(|| format!("failed to create lead store at {}", db.display()))?;
    let schema_version = store.schema_version()?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "config_created": config_created,
            "database": db,
            "database_created": db_created,
            "schema_version": schema_version,
        }))?;
    } else {
        let verb = |created: bool| if created { "created:" } else { "exists: " };
        println!("  {} {}", verb(config_created), paths::CONFIG_FILE);
        println!("  {} {}", verb(db_created), db.display());
        println!("\nNext: leadgen import <profiles.json>");
    }
    Ok(())
}
