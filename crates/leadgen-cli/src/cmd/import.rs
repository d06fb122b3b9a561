use super::open_project;
use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use leadgen_core::import::{import_profiles, load_profiles};
use std::path::Path;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let profiles = load_profiles(file)
        .with_context(|| format!("failed to read profiles from {}", file.display()))?;
    let summary = import_profiles(&store, &profiles, Utc::now()).context("import failed")?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Imported {} of {} profiles ({} duplicates, {} enriched, {} skipped, {} contacts).",
            summary.companies_created,
            summary.total,
            summary.duplicates,
            summary.companies_enriched,
            summary.skipped,
            summary.contacts_created
        );
    }
    Ok(())
}
