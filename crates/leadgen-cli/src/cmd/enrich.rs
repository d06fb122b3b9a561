use super::open_project;
use crate::output::print_json;
use anyhow::Context;
use leadgen_core::enrich::{run_enrichment, SimulatedProfileFinder};
use std::path::Path;

pub fn run(root: &Path, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let (config, store) = open_project(root)?;
    if !config.linkedin.profile_finder_enabled {
        anyhow::bail!("profile finder is disabled (linkedin.profile_finder_enabled: false)");
    }
    let limit = limit.unwrap_or(config.linkedin.profile_finder_limit as usize);

    let summary =
        run_enrichment(&store, &SimulatedProfileFinder, limit).context("enrichment failed")?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Examined {} leads: {} contacts updated ({} LinkedIn, {} email), {} without a contact, {} lookups failed.",
            summary.examined,
            summary.contacts_updated,
            summary.linkedin_found,
            summary.emails_found,
            summary.no_contact,
            summary.finder_failures
        );
    }
    Ok(())
}
