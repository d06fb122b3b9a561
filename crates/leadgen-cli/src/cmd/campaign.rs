use super::open_project;
use crate::output::{date_cell, print_json, print_table};
use clap::Subcommand;
use leadgen_core::{model::Campaign, recorder::CampaignRecorder, types::Channel};
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum CampaignSubcommand {
    /// List campaigns, newest first
    List {
        /// email or linkedin; both when omitted
        #[arg(long)]
        channel: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: CampaignSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CampaignSubcommand::List { channel } => list(root, channel.as_deref(), json),
    }
}

fn list(root: &Path, channel: Option<&str>, json: bool) -> anyhow::Result<()> {
    let channels = match channel {
        Some(c) => vec![Channel::from_str(c)?],
        None => Channel::all().to_vec(),
    };

    let (_, store) = open_project(root)?;
    let recorder = CampaignRecorder::new(&store);
    let mut campaigns: Vec<Campaign> = Vec::new();
    for channel in channels {
        campaigns.extend(recorder.list_campaigns(channel)?);
    }

    if json {
        return print_json(&campaigns);
    }
    if campaigns.is_empty() {
        println!("No campaigns.");
        return Ok(());
    }

    let rows = campaigns
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.channel.to_string(),
                c.name.clone(),
                c.status.to_string(),
                date_cell(c.start_date),
                date_cell(c.end_date),
                c.sends.to_string(),
            ]
        })
        .collect();
    print_table(
        &["ID", "CHANNEL", "NAME", "STATUS", "STARTED", "ENDED", "SENDS"],
        rows,
    );
    Ok(())
}
