use super::{backup::write_backup, open_project};
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use leadgen_core::{
    config::{ConfigOverrides, WarnLevel},
    render::DefaultRenderer,
    scheduler::{ChannelSummary, PassScope, PassSummary, Scheduler},
    sender::SimulatedSender,
};
use std::path::Path;

#[derive(Args)]
pub struct RunArgs {
    /// Only run the email pass
    #[arg(long, conflicts_with = "linkedin_only")]
    email_only: bool,

    /// Only run the LinkedIn pass
    #[arg(long)]
    linkedin_only: bool,

    /// Skip the pacing delay between sends
    #[arg(long)]
    no_delay: bool,

    /// Skip the pre-run database backup
    #[arg(long)]
    no_backup: bool,

    /// Override linkedin.connection_limit_per_day
    #[arg(long, value_name = "N")]
    connection_limit: Option<u32>,

    /// Override linkedin.message_limit_per_day
    #[arg(long, value_name = "N")]
    message_limit: Option<u32>,

    /// Override email.emails_per_day
    #[arg(long, value_name = "N")]
    emails_per_day: Option<u32>,

    /// Override email.follow_up_days
    #[arg(long, value_name = "N")]
    follow_up_days: Option<u32>,

    /// Override email.max_follow_ups
    #[arg(long, value_name = "N")]
    max_follow_ups: Option<u32>,
}

impl RunArgs {
    fn scope(&self) -> PassScope {
        if self.email_only {
            PassScope::EmailOnly
        } else if self.linkedin_only {
            PassScope::LinkedinOnly
        } else {
            PassScope::All
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            connection_limit_per_day: self.connection_limit,
            message_limit_per_day: self.message_limit,
            emails_per_day: self.emails_per_day,
            follow_up_days: self.follow_up_days,
            max_follow_ups: self.max_follow_ups,
            no_delay: self.no_delay,
        }
    }
}

pub fn run(root: &Path, args: RunArgs, json: bool) -> anyhow::Result<()> {
    let (mut config, store) = open_project(root)?;
    config.apply(&args.overrides());

    let warnings = config.validate();
    for w in &warnings {
        tracing::warn!("{}", w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config has errors; see 'leadgen config validate'");
    }

    if config.database.backup_before_run && !args.no_backup {
        write_backup(root, &store)?;
    }

    let sender = SimulatedSender::new(config.pacing.clone());
    let renderer = DefaultRenderer::new();
    let summary = Scheduler::new(&store, &config, &sender, &renderer)
        .run_pass(Utc::now(), args.scope())
        .context("scheduling pass failed")?;

    if json {
        print_json(&summary)?;
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &PassSummary) {
    let rows: Vec<Vec<String>> = [&summary.linkedin, &summary.email]
        .into_iter()
        .map(summary_row)
        .collect();
    print_table(
        &[
            "CHANNEL",
            "CANDIDATES",
            "NO_CONTACT",
            "WAITING",
            "FOLLOW_UPS",
            "FIRST_TOUCH",
            "DEFERRED",
            "FAILED",
        ],
        rows,
    );
    println!("\nSent {} messages.", summary.total_sent());
}

fn summary_row(c: &ChannelSummary) -> Vec<String> {
    if !c.ran {
        return vec![c.channel.to_string(), "skipped".to_string()];
    }
    vec![
        c.channel.to_string(),
        c.candidates.to_string(),
        c.missing_field.to_string(),
        c.waiting.to_string(),
        c.follow_ups_sent.to_string(),
        c.first_touch_sent.to_string(),
        c.deferred.to_string(),
        c.failures().to_string(),
    ]
}
