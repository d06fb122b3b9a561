mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    campaign::CampaignSubcommand, config::ConfigSubcommand, lead::LeadSubcommand, run::RunArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "leadgen",
    about = "Outbound lead pipeline: import, enrich, schedule outreach, and report",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .leadgen/)
    #[arg(long, global = true, env = "LEADGEN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .leadgen/ with a default config and an empty lead store
    Init,

    /// Import scraped lead profiles from a JSON array file
    Import { file: PathBuf },

    /// Fill in missing emails and LinkedIn URLs for new leads
    Enrich {
        /// Maximum leads to examine (default: linkedin.profile_finder_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run one scheduling pass over LinkedIn and email
    Run(RunArgs),

    /// Inspect and annotate leads
    Lead {
        #[command(subcommand)]
        subcommand: LeadSubcommand,
    },

    /// Inspect outreach campaigns
    Campaign {
        #[command(subcommand)]
        subcommand: CampaignSubcommand,
    },

    /// Pipeline summary and upcoming follow-ups
    Report {
        /// Look-ahead window for follow-ups, in days
        #[arg(long, default_value = "7")]
        days: i64,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Write a timestamped copy of the lead store to .leadgen/backups/
    Backup,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run(_) | Commands::Enrich { .. } | Commands::Import { .. } => {
            tracing::Level::INFO
        }
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Import { file } => cmd::import::run(&root, &file, cli.json),
        Commands::Enrich { limit } => cmd::enrich::run(&root, limit, cli.json),
        Commands::Run(args) => cmd::run::run(&root, args, cli.json),
        Commands::Lead { subcommand } => cmd::lead::run(&root, subcommand, cli.json),
        Commands::Campaign { subcommand } => cmd::campaign::run(&root, subcommand, cli.json),
        Commands::Report { days } => cmd::report::run(&root, days, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Backup => cmd::backup::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
