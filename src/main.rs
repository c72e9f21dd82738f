use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use statbadge::app::domain::{AppSettings, ContributedStrategy, RenderOptions, SlotLayout};
use statbadge::app::infrastructure::{Credential, GitHubClient};
use statbadge::app::services::stats::{FileStatsProvider, GitHubStatsProvider, StatsProvider};
use statbadge::{Result, RunOptions, run};

/// Refresh the activity figures in the dark and light profile badges.
#[derive(Parser, Debug)]
#[command(name = "statbadge", version, about)]
struct Cli {
    /// Badge documents to update in place (defaults to the settings file)
    documents: Vec<PathBuf>,

    /// Settings file
    #[arg(short, long, default_value = "statbadge.json")]
    config: PathBuf,

    /// GitHub user to collect stats for (defaults to the token owner)
    #[arg(short, long, env = "STATBADGE_USER")]
    user: Option<String>,

    /// Position of value slots relative to their labels
    #[arg(long, value_enum)]
    layout: Option<SlotLayout>,

    /// How the contributed repository count is derived
    #[arg(long, value_enum)]
    contributed: Option<ContributedStrategy>,

    /// Reference date for the Uptime label (YYYY-MM-DD)
    #[arg(long)]
    uptime_since: Option<NaiveDate>,

    /// Read the stats record from a JSON file instead of the GitHub API
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Print the changes as a diff without writing any document
    #[arg(long)]
    dry_run: bool,

    /// Save the resolved settings to the settings file and exit
    #[arg(long)]
    write_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .init();
}

/// Settings file values, overridden by anything given on the command line.
fn resolve_settings(cli: &Cli) -> Result<AppSettings> {
    let mut settings = AppSettings::load(&cli.config)?;
    if let Some(user) = &cli.user {
        settings.username = Some(user.clone());
    }
    if let Some(layout) = cli.layout {
        settings.layout = layout;
    }
    if let Some(strategy) = cli.contributed {
        settings.contributed_strategy = strategy;
    }
    if let Some(since) = cli.uptime_since {
        settings.uptime_since = Some(since);
    }
    if !cli.documents.is_empty() {
        settings.documents = cli.documents.clone();
    }
    Ok(settings)
}

fn build_provider(cli: &Cli, settings: &AppSettings) -> Result<Box<dyn StatsProvider>> {
    if let Some(path) = &cli.stats_file {
        return Ok(Box::new(FileStatsProvider::new(path)));
    }

    let credential = Credential::from_env(&settings.token_env)?;
    let client = GitHubClient::new(settings.api_base.as_str(), credential);
    Ok(Box::new(GitHubStatsProvider::new(
        client,
        settings.username.clone(),
        settings.contributed_strategy,
        settings.include_org_repos,
    )))
}

fn execute(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    if cli.write_config {
        settings.save(&cli.config)?;
        log::info!("Settings written to {}", cli.config.display());
        return Ok(());
    }
    let provider = build_provider(cli, &settings)?;

    let options = RunOptions {
        documents: settings.documents.clone(),
        render: RenderOptions::new(settings.layout, settings.uptime_since),
        dry_run: cli.dry_run,
    };

    let summary = run(provider.as_ref(), &options)?;
    for outcome in &summary.documents {
        log::info!("{}: {} slot(s) updated", outcome.path.display(), outcome.updates);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
