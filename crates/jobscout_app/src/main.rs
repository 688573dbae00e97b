mod config;
mod dashboard;
mod logging;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use console::style;

use config::AppConfig;
use logging::LogDestination;

/// Finds job postings on public search backends and scores them against a resume.
#[derive(Debug, Parser)]
#[command(name = "jobscout", version, about)]
struct Cli {
    /// RON config file. Defaults to ./jobscout.ron when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candidate resume (PDF, .txt or .md). Overrides the config file.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Number of concurrent scraper tabs.
    #[arg(long)]
    scrapers: Option<usize>,

    /// Number of concurrent analyzer workers.
    #[arg(long)]
    analyzers: Option<usize>,

    /// Print the effective configuration as RON and exit.
    #[arg(long)]
    print_config: bool,

    /// Log to the terminal instead of the log file; disables the dashboard.
    #[arg(long)]
    log_to_terminal: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(profile) = &self.profile {
            config.profile_path = profile.clone();
        }
        if let Some(scrapers) = self.scrapers {
            config.scraper_tabs = scrapers;
        }
        if let Some(analyzers) = self.analyzers {
            config.analyzer_workers = analyzers;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("{} {err:#}", style("FATAL ERROR:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
    let (mut config, source) = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    if cli.print_config {
        println!("{}", config.to_ron_pretty()?);
        return Ok(());
    }

    let destination = if cli.log_to_terminal {
        LogDestination::Terminal
    } else {
        LogDestination::File(config.log_file.clone())
    };
    logging::initialize(destination, config.log_level_filter()?);
    match &source {
        Some(path) => log::info!("Using config file {}", path.display()),
        None => log::info!("No config file found, using built-in defaults"),
    }

    run::run_pipeline(&config, !cli.log_to_terminal)?;
    Ok(())
}
