use std::sync::Arc;

use anyhow::Context;
use console::style;
use jobscout_core::expand_tasks;
use jobscout_engine::{
    extract_profile_text, Collaborators, HttpBrowser, OllamaScorer, Pipeline, PipelineError,
    RunSummary, SearxParser,
};
use pipeline_logging::{pipeline_info, pipeline_warn};
use rand::seq::SliceRandom;

use crate::config::AppConfig;
use crate::dashboard::TerminalDashboard;

/// Runs one full discovery pass with `config` and prints the closing summary.
pub fn run_pipeline(config: &AppConfig, redraw: bool) -> anyhow::Result<RunSummary> {
    println!(
        "{}",
        style(format!(
            "Loading candidate profile from {}...",
            config.profile_path.display()
        ))
        .yellow()
    );
    let profile = extract_profile_text(&config.profile_path).map_err(PipelineError::from)?;
    println!(
        "{}",
        style("Successfully loaded and parsed candidate profile.").green()
    );

    let scorer = OllamaScorer::new(config.ollama_settings())
        .context("failed to set up the scoring client")?;
    let collaborators = Collaborators {
        browser: Arc::new(HttpBrowser::new(config.fetch_settings())),
        parser: Arc::new(SearxParser::new()),
        scorer: Arc::new(scorer),
        renderer: Box::new(TerminalDashboard::new(redraw)),
    };

    let mut tasks = expand_tasks(&config.title_tiers(), &config.countries);
    if config.shuffle_tasks {
        tasks.shuffle(&mut rand::thread_rng());
    }
    pipeline_info!("Prepared {} search tasks", tasks.len());

    let pipeline = Pipeline::new(config.pipeline_settings(), profile)?;
    let handle = pipeline.shutdown_handle();
    if let Err(err) = ctrlc::set_handler(move || handle.interrupt()) {
        pipeline_warn!("Could not install Ctrl-C handler: {}", err);
    }

    let summary = pipeline
        .run(tasks, collaborators, &config.output_paths())
        .context("pipeline cannot start")?;
    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    if summary.interrupted {
        println!("\nPipeline interrupted by user. Shutting down...");
    }
    let bar = "=".repeat(26);
    println!(
        "\n{}",
        style(format!("{bar} PIPELINE COMPLETE {bar}")).cyan().bold()
    );
    println!(
        "All scraped jobs saved to: {}",
        summary.outputs.unfiltered.display()
    );
    println!(
        "Full LLM analysis log saved to: {}",
        summary.outputs.audit.display()
    );
    println!(
        "LLM-filtered results saved to: {}",
        summary.outputs.filtered.display()
    );
    println!(
        "Jobs scraped: {} | Matches: {} | Scoring failures: {} | Search failures: {}",
        summary.jobs_scraped,
        summary.matches_found,
        summary.scoring_failures,
        summary.transport_failures
    );
    if summary.unanalyzed > 0 {
        println!(
            "{}",
            style(format!(
                "{} scraped jobs were not analyzed before shutdown.",
                summary.unanalyzed
            ))
            .yellow()
        );
    }
}
