//! Command-line interface for scenecut.
//!
//! Each stage command is one run in the run log. `runs` and `status` read
//! the log back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::core::{Orchestrator, RunLog};
use crate::domain::RunState;

/// scenecut - TV script segmentation and scene selection
#[derive(Parser, Debug)]
#[command(name = "scenecut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to .scenecut/config.yaml in this or a parent directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split the script into seasons, episodes and scenes
    Segment,

    /// Write per-scene line and speaker counts for the target season
    Overview,

    /// Copy scenes matching the selection criterion
    Select,

    /// Count scenes per character
    Characters {
        /// Season to count (defaults to the target season)
        #[arg(short, long)]
        season: Option<u8>,
    },

    /// Write a text chunk that covers every character
    Sample {
        /// Season to sample (defaults to the target season)
        #[arg(short, long)]
        season: Option<u8>,

        /// Word budget of the chunk
        #[arg(long)]
        max_words: Option<usize>,

        /// Seed for a reproducible scene order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Summarize the selected scenes
    Summarize,

    /// Clean externally generated scenes
    CleanGenerated {
        /// Generated scenes CSV (defaults to the configured path)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Build the generated vs. human scene comparison
    Compare,

    /// Segment, analyze and select in one go
    Run {
        /// Also summarize the selected scenes
        #[arg(long)]
        summarize: bool,
    },

    /// List recent runs
    Runs {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Check the status of a run
    Status {
        /// Run ID (UUID)
        run_id: String,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Segment => segment(config).await,
            Commands::Overview => overview(config).await,
            Commands::Select => select(config).await,
            Commands::Characters { season } => characters(config, season).await,
            Commands::Sample {
                season,
                max_words,
                seed,
            } => sample(config, season, max_words, seed).await,
            Commands::Summarize => summarize(config).await,
            Commands::CleanGenerated { input } => clean_generated(config, input).await,
            Commands::Compare => compare(config).await,
            Commands::Run { summarize } => run_all(config, summarize).await,
            Commands::Runs { limit } => list_runs(&config, limit).await,
            Commands::Status { run_id } => show_status(&config, &run_id).await,
            Commands::Config => show_config(&config),
        }
    }
}

async fn segment(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::start(config, "segment").await?;
    let run_id = orchestrator.run_id();
    let result = orchestrator.segment_script().await;
    let report = orchestrator.finish(result).await?;

    for season in &report.seasons {
        println!(
            "Season {}: {} episodes, {} scenes",
            season.season, season.episodes, season.scenes
        );
    }
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn overview(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::start(config, "overview").await?;
    let run_id = orchestrator.run_id();
    let path = orchestrator.layout().scene_summary_csv();
    let result = orchestrator.write_overview().await;
    let stats = orchestrator.finish(result).await?;

    println!("Analyzed {} scenes -> {}", stats.len(), path.display());
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn select(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::start(config, "select").await?;
    let run_id = orchestrator.run_id();
    let target = orchestrator.layout().selected_dir();
    let result = orchestrator.select_scenes().await;
    let report = orchestrator.finish(result).await?;

    println!("Selected {} scenes matching criteria", report.selected.len());
    if !report.missing.is_empty() {
        println!("Missing scene files: {}", report.missing.join(", "));
    }
    println!("Copied {} files to {}", report.files_in_target, target.display());
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn characters(config: Config, season: Option<u8>) -> Result<()> {
    let season = season.unwrap_or(config.target_season);
    let orchestrator = Orchestrator::start(config, "characters").await?;
    let run_id = orchestrator.run_id();
    let result = orchestrator.count_characters(season).await;
    let report = orchestrator.finish(result).await?;

    println!("Season {}: {} scenes", season, report.total_scenes);
    println!("{:<20} {:>8} {:>8}", "CHARACTER", "SCENES", "%");
    println!("{}", "-".repeat(38));
    for entry in &report.entries {
        println!("{:<20} {:>8} {:>7.2}%", entry.name, entry.scenes, entry.percentage);
    }
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn sample(
    mut config: Config,
    season: Option<u8>,
    max_words: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let season = season.unwrap_or(config.target_season);
    if let Some(max_words) = max_words {
        config.sampling.max_words = max_words;
    }
    if seed.is_some() {
        config.sampling.seed = seed;
    }

    let orchestrator = Orchestrator::start(config, "sample").await?;
    let run_id = orchestrator.run_id();
    let result = orchestrator.write_chunk(season).await;
    let (chunk, path) = orchestrator.finish(result).await?;

    println!(
        "Wrote {} scenes ({} words) -> {}",
        chunk.scenes,
        chunk.words,
        path.display()
    );
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn summarize(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::start(config, "summarize").await?;
    let run_id = orchestrator.run_id();
    let path = orchestrator.layout().summaries_csv();
    let result = orchestrator.summarize_selected().await;
    let rows = orchestrator.finish(result).await?;

    println!("Summarized {} scenes -> {}", rows.len(), path.display());
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn clean_generated(mut config: Config, input: Option<PathBuf>) -> Result<()> {
    if let Some(input) = input {
        config.generated_scenes = input;
    }

    let orchestrator = Orchestrator::start(config, "clean-generated").await?;
    let run_id = orchestrator.run_id();
    let path = orchestrator.layout().generated_overview_csv();
    let result = orchestrator.clean_generated().await;
    let report = orchestrator.finish(result).await?;

    println!(
        "Processed {} of {} generated scenes ({:?} pairing) -> {}",
        report.written,
        report.rows,
        report.mode,
        path.display()
    );
    if report.warnings > 0 {
        println!("{} warnings, see the run log", report.warnings);
    }
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn compare(config: Config) -> Result<()> {
    let orchestrator = Orchestrator::start(config, "compare").await?;
    let run_id = orchestrator.run_id();
    let path = orchestrator.layout().comparison_csv();
    let result = orchestrator.build_comparison().await;
    let report = orchestrator.finish(result).await?;

    println!("Wrote {} rows -> {}", report.rows, path.display());
    println!("Missing human scenes: {}", report.missing_human);
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

async fn run_all(config: Config, summarize: bool) -> Result<()> {
    let command = if summarize { "run --summarize" } else { "run" };
    let orchestrator = Orchestrator::start(config, command).await?;
    let run_id = orchestrator.run_id();
    let result = orchestrator.run_pipeline(summarize).await;
    let report = orchestrator.finish(result).await?;

    for season in &report.segment.seasons {
        println!(
            "Season {}: {} episodes, {} scenes",
            season.season, season.episodes, season.scenes
        );
    }
    println!("Analyzed {} scenes", report.scenes_analyzed);
    println!(
        "Selected {} scenes, copied {}",
        report.selection.selected.len(),
        report.selection.copied.len()
    );
    if let Some(count) = report.summaries {
        println!("Summarized {} scenes", count);
    }
    eprintln!("\n[Run {} completed]", run_id);
    Ok(())
}

/// List recent runs
async fn list_runs(config: &Config, limit: usize) -> Result<()> {
    let runs = RunLog::recent_runs(&config.layout().runs_dir(), limit).await?;

    if runs.is_empty() {
        println!("No runs found");
        return Ok(());
    }

    println!("{:<38} {:<18} {:<10} {:<20}", "RUN ID", "COMMAND", "STATE", "STARTED");
    println!("{}", "-".repeat(88));

    for run in runs {
        let state_str = match &run.state {
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed { .. } => "failed",
        };
        println!(
            "{:<38} {:<18} {:<10} {:<20}",
            run.id,
            run.command,
            state_str,
            run.started_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

/// Show the status of a run
async fn show_status(config: &Config, run_id_str: &str) -> Result<()> {
    let run_id = Uuid::parse_str(run_id_str)
        .with_context(|| format!("Invalid run ID: {}", run_id_str))?;

    let run = RunLog::load_run(&config.layout().runs_dir(), run_id).await?;

    println!("Run ID: {}", run.id);
    println!("Command: {}", run.command);
    match &run.state {
        RunState::Failed { error } => println!("State: failed ({})", error),
        state => println!("State: {:?}", state),
    }
    println!("Started: {}", run.started_at);
    if let Some(completed) = run.completed_at {
        println!("Completed: {}", completed);
    }

    println!("\nStages:");
    for (stage, status) in &run.stages {
        println!("  {}: {:?}", stage, status);
    }

    if !run.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &run.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(config: &Config) -> Result<()> {
    let layout = config.layout();

    println!("scenecut configuration");
    println!();
    println!(
        "Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Script:            {}", config.script.display());
    println!("  Output:            {}", config.output.display());
    println!("  Generated scenes:  {}", config.generated_scenes.display());
    println!("  Runs:              {}", layout.runs_dir().display());
    println!();
    println!("Markers:");
    println!("  Season:   {}", config.markers.season);
    println!("  Episode:  {}", config.markers.episode);
    println!("  Scene:    {}", config.markers.scene);
    println!("  Boundary: {}", config.markers.scene_boundary);
    println!();
    println!("Target season: {}", config.target_season);
    println!(
        "Selection: {}-{} lines, at least {} speakers",
        config.selection.min_lines, config.selection.max_lines, config.selection.min_speakers
    );
    println!("Characters: {}", config.characters.join(", "));
    println!();
    println!(
        "Summarizer: {} {}",
        config.summarizer.program,
        config.summarizer.args.join(" ")
    );
    println!();
    println!("Limits:");
    println!("  Max input size:     {} bytes", config.limits.max_input_bytes);
    println!("  Summary word limit: {}", config.limits.summary_max_words);
    println!("  Summarize timeout:  {}s", config.limits.summarize_timeout_seconds);
    println!();
    println!(
        "Sampling: {} words, seed {}",
        config.sampling.max_words,
        config
            .sampling
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(random)".to_string())
    );

    Ok(())
}
