//! Command-line entry point.
//!
//! # `generate` sequence
//!
//! 1. Initialise logging (`--verbose` lowers the default filter to `debug`).
//! 2. Load [`AppConfig`] (`--config`, `<home>/settings.toml` with `--home`,
//!    or the platform settings file).
//! 3. Build the orchestrator with a [`SimulatedWorker`].
//! 4. Fill the script from `--script`, `--script-file` or stdin dictation.
//! 5. Apply option overrides, start the job and follow its snapshots.
//! 6. Ctrl-C cancels the job; the final state decides the exit status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::sync::broadcast::error::RecvError;

use video_studio::{
    app::{status_line, Studio},
    capture::ScriptedCapture,
    config::{AppConfig, AppPaths},
    entitlement::{limits_for, OptionCategory, Tier},
    pipeline::{GenerationOrchestrator, Job, JobStatus, SimulatedWorker, StageId},
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "video-studio")]
#[command(version, about = "Turn a script into an avatar video")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep settings and exports together under this directory
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a script
    Generate(GenerateArgs),
    /// Show what a plan allows
    Limits {
        #[arg(long)]
        tier: Option<Tier>,
    },
    /// Write a settings.toml with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Script text
    #[arg(long, conflicts_with_all = ["script_file", "dictate"])]
    script: Option<String>,

    /// Read the script from a file
    #[arg(long, conflicts_with = "dictate")]
    script_file: Option<PathBuf>,

    /// Dictate the script on stdin, one finalized fragment per line
    #[arg(long)]
    dictate: bool,

    #[arg(long)]
    avatar: Option<String>,

    #[arg(long)]
    voice: Option<String>,

    #[arg(long)]
    music: Option<String>,

    #[arg(long)]
    format: Option<String>,

    /// Video length in seconds (clamped to the plan's bounds)
    #[arg(long)]
    duration: Option<u32>,

    /// Plan to generate on (overrides the configured tier)
    #[arg(long)]
    tier: Option<Tier>,

    /// Print every job snapshot as a JSON line
    #[arg(long)]
    json: bool,

    /// Make the given stage fail halfway (e.g. `music-mix`)
    #[arg(long, value_parser = parse_stage)]
    fail_at: Option<StageId>,

    /// Write the final job snapshot to the exports directory
    #[arg(long)]
    export: bool,
}

fn parse_stage(s: &str) -> Result<StageId, String> {
    StageId::parse(s).ok_or_else(|| format!("unknown stage `{s}`"))
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let paths = match &cli.home {
        Some(home) => AppPaths::rooted_at(home),
        None => AppPaths::new(),
    };
    let settings_file = cli.config.unwrap_or_else(|| paths.settings_file.clone());

    match cli.command {
        Commands::InitConfig { force } => init_config(&settings_file, force),
        Commands::Limits { tier } => {
            let config = load_config(&settings_file);
            print_limits(tier.unwrap_or(config.tier));
            Ok(())
        }
        Commands::Generate(args) => generate(load_config(&settings_file), &paths, args).await,
    }
}

fn load_config(path: &Path) -> AppConfig {
    AppConfig::load_from(path).unwrap_or_else(|e| {
        log::warn!("Failed to load config from {} ({e}); using defaults", path.display());
        AppConfig::default()
    })
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save_to(path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn print_limits(tier: Tier) {
    let limits = limits_for(tier);
    println!("plan:        {tier}");
    println!("script:      up to {} characters", limits.max_script_chars);
    println!(
        "duration:    {}–{} s (step {} s)",
        limits.min_duration_seconds, limits.max_duration_seconds, limits.duration_step_seconds
    );
    println!("resolution:  {}", limits.max_resolution.label());
    println!("watermark:   {}", if limits.watermarked { "yes" } else { "no" });
    match limits.monthly_video_quota {
        Some(quota) => println!("quota:       {quota} videos / month"),
        None => println!("quota:       unlimited"),
    }
    for category in OptionCategory::ALL {
        println!("{:<12} {}", format!("{category}:"), limits.allowed(category).join(", "));
    }
}

async fn generate(mut config: AppConfig, paths: &AppPaths, args: GenerateArgs) -> Result<()> {
    if let Some(tier) = args.tier {
        config.tier = tier;
    }

    let mut worker = SimulatedWorker::new(config.pipeline.tick_interval());
    if let Some(stage) = args.fail_at {
        worker = worker.failing_at(stage);
    }
    let orchestrator = GenerationOrchestrator::new(&config, Arc::new(worker));
    let mut studio = Studio::new(&config, orchestrator.clone());

    // --- Script ------------------------------------------------------------
    if args.dictate {
        log::info!("Dictation: reading stdin until EOF");
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("reading dictation from stdin")?;
        studio.dictate(ScriptedCapture::from_lines(&input)).await?;
    } else if let Some(path) = &args.script_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script from {}", path.display()))?;
        studio.script_mut().set_text(text);
    } else if let Some(script) = args.script {
        studio.script_mut().set_text(script);
    } else {
        bail!("no script given (use --script, --script-file or --dictate)");
    }

    // --- Options -----------------------------------------------------------
    let overrides = [
        (OptionCategory::Avatar, args.avatar),
        (OptionCategory::Voice, args.voice),
        (OptionCategory::Music, args.music),
        (OptionCategory::Format, args.format),
    ];
    for (category, value) in overrides {
        if let Some(value) = value {
            studio.select(category, &value)?;
        }
    }
    if let Some(requested) = args.duration {
        let actual = studio.set_duration(requested);
        if actual != requested {
            log::warn!(
                "Duration {requested}s is outside the {} plan; using {actual}s",
                studio.tier()
            );
        }
    }

    // --- Run ---------------------------------------------------------------
    let mut events = orchestrator.subscribe();
    let handle = studio.generate()?;
    let id = handle.id();
    let mut last_stage: Option<StageId> = None;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(job) if job.id == id => {
                    report(&job, args.json, &mut last_stage)?;
                    if job.overall_status.is_terminal() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    log::warn!("Missed {missed} progress updates");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted; cancelling job {id}");
                if let Err(e) = orchestrator.cancel(id) {
                    log::warn!("Cancel failed: {e}");
                }
            }
        }
    }
    handle.finished().await;

    let job = orchestrator.current_state(id)?;
    if args.export {
        export(paths, &job)?;
    }

    match job.overall_status {
        JobStatus::Succeeded => {
            let artifact = orchestrator.artifact_for(id)?;
            if !args.json {
                println!("video:       {}", artifact.media_ref);
                println!("download as: {}", artifact.file_name);
                println!("share:       {}", artifact.share_text());
                println!(
                    "output:      {} · {}s · {}{}",
                    artifact.format,
                    artifact.duration_seconds,
                    artifact.resolution.label(),
                    if artifact.watermarked { " · watermarked" } else { "" }
                );
            }
            if let Some(remaining) = orchestrator.quota_remaining(job.tier) {
                log::info!("{remaining} {} videos left this month", job.tier);
            }
            Ok(())
        }
        JobStatus::Failed => match job.failure {
            Some(failure) => Err(anyhow!(failure)),
            None => bail!("job {id} failed"),
        },
        status => bail!("job {id} ended as {status}"),
    }
}

/// Print a snapshot: every one as JSON, or a line per stage change.
fn report(job: &Job, json: bool, last_stage: &mut Option<StageId>) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(job)?);
        return Ok(());
    }

    let stage = job.current_stage().map(|run| run.stage_id);
    if (stage.is_some() && stage != *last_stage) || job.overall_status.is_terminal() {
        println!("{}", status_line(job));
    } else {
        log::debug!("{}", status_line(job));
    }
    *last_stage = stage;
    Ok(())
}

fn export(paths: &AppPaths, job: &Job) -> Result<()> {
    std::fs::create_dir_all(&paths.exports_dir)
        .with_context(|| format!("creating {}", paths.exports_dir.display()))?;
    let path = paths.export_file(job.id);
    std::fs::write(&path, serde_json::to_string_pretty(job)?)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported job to {}", path.display());
    Ok(())
}
