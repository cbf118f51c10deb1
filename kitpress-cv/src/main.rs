//! kitpress-cv - batch audio converter CLI
//!
//! Converts selected audio files to mono 48 kHz s16 WAV beside their
//! sources, or renumbers up to 10 of them into a kit folder. Conflicting
//! output names are resolved interactively on the terminal.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use kitpress_common::config;
use kitpress_common::events::{ConvertEvent, EventBus};
use kitpress_cv::backend::DesktopBackend;
use kitpress_cv::conflict::{ConflictPrompt, StaticPrompt};
use kitpress_cv::kit::build_kit_plan;
use kitpress_cv::types::{is_audio_extension, ConflictDecision, ConversionOptions, FileItem};
use kitpress_cv::{BatchDriver, ConvertError, Session};

/// Command-line arguments for kitpress-cv
#[derive(Parser, Debug)]
#[command(name = "kitpress-cv")]
#[command(about = "Batch audio to sampler-ready WAV converter")]
#[command(version)]
struct Args {
    /// Audio files to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Apply loudness normalization (loudnorm I=-14:LRA=11:TP=-1.0)
    #[arg(long)]
    normalize: bool,

    /// Export the selection as a renumbered kit instead of plain conversion
    #[arg(long)]
    kit: bool,

    /// Directory the kit folder is created under (default: beside the first input)
    #[arg(long)]
    kit_base: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<String>,

    /// Non-interactive conflict policy instead of prompting
    #[arg(long, value_enum)]
    on_conflict: Option<ConflictPolicy>,

    /// Tracing filter directive (e.g. "info", "kitpress_cv=debug")
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ConflictPolicy {
    /// Overwrite each conflicting output
    Overwrite,
    /// Keep existing files, disambiguate new outputs
    Skip,
    /// Abort the batch on the first conflict
    Cancel,
}

impl ConflictPolicy {
    fn decision(self) -> ConflictDecision {
        match self {
            ConflictPolicy::Overwrite => ConflictDecision::OverwriteAll,
            ConflictPolicy::Skip => ConflictDecision::Skip,
            ConflictPolicy::Cancel => ConflictDecision::Cancel,
        }
    }
}

/// Prompt surface reading one decision per conflict from the terminal
struct TerminalPrompt;

#[async_trait::async_trait]
impl ConflictPrompt for TerminalPrompt {
    async fn ask(&self, file_name: &str) -> kitpress_cv::ConvertResult<ConflictDecision> {
        let name = file_name.to_string();
        let decision = tokio::task::spawn_blocking(move || loop {
            eprintln!(
                "{} already exists. [o]verwrite, overwrite [a]ll, [s]kip, [c]ancel?",
                name
            );
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return ConflictDecision::Cancel;
            }
            match line.trim().to_lowercase().as_str() {
                "o" | "overwrite" => return ConflictDecision::OverwriteCurrent,
                "a" | "all" => return ConflictDecision::OverwriteAll,
                "s" | "skip" => return ConflictDecision::Skip,
                "c" | "cancel" | "" => return ConflictDecision::Cancel,
                _ => continue,
            }
        })
        .await
        .map_err(|e| {
            ConvertError::Common(kitpress_common::Error::Internal(format!(
                "prompt task failed: {}",
                e
            )))
        })?;
        Ok(decision)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing before anything else
    let filter = config::resolve_log_filter(args.log.as_deref(), &config);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    info!("Starting kitpress-cv v{}", env!("CARGO_PKG_VERSION"));

    // Build the selection, rejecting non-audio inputs and duplicates
    let mut session = Session::new();
    for input in &args.inputs {
        let accepted = input
            .extension()
            .map(|ext| is_audio_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !accepted {
            warn!(file = %input.display(), "Skipping non-audio input");
            continue;
        }
        if !session.selection.insert(FileItem::from_path(input)) {
            warn!(file = %input.display(), "Already selected, skipping duplicate");
        }
    }
    if session.selection.is_empty() {
        bail!("No audio input files selected");
    }
    info!("{} file(s) selected", session.selection.len());

    // Locate the engine once per session
    let candidates = config::resolve_engine_candidates(args.ffmpeg.as_deref(), &config);
    let engine = match session.ensure_engine(&candidates).await {
        Ok(engine) => engine.clone(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let kit_base = args.kit_base.clone().or_else(|| {
        args.inputs
            .first()
            .and_then(|p| p.parent().map(PathBuf::from))
    });
    let mut backend = DesktopBackend::new(engine);
    if let Some(base) = kit_base {
        backend = backend.with_kit_base(base);
    }

    // Cancellation: Ctrl-C is observed at the next item boundary
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Cancellation requested, stopping at the next file");
                cancel.cancel();
            }
        }
    });

    // Progress rendering from the event stream
    let events = EventBus::new(100);
    tokio::spawn({
        let mut rx = events.subscribe();
        async move {
            while let Ok(event) = rx.recv().await {
                if let ConvertEvent::ItemCompleted { index, total, .. } = event {
                    info!("Processing {}/{}", index + 1, total);
                }
            }
        }
    });

    let options = ConversionOptions::new(args.normalize);
    let mut driver = BatchDriver::new(backend, events).with_cancellation(cancel);

    let outcome = if args.kit {
        let plan = build_kit_plan(session.selection.items());
        if plan.blocked {
            if plan.warning.is_empty() {
                info!("Nothing selected.");
                return Ok(());
            }
            bail!("{}", plan.warning);
        }
        driver.run_kit(&plan, &options).await
    } else {
        let prompt: Box<dyn ConflictPrompt> = match args.on_conflict {
            Some(policy) => Box::new(StaticPrompt(policy.decision())),
            None => Box::new(TerminalPrompt),
        };
        driver
            .run(session.selection.items(), prompt.as_ref(), &options)
            .await
    };

    match outcome {
        Ok(result) => {
            info!(
                "All conversions finished. {} file(s) converted.",
                result.converted
            );
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            info!("Conversion cancelled.");
            Ok(())
        }
        Err(e) => {
            error!("Conversion stopped: {}", e);
            std::process::exit(1);
        }
    }
}
