use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use moodtrack_core::detection::infrastructure::min_size_detector::MinSizeFaceDetector;
use moodtrack_core::pipeline::frame_orchestrator::FrameOrchestrator;
use moodtrack_core::pipeline::infrastructure::sequential_session_executor::SequentialSessionExecutor;
use moodtrack_core::pipeline::infrastructure::threaded_session_executor::ThreadedSessionExecutor;
use moodtrack_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodtrack_core::pipeline::run_session_use_case::RunSessionUseCase;
use moodtrack_core::pipeline::session_executor::SessionExecutor;
use moodtrack_core::shared::config::{EmotionPipelineConfig, MatcherKind};
use moodtrack_core::video::domain::report_sink::ReportSink;
use moodtrack_core::video::infrastructure::json_lines_sink::JsonLinesSink;
use moodtrack_core::video::infrastructure::session_trace::{SessionTrace, TraceParts};

/// Per-face emotion tracking over a recorded detection/classification trace.
#[derive(Parser)]
#[command(name = "moodtrack")]
struct Cli {
    /// Session trace (JSON) with per-frame detections and classifier outcomes.
    trace: PathBuf,

    /// Write JSON-lines frame reports here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Config file (default: user config dir, if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum overlap for a detection to continue a track (0.0-1.0).
    #[arg(long)]
    iou_threshold: Option<f64>,

    /// Consecutive missed frames before a track is dropped.
    #[arg(long)]
    max_missing_frames: Option<usize>,

    /// Emotion smoothing window size.
    #[arg(long)]
    window: Option<usize>,

    /// Classify every Nth frame when on target.
    #[arg(long)]
    base_skip: Option<usize>,

    /// Upper bound on the adaptive classification cadence.
    #[arg(long)]
    max_skip: Option<usize>,

    /// Target processing rate in frames per second.
    #[arg(long)]
    target_fps: Option<f64>,

    /// Frames between cadence adjustments.
    #[arg(long)]
    check_interval: Option<usize>,

    /// Drop detections smaller than this many pixels on either side.
    #[arg(long)]
    min_face_size: Option<i32>,

    /// Labels removed from classifier output (comma-separated; "" for none).
    #[arg(long, value_delimiter = ',')]
    exclude_labels: Option<Vec<String>>,

    /// Track association strategy: greedy or hungarian.
    #[arg(long)]
    matcher: Option<MatcherKind>,

    /// Run on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Log progress every N frames.
    #[arg(long, default_value = "100")]
    progress_every: usize,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    log::debug!("Effective config: {config:?}");

    let trace = SessionTrace::load(&cli.trace)?;
    log::info!(
        "Loaded {}: {} frames at {}x{}",
        cli.trace.display(),
        trace.frame_count(),
        trace.width,
        trace.height
    );
    let TraceParts {
        source,
        detector,
        classifier,
    } = trace.into_parts();

    let detector = MinSizeFaceDetector::new(Box::new(detector), config.min_face_size)?;
    let orchestrator =
        FrameOrchestrator::from_config(&config, Box::new(detector), Box::new(classifier))?
            .with_logger(Box::new(StdoutPipelineLogger::new(cli.progress_every)));

    let sink: Box<dyn ReportSink> = match &cli.output {
        Some(path) => Box::new(JsonLinesSink::create(path)?),
        None => Box::new(JsonLinesSink::new(BufWriter::new(io::stdout()))),
    };
    let executor: Box<dyn SessionExecutor> = if cli.sequential {
        Box::new(SequentialSessionExecutor::new())
    } else {
        Box::new(ThreadedSessionExecutor::new())
    };

    let mut use_case =
        RunSessionUseCase::new(Box::new(source), sink, orchestrator, executor, None, None);
    let processed = use_case.execute()?;

    let orchestrator = use_case.orchestrator();
    log::info!(
        "Processed {processed} frames: {} live tracks, skip cadence {}, {:.1} fps",
        orchestrator.tracker().len(),
        orchestrator.skip_cadence(),
        orchestrator.current_fps()
    );
    if let Some(path) = &cli.output {
        log::info!("Output written to {}", path.display());
    }
    Ok(())
}

/// Loads the config file (explicit or default location) and applies flag overrides.
fn build_config(cli: &Cli) -> Result<EmotionPipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EmotionPipelineConfig::load(path)?,
        None => EmotionPipelineConfig::load_or_default()?,
    };
    apply_overrides(cli, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut EmotionPipelineConfig) {
    if let Some(v) = cli.iou_threshold {
        config.tracking_iou_threshold = v;
    }
    if let Some(v) = cli.max_missing_frames {
        config.max_missing_frames = v;
    }
    if let Some(v) = cli.window {
        config.smoothing_window = v;
    }
    if let Some(v) = cli.base_skip {
        config.base_skip = v;
    }
    if let Some(v) = cli.max_skip {
        config.max_skip = v;
    }
    if let Some(v) = cli.target_fps {
        config.target_fps = v;
    }
    if let Some(v) = cli.check_interval {
        config.performance_check_interval = v;
    }
    if let Some(v) = cli.min_face_size {
        config.min_face_size = v;
    }
    if let Some(labels) = &cli.exclude_labels {
        config.excluded_labels = labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(matcher) = cli.matcher {
        config.matcher = matcher;
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.trace.exists() {
        return Err(format!("Trace file not found: {}", cli.trace.display()).into());
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    if cli.progress_every == 0 {
        return Err("--progress-every must be at least 1".into());
    }
    Ok(())
}
