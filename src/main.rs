// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use captionkit::app_config::{self, Config};
use captionkit::captions::{CaptionTransformer, formatters};
use captionkit::client::{VideoPlatformClient, YouTubeClient};
use captionkit::models::{CaptionSegment, CaptionsData};
use captionkit::server::McpServer;
use captionkit::service::CaptionService;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Output formats for offline conversion
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConvertFormat {
    Srt,
    Vtt,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tool server on stdio (default command)
    Serve(ServeArgs),

    /// Generate shell completions for captionkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Convert a captions JSON file to SRT or WebVTT
    Convert(ConvertArgs),
}

#[derive(Parser, Debug, Clone)]
struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "captionkit.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Captions JSON: a `download_captions` result or a bare segment array
    #[arg(value_name = "CAPTIONS_JSON")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "srt")]
    format: ConvertFormat,

    /// Merge segments separated by at most this many seconds
    #[arg(long)]
    merge_gap: Option<f64>,

    /// Drop segments shorter than this many seconds
    #[arg(long)]
    min_duration: Option<f64>,

    /// Shift every segment by this many seconds (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Keep only segments from this time (seconds)
    #[arg(long)]
    from: Option<f64>,

    /// Keep only segments up to this time (seconds)
    #[arg(long)]
    to: Option<f64>,
}

/// captionkit - video caption tools over JSON-RPC
///
/// Exposes video metadata, caption listing, caption download and caption
/// search as tools on a newline-delimited JSON-RPC 2.0 stdio channel.
#[derive(Parser, Debug)]
#[command(name = "captionkit")]
#[command(version)]
#[command(about = "Video caption tool server")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "captionkit serves video caption tools over a JSON-RPC 2.0 stdio channel.

EXAMPLES:
    captionkit                                  # Serve on stdio using captionkit.json
    captionkit serve -c conf.json -l debug      # Serve with a config file and debug logging
    captionkit convert captions.json -f vtt     # Convert downloaded captions to WebVTT
    captionkit convert captions.json --merge-gap 1.0 --from 60 --to 120
    captionkit completions bash > captionkit.bash

CONFIGURATION:
    Configuration is read from captionkit.json by default. A missing file means
    defaults. The environment overrides the file: YOUTUBE_API_KEY, CACHE_ENABLED,
    CACHE_DEFAULT_TTL, CACHE_MAX_KEYS.

LOGGING:
    Logs go to stderr; stdout carries protocol messages only.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

// @struct: Custom logger implementation, writes to stderr only
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "captionkit", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Serve(args)) => run_server(args).await,
        None => run_server(cli.serve).await,
    }
}

fn load_config(options: &ServeArgs) -> Result<Config> {
    if !options.config.exists() {
        debug!("Config file not found at '{}', using defaults", options.config.display());
    }

    let mut config = Config::load_or_default(&options.config)?;
    config
        .apply_overrides(|key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_server(options: ServeArgs) -> Result<()> {
    // Apply the command line level early so config loading is logged at it
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    if config.client.api_key.is_empty() {
        warn!("No API key configured (set YOUTUBE_API_KEY); metadata and search tools will fail");
    }

    let client: Arc<dyn VideoPlatformClient> = Arc::new(YouTubeClient::new(&config.client));
    let service = CaptionService::from_config(client, &config);
    let sweeper = service.cache().spawn_sweeper();
    let server = McpServer::new(service, config.default_language.clone());

    let outcome = tokio::select! {
        result = server.serve_stdio() => result,
        signal = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            signal.context("Failed to listen for shutdown signal")
        }
    };

    if let Some(sweeper) = sweeper {
        sweeper.stop();
    }

    let stats = server.service().cache_stats();
    debug!(
        "Cache: {} keys, {} hits, {} misses ({:.1}% hit rate)",
        stats.keys,
        stats.hits,
        stats.misses,
        stats.hit_rate() * 100.0
    );

    outcome
}

/// Read segments from a `download_captions` result or a bare segment array
fn read_segments(path: &Path) -> Result<Vec<CaptionSegment>> {
    let file = File::open(path).with_context(|| format!("Failed to open captions file: {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse captions file: {}", path.display()))?;

    if value.is_array() {
        return serde_json::from_value(value).context("Invalid caption segment array");
    }

    let data: CaptionsData = serde_json::from_value(value).context("Invalid captions data")?;
    Ok(data.segments)
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut segments = read_segments(&args.input)?;
    debug!("Loaded {} segments from {}", segments.len(), args.input.display());

    if let Some(min_duration) = args.min_duration {
        segments = CaptionTransformer::filter_segments(&segments, min_duration);
    }
    if let Some(max_gap) = args.merge_gap {
        segments = CaptionTransformer::merge_segments(&segments, max_gap);
    }
    if let Some(offset) = args.offset {
        segments = CaptionTransformer::adjust_timing(&segments, offset);
    }
    if args.from.is_some() || args.to.is_some() {
        let start = args.from.unwrap_or(0.0);
        let end = args.to.unwrap_or(f64::INFINITY);
        if end < start {
            return Err(anyhow!("--to ({}) must not be before --from ({})", end, start));
        }
        segments = CaptionTransformer::extract_time_range(&segments, start, end);
    }

    let report = CaptionTransformer::validate_captions(&segments);
    for issue in &report.issues {
        warn!("{}", issue);
    }

    let output = match args.format {
        ConvertFormat::Srt => formatters::format_to_srt(&segments),
        ConvertFormat::Vtt => formatters::format_to_vtt(&segments),
    };

    let mut stdout = std::io::stdout();
    stdout.write_all(output.as_bytes()).context("Failed to write output")?;
    stdout.flush().context("Failed to flush output")?;
    Ok(())
}
