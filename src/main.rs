// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use dialoguer::{theme::ColorfulTheme, Input};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::app_config::{Config, ScaleStrategy};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod media_probe;
mod recognizer;
mod renderer;
mod segmenter;
mod subtitle_builder;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a video into subtitled vertical clips (default command)
    #[command(alias = "process")]
    Process(ProcessArgs),

    /// Generate shell completions for vertisub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Input video file or directory to process (interactive prompt if omitted)
    #[arg(short, long, value_name = "INPUT_PATH")]
    input: Option<PathBuf>,

    /// Output directory for the final video and sidecar files
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Segment length in seconds
    #[arg(long)]
    segment_seconds: Option<u64>,

    /// Attach subtitles as a soft track instead of burning them in
    #[arg(long)]
    soft_subs: bool,

    /// Subtitle font size
    #[arg(long)]
    font_size: Option<u32>,

    /// Subtitle vertical pixel offset (0 = top of the 1920px frame)
    #[arg(long)]
    pos_y: Option<u32>,

    /// 9:16 reprojection strategy: pad or crop
    #[arg(long)]
    scale_strategy: Option<String>,

    /// Maximum segments processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Path to the recognizer model directory
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vertisub - Vertical clips with auto-generated subtitles
///
/// Cuts a video into fixed-length segments, runs speech recognition per
/// segment, and renders 9:16 vertical clips with subtitles burned in.
#[derive(Parser, Debug)]
#[command(name = "vertisub")]
#[command(version = "1.0.0")]
#[command(about = "Vertical video pipeline with speech-recognized subtitles")]
#[command(long_about = "vertisub cuts a video into fixed-length segments, transcribes each one
with an external Vosk recognizer, and renders 9:16 vertical clips with
styled subtitles, concatenated into one final video.

EXAMPLES:
    vertisub                                   # Interactive mode (prompts)
    vertisub -i video.mp4 -o ./out             # CLI mode
    vertisub -i video.mp4 -o ./out --soft-subs # Soft subtitle track, no burn-in
    vertisub -i /videos/ --segment-seconds 30  # Process a whole directory
    vertisub completions bash > vertisub.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    process: ProcessArgs,
}

// @struct: Custom logger implementation
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

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✗ ",
            Level::Warn => "! ",
            Level::Info => " ",
            Level::Debug => "· ",
            Level::Trace => "… ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let marker = Self::get_marker_for_level(record.level());

            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}{}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vertisub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Process(args)) => run_process(args).await,
        None => run_process(cli.process).await,
    }
}

async fn run_process(options: ProcessArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(segment_seconds) = options.segment_seconds {
        config.pipeline.segment_seconds = segment_seconds;
    }
    if options.soft_subs {
        config.render.burn_subs = false;
    }
    if let Some(font_size) = options.font_size {
        config.subtitle.font_size = font_size;
    }
    if let Some(pos_y) = options.pos_y {
        config.subtitle.pos_y = pos_y;
    }
    if let Some(strategy) = &options.scale_strategy {
        config.render.scale_strategy = ScaleStrategy::from_str(strategy)?;
    }
    if let Some(concurrency) = options.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(model_dir) = &options.model_dir {
        config.recognizer.model_dir = model_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding; missing
    // model directory and degenerate values are fatal before any processing
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Two execution modes: non-interactive when --input is given,
    // interactive prompts otherwise
    let interactive = options.input.is_none();
    let input_path = match options.input {
        Some(path) => path,
        None => prompt_input_path()?,
    };

    // Create controller
    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        let output_dir = match options.output {
            Some(dir) => dir,
            None if interactive => prompt_output_dir()?,
            // CLI mode without -o: place results next to the input
            None => default_output_dir(&input_path),
        };

        controller
            .run(input_path, output_dir, options.force_overwrite)
            .await
    } else if input_path.is_dir() {
        controller
            .run_folder(input_path, options.force_overwrite)
            .await
    } else {
        Err(anyhow!("Input path does not exist: {:?}", input_path))
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Prompt for the source video path
fn prompt_input_path() -> Result<PathBuf> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Input video file")
        .validate_with(|value: &String| -> Result<(), String> {
            let path = Path::new(value);
            if path.is_file() || path.is_dir() {
                Ok(())
            } else {
                Err(format!("Path does not exist: {}", value))
            }
        })
        .interact_text()
        .context("Input file not selected")?;

    Ok(PathBuf::from(path))
}

/// Prompt for the output directory
fn prompt_output_dir() -> Result<PathBuf> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Output directory")
        .default("out".to_string())
        .interact_text()
        .context("Output directory not selected")?;

    Ok(PathBuf::from(path))
}

/// Default output directory next to the input file
fn default_output_dir(input_file: &Path) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input_file
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{}_vertisub", stem))
}
