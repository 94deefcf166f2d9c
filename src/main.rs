// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::media::TimeWindow;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod media;
mod providers;
mod subtitle_processor;
mod translation;

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
    /// Run the full pipeline: download/stage, transcribe, translate (default command)
    Run(RunArgs),

    /// Translate an existing SRT file
    Translate(TranslateArgs),

    /// Burn an SRT file into a video
    Mux(MuxArgs),

    /// Generate shell completions for vidscribe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Video file path or YouTube URL
    #[arg(value_name = "INPUT")]
    input: String,

    /// Working directory for staged files and outputs
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Burn the translated subtitles into the video when done
    #[arg(short, long)]
    burn: bool,

    /// Start timestamp (HH:MM:SS) for burn-in cutting
    #[arg(long, requires = "burn")]
    start: Option<String>,

    /// End timestamp (HH:MM:SS) for burn-in cutting
    #[arg(long, requires = "burn")]
    end: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// SRT file to translate
    #[arg(value_name = "SRT_PATH")]
    srt_path: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct MuxArgs {
    /// Video file to subtitle
    #[arg(value_name = "VIDEO_PATH")]
    video_path: PathBuf,

    /// SRT file to burn in
    #[arg(value_name = "SRT_PATH")]
    srt_path: PathBuf,

    /// Start timestamp (HH:MM:SS)
    #[arg(long)]
    start: Option<String>,

    /// End timestamp (HH:MM:SS)
    #[arg(long)]
    end: Option<String>,

    /// Output file path (defaults to <video>_with_subtitles.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Options shared by the pipeline and translate commands
#[derive(Parser, Debug)]
struct CommonArgs {
    /// Source language (e.g. 'English')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (e.g. 'Polish')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Also write a bilingual subtitle file
    #[arg(long)]
    bilingual: bool,

    /// OpenAI API key(s), semicolon-separated
    #[arg(long, env = "VIDSCRIBE_OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// DeepSeek API key(s), semicolon-separated
    #[arg(long, env = "VIDSCRIBE_DEEPSEEK_API_KEY", hide_env_values = true)]
    deepseek_api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vidscribe - transcribe and translate video subtitles
///
/// Downloads or stages a video, transcribes its audio with Whisper, and
/// translates the transcript in batches through OpenAI or DeepSeek.
#[derive(Parser, Debug)]
#[command(name = "vidscribe")]
#[command(version = "0.1.0")]
#[command(about = "Video transcription and subtitle translation tool")]
#[command(long_about = "vidscribe turns spoken video into translated subtitles.

EXAMPLES:
    vidscribe run talk.mp4                          # Full pipeline with default config
    vidscribe run https://www.youtube.com/watch?v=… # Download, transcribe, translate
    vidscribe run -b --start 00:01:00 talk.mp4      # Burn subtitles from a start point
    vidscribe translate talk.srt -t French          # Translate an existing SRT
    vidscribe translate --bilingual talk.srt        # Keep source and translation together
    vidscribe mux talk.mp4 talk-French.srt          # Burn an SRT into the video
    vidscribe completions bash > vidscribe.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

BACKENDS:
    openai      - preferred when an OpenAI key is configured
    deepseek    - used when only a DeepSeek key is configured
    passthrough - no key configured; subtitles pass through untranslated")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
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

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vidscribe", &mut std::io::stdout());
            Ok(())
        }
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Translate(args) => run_translate(args).await,
        Commands::Mux(args) => run_mux(args).await,
    }
}

async fn run_pipeline(args: RunArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let controller = Controller::with_config(config)?;

    let window = TimeWindow {
        start: args.start,
        end: args.end,
    };
    controller
        .run(&args.input, &args.output_dir, &window, args.burn)
        .await
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    if !args.srt_path.exists() {
        return Err(anyhow!("Input file does not exist: {:?}", args.srt_path));
    }

    let config = load_config(&args.common)?;
    let controller = Controller::with_config(config)?;
    controller.translate_srt(&args.srt_path).await?;
    Ok(())
}

async fn run_mux(args: MuxArgs) -> Result<()> {
    if let Some(level) = &args.log_level {
        apply_log_level(&level.clone().into());
    }
    if !args.video_path.exists() {
        return Err(anyhow!("Video file does not exist: {:?}", args.video_path));
    }
    if !args.srt_path.exists() {
        return Err(anyhow!("Subtitle file does not exist: {:?}", args.srt_path));
    }

    let window = TimeWindow {
        start: args.start,
        end: args.end,
    };
    let output = media::burn_subtitles(&args.video_path, &args.srt_path, &window, args.output).await?;
    log::info!("Success: {:?}", output);
    Ok(())
}

/// Load the configuration file, creating a default one when missing, and
/// apply command line overrides on top.
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &options.log_level {
        apply_log_level(&level.clone().into());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        serde_json::from_str::<Config>(&content)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save_to_file(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(key) = &options.openai_api_key {
        config.translation.openai_api_key = key.clone();
    }
    if let Some(key) = &options.deepseek_api_key {
        config.translation.deepseek_api_key = key.clone();
    }
    if options.bilingual {
        config.translation.bilingual = true;
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    } else {
        apply_log_level(&config.log_level);
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Update the global logger threshold without reinitializing the logger
fn apply_log_level(level: &app_config::LogLevel) {
    let filter = match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    };
    log::set_max_level(filter);
}
