//! Focus CLI - Command-line interface for Focus Flux
//!
//! Commands:
//! - replay: Replay recorded detector output through a session and print the report
//! - config: Print the effective configuration

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use focus_flux::{
    FocusConfig, FocusError, FocusSession, RawFrame, TrackingQualityMeter, FLUX_VERSION,
};

/// Focus - attention scoring from head pose, gaze and emotion signals
#[derive(Parser)]
#[command(name = "focus")]
#[command(version = FLUX_VERSION)]
#[command(about = "Score attention sessions from recorded detector output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay newline-delimited raw frames through a session
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Tracking quality override; derived from the replayed frames when omitted
        #[arg(long)]
        tracking_quality: Option<f64>,

        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also save the report into the configured reports directory
        #[arg(long)]
        save: bool,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "focus_flux=info".parse() {
        filter = filter.add_directive(directive);
    }
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FocusCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            tracking_quality,
            config,
            save,
            pretty,
        } => cmd_replay(
            &input,
            &output,
            tracking_quality,
            config.as_deref(),
            save,
            pretty,
        ),
        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<FocusConfig, FocusCliError> {
    match path {
        Some(path) => Ok(FocusConfig::load(path)?),
        None => Ok(FocusConfig::default()),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    tracking_quality: Option<f64>,
    config: Option<&Path>,
    save: bool,
    pretty: bool,
) -> Result<(), FocusCliError> {
    let config = load_config(config)?;
    let mut session = FocusSession::with_config(config)?;
    let mut meter = TrackingQualityMeter::new();

    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading frames from an interactive terminal; end input with Ctrl-D");
        }
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };

    session.start_session();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let raw: RawFrame = serde_json::from_str(trimmed).map_err(|e| {
            FocusCliError::ParseError(format!("Failed to parse frame on line {}: {}", index + 1, e))
        })?;
        let observation = session.record_raw_frame(&raw)?;
        meter.observe(observation.valid);
    }

    if meter.observed() == 0 {
        return Err(FocusCliError::NoFrames);
    }

    let quality = tracking_quality.unwrap_or_else(|| meter.quality());
    session.set_tracking_quality(quality);
    session.end_session()?;

    let report = session.generate_report()?;
    info!(
        frames = meter.observed(),
        valid = meter.valid(),
        focus_percentage = report.focus_analysis.focus_percentage,
        "replay complete"
    );

    if save {
        let path = session.try_save_report(None)?;
        info!(path = %path.display(), "report saved");
    }

    let mut output_data = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    output_data.push('\n');

    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(output_data.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_config(config: Option<&Path>) -> Result<(), FocusCliError> {
    let config = load_config(config)?;
    println!("{}", config.to_json()?);
    Ok(())
}

#[derive(Debug)]
enum FocusCliError {
    Io(io::Error),
    Focus(FocusError),
    Json(serde_json::Error),
    NoFrames,
    ParseError(String),
}

impl From<io::Error> for FocusCliError {
    fn from(e: io::Error) -> Self {
        FocusCliError::Io(e)
    }
}

impl From<FocusError> for FocusCliError {
    fn from(e: FocusError) -> Self {
        FocusCliError::Focus(e)
    }
}

impl From<serde_json::Error> for FocusCliError {
    fn from(e: serde_json::Error) -> Self {
        FocusCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FocusCliError> for CliError {
    fn from(e: FocusCliError) -> Self {
        match e {
            FocusCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FocusCliError::Focus(FocusError::ConfigError(message)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message,
                hint: Some("Run 'focus config' to see the defaults".to_string()),
            },
            FocusCliError::Focus(e) => CliError {
                code: "SESSION_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FocusCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FocusCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input has one raw frame JSON object per line".to_string()),
            },
            FocusCliError::ParseError(message) => CliError {
                code: "PARSE_ERROR".to_string(),
                message,
                hint: Some(
                    "Frames look like {\"head_pose\": {\"yaw\": 0.0, \"pitch\": 0.0}, \"pupils\": null, \"emotion\": \"Neutral\"}"
                        .to_string(),
                ),
            },
        }
    }
}
