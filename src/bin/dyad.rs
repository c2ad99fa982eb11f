//! dyad CLI - Command-line interface for dyad-score
//!
//! Commands:
//! - score: Score a single session file
//! - pairs: List the participant pairs found in the data directory
//! - report: Report mean and standard error per scenario group
//! - doctor: Diagnose data directory and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dyad_score::discovery::SESSION_EXTENSION;
use dyad_score::pipeline::score_recording;
use dyad_score::types::SessionType;
use dyad_score::{
    classify_participant, Config, IntervalParser, PairReporter, ParticipantPair, RunReport,
    ScoreError, SessionIndex, WeightTable, PRODUCER_NAME, VERSION,
};

/// dyad - Engagement scoring for dyad interaction interval logs
#[derive(Parser)]
#[command(name = "dyad")]
#[command(version = VERSION)]
#[command(about = "Score dyad session interval logs", long_about = None)]
struct Cli {
    /// Directory containing .dtx session files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cognitive weights, category 1 first (e.g. "0,-1,1,2,2,3,5")
    #[arg(long, global = true, allow_hyphen_values = true)]
    cognitive_weights: Option<WeightTable>,

    /// Social weights, category 1 first
    #[arg(long, global = true, allow_hyphen_values = true)]
    social_weights: Option<WeightTable>,

    /// Only score sessions spanning exactly this many time units
    #[arg(long, global = true)]
    canonical_duration: Option<u64>,

    /// Reject sessions with gaps or overlaps between intervals
    #[arg(long, global = true)]
    strict_continuity: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single session file
    Score {
        /// Session file path
        file: PathBuf,

        /// Weight table to apply
        #[arg(long, value_enum, default_value = "cognitive")]
        family: Family,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List participant pairs found in the data directory
    Pairs {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report per-scenario statistics for one pair or every pair
    Report {
        /// CA identifier (requires --peer)
        #[arg(long, requires = "peer")]
        ca: Option<String>,

        /// Peer identifier (requires --ca)
        #[arg(long, requires = "ca")]
        peer: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Diagnose data directory and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Cognitive,
    Social,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One line per scenario group
    Text,
    /// JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DyadCliError> {
    let config = resolve_config(&cli)?;
    let config_path = cli.config.clone();

    match cli.command {
        Commands::Score { file, family, json } => cmd_score(&config, &file, family, json),
        Commands::Pairs { json } => cmd_pairs(&config, json),
        Commands::Report { ca, peer, format } => {
            let pair = match (ca, peer) {
                (Some(ca), Some(peer)) => Some(ParticipantPair::new(ca, peer)),
                _ => None,
            };
            cmd_report(&config, pair, format)
        }
        Commands::Doctor { json } => cmd_doctor(config_path.as_deref(), &config, json),
    }
}

/// Layer command-line overrides on top of the config file (or defaults)
fn resolve_config(cli: &Cli) -> Result<Config, DyadCliError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(weights) = &cli.cognitive_weights {
        config.cognitive_weights = weights.clone();
    }
    if let Some(weights) = &cli.social_weights {
        config.social_weights = weights.clone();
    }
    if cli.canonical_duration.is_some() {
        config.canonical_duration = cli.canonical_duration;
    }
    if cli.strict_continuity {
        config.strict_continuity = true;
    }

    config.validate()?;
    Ok(config)
}

fn cmd_score(config: &Config, file: &Path, family: Family, json: bool) -> Result<(), DyadCliError> {
    let weights = match family {
        Family::Cognitive => &config.cognitive_weights,
        Family::Social => &config.social_weights,
    };

    let recording = IntervalParser::parse_file(file)?;
    let score = score_recording(&recording, weights, &config.scoring_options())?;

    let report = ScoreReport {
        file: file.display().to_string(),
        intervals: recording.intervals.len(),
        total_duration: recording.total_duration,
        canonical_length: recording.is_canonical_length(),
        discontinuities: recording.anomalies.len(),
        score,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File:            {}", report.file);
        println!("Intervals:       {}", report.intervals);
        println!(
            "Total duration:  {}{}",
            report.total_duration,
            if report.canonical_length { "" } else { " (non-canonical)" }
        );
        println!("Discontinuities: {}", report.discontinuities);
        match report.score {
            Some(score) => println!("Score:           {:.3}", score),
            None => println!("Score:           undefined"),
        }
    }

    Ok(())
}

fn cmd_pairs(config: &Config, json: bool) -> Result<(), DyadCliError> {
    let index = SessionIndex::scan(&config.data_dir)?;
    let pairs = index.unique_pairs();

    if json {
        let entries: Vec<PairEntry> = pairs
            .iter()
            .map(|pair| PairEntry {
                ca: pair.ca.clone(),
                peer: pair.peer.clone(),
                training: classify_participant(&pair.peer).as_str().to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for pair in &pairs {
            println!("{} {} ({})", pair.ca, pair.peer, classify_participant(&pair.peer).as_str());
        }
    }

    Ok(())
}

fn cmd_report(
    config: &Config,
    pair: Option<ParticipantPair>,
    format: OutputFormat,
) -> Result<(), DyadCliError> {
    let index = SessionIndex::scan(&config.data_dir)?;
    let pairs = match pair {
        Some(pair) => vec![pair],
        None => index.unique_pairs(),
    };

    if pairs.is_empty() {
        return Err(DyadCliError::NoSessions(config.data_dir.clone()));
    }

    let reporter = PairReporter::new(&index, config.scoring_options());
    let reports: Vec<_> = pairs
        .iter()
        .map(|pair| reporter.report(pair, &config.cognitive_weights, &config.social_weights))
        .collect();

    match format {
        OutputFormat::Text => {
            let blocks: Vec<String> = reports.iter().map(|r| r.render().join("\n")).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&RunReport::new(reports))?);
        }
        OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(&RunReport::new(reports))?);
        }
    }

    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, config: &Config, json: bool) -> Result<(), DyadCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, VERSION),
    });

    checks.push(DoctorCheck {
        name: "config".to_string(),
        status: CheckStatus::Ok,
        message: match config_path {
            Some(path) => format!("Loaded {}", path.display()),
            None => "Using built-in defaults".to_string(),
        },
    });

    for (family, weights) in [
        (SessionType::Cognitive, &config.cognitive_weights),
        (SessionType::Social, &config.social_weights),
    ] {
        checks.push(DoctorCheck {
            name: format!("{}_weights", family.code()),
            status: CheckStatus::Ok,
            message: format!("{}", weights),
        });
    }

    let data_dir = &config.data_dir;
    if data_dir.is_dir() {
        match SessionIndex::scan(data_dir) {
            Ok(index) => {
                let dtx_files = count_dtx_files(data_dir);
                let ignored = dtx_files.saturating_sub(index.len());
                checks.push(DoctorCheck {
                    name: "data_dir".to_string(),
                    status: if index.is_empty() {
                        CheckStatus::Warning
                    } else {
                        CheckStatus::Ok
                    },
                    message: format!(
                        "{}: {} session files, {} pairs",
                        data_dir.display(),
                        index.len(),
                        index.unique_pairs().len()
                    ),
                });
                if ignored > 0 {
                    checks.push(DoctorCheck {
                        name: "file_names".to_string(),
                        status: CheckStatus::Warning,
                        message: format!("{} .dtx files do not follow the naming convention", ignored),
                    });
                }
            }
            Err(e) => checks.push(DoctorCheck {
                name: "data_dir".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read {}: {}", data_dir.display(), e),
            }),
        }
    } else {
        checks.push(DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Error,
            message: format!("{} is not a directory", data_dir.display()),
        });
    }

    checks.push(DoctorCheck {
        name: "stdout".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdout) {
            "stdout is a TTY (text output recommended)".to_string()
        } else {
            "stdout is a pipe (--format json recommended)".to_string()
        },
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("dyad Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(DyadCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn count_dtx_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some(SESSION_EXTENSION))
                .count()
        })
        .unwrap_or(0)
}

// Error types

#[derive(Debug)]
enum DyadCliError {
    Score(ScoreError),
    Json(serde_json::Error),
    NoSessions(PathBuf),
    DoctorFailed,
}

impl From<ScoreError> for DyadCliError {
    fn from(e: ScoreError) -> Self {
        DyadCliError::Score(e)
    }
}

impl From<serde_json::Error> for DyadCliError {
    fn from(e: serde_json::Error) -> Self {
        DyadCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DyadCliError> for CliError {
    fn from(e: DyadCliError) -> Self {
        match e {
            DyadCliError::Score(e) => {
                let (code, hint) = match &e {
                    ScoreError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    ScoreError::JsonError(_) | ScoreError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Check the configuration file")
                    }
                    ScoreError::InvalidWeights(_) => {
                        ("WEIGHTS_ERROR", "Provide 7 comma-separated numbers, category 1 first")
                    }
                    ScoreError::UnknownCategory { .. } => {
                        ("UNKNOWN_CATEGORY", "Session uses a category outside the weight table")
                    }
                    ScoreError::MalformedInterval { .. } | ScoreError::Discontinuity { .. } => {
                        ("MALFORMED_SESSION", "Ensure lines are 'category,start,end' and contiguous")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            DyadCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            DyadCliError::NoSessions(dir) => CliError {
                code: "NO_SESSIONS".to_string(),
                message: format!("No session files found in {}", dir.display()),
                hint: Some("Run 'dyad doctor' to check the data directory".to_string()),
            },
            DyadCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ScoreReport {
    file: String,
    intervals: usize,
    total_duration: u64,
    canonical_length: bool,
    discontinuities: usize,
    score: Option<f64>,
}

#[derive(serde::Serialize)]
struct PairEntry {
    ca: String,
    peer: String,
    training: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
