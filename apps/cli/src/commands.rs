//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use edutrace_parser::EducationParser;
use edutrace_shared::{
    AppConfig, DegreeLevel, PersonRecord, init_config, load_config, load_config_from,
    records_to_json,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// edutrace: pull structured education history out of CV text.
#[derive(Parser)]
#[command(
    name = "edutrace",
    version,
    about = "Extract degree, institution, field, year and dissertation records from CV text.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse one or more normalized CV text files.
    Parse {
        /// Text files to parse. The file name is used as the document id.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the JSON array here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Config file to use instead of ~/.edutrace/edutrace.toml.
        #[arg(long, env = "EDUTRACE_CONFIG")]
        config: Option<PathBuf>,

        /// Override `parser.lookahead`.
        #[arg(long)]
        lookahead: Option<usize>,

        /// Skip the cross-level institution check.
        #[arg(long)]
        no_validate: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "edutrace=info",
        1 => "edutrace=debug",
        _ => "edutrace=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse {
            files,
            out,
            pretty,
            config,
            lookahead,
            no_validate,
        } => {
            let mut config = match config {
                Some(path) => load_config_from(&path)?,
                None => load_config()?,
            };
            if let Some(lookahead) = lookahead {
                config.parser.lookahead = lookahead;
                config.parser.validate_windows()?;
            }
            if no_validate {
                config.parser.validate = false;
            }
            config.output.pretty |= pretty;
            cmd_parse(&files, out.as_deref(), &config)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

fn cmd_parse(files: &[PathBuf], out: Option<&Path>, config: &AppConfig) -> Result<()> {
    let parser = EducationParser::new(config.parser.clone());
    let progress = file_progress(files.len());

    info!(files = files.len(), "parsing documents");

    let records: Vec<PersonRecord> = files
        .iter()
        .map(|path| {
            let id = document_id(path);
            progress.set_message(id.clone());
            let record = match std::fs::read_to_string(path) {
                Ok(text) => parser.parse(&text, &id),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read document");
                    unreadable(&id, &e)
                }
            };
            progress.inc(1);
            record
        })
        .collect();

    progress.finish_and_clear();

    let json = records_to_json(&records, config.output.pretty)?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            info!(path = %path.display(), "results written");
        }
        None => println!("{json}"),
    }

    eprint!("{}", ExtractionSummary::from_records(&records));
    Ok(())
}

/// Document id for a path: the file name, or the whole path if it has none.
fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn unreadable(document_id: &str, error: &std::io::Error) -> PersonRecord {
    PersonRecord {
        source_document_id: document_id.to_string(),
        notes: vec![format!("ERROR: could not read document: {error}")],
        ..PersonRecord::default()
    }
}

/// Progress bar over the input files; hidden for a single file.
fn file_progress(total: usize) -> ProgressBar {
    if total < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Batch statistics printed after a parse run.
#[derive(Debug, Default, PartialEq, Eq)]
struct ExtractionSummary {
    documents: usize,
    names: usize,
    phd: usize,
    masters: usize,
    undergrad: usize,
    without_degrees: usize,
}

impl ExtractionSummary {
    fn from_records(records: &[PersonRecord]) -> Self {
        let count = |level| records.iter().filter(|r| r.has_level(level)).count();
        Self {
            documents: records.len(),
            names: records.iter().filter(|r| !r.name.is_empty()).count(),
            phd: count(DegreeLevel::Phd),
            masters: count(DegreeLevel::Masters),
            undergrad: count(DegreeLevel::Undergrad),
            without_degrees: records.iter().filter(|r| r.degrees.is_empty()).count(),
        }
    }
}

impl std::fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "  Extraction summary")?;
        writeln!(f, "  Documents:       {}", self.documents)?;
        writeln!(f, "  Names found:     {}", self.names)?;
        writeln!(f, "  With PhD:        {}", self.phd)?;
        writeln!(f, "  With Masters:    {}", self.masters)?;
        writeln!(f, "  With Undergrad:  {}", self.undergrad)?;
        writeln!(f, "  No degrees:      {}", self.without_degrees)?;
        writeln!(f)
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
