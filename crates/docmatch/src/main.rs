//! docmatch command line
//!
//! - `run`: scan, export metadata, merge against the configured index
//! - `scan`: metadata extraction only
//! - `compare`: join two existing files
//! - `init-config`: write a settings file with the defaults

use anyhow::Context;
use clap::{Parser, Subcommand};
use docmatch::config::{Settings, DEFAULT_CONFIG_PATH};
use docmatch::{compare_files, run_pipeline, scan_to_file, DocmatchError, ErrorKind};
use docmatch_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "docmatch",
    version,
    about = "Extract dated document metadata from file names and reconcile it against an index"
)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Settings file
    #[arg(short = 'c', long, global = true, env = "DOCMATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan, export metadata, then merge it with the comparison file
    Run,

    /// Extract metadata from file names under a directory
    Scan {
        /// Directory to scan (defaults to scan.path)
        path: Option<PathBuf>,

        /// Output CSV or XLSX (defaults to scan.output_csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full outer join of two CSV/XLS/XLSX files
    Compare {
        /// Left input (defaults to compare.df1.file_path)
        #[arg(long)]
        left: Option<PathBuf>,

        /// Right input (defaults to compare.df2.file_path)
        #[arg(long)]
        right: Option<PathBuf>,

        /// Left key columns, comma separated
        #[arg(long, value_delimiter = ',')]
        left_on: Vec<String>,

        /// Right key columns, comma separated
        #[arg(long, value_delimiter = ',')]
        right_on: Vec<String>,

        /// Write the merged table here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a settings file populated with the defaults
    InitConfig {
        /// Destination (defaults to --config)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "docmatch",
        verbose: cli.verbose,
    })
    .context("Logging disabled")
    {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err.kind();
            report_failure(&err);
            eprintln!("Error ({}): {}", kind, err);
            ExitCode::from(exit_code(kind))
        }
    }
}

/// Unexpected failures are fatal for the run and carry `fatal = true`.
fn report_failure(err: &DocmatchError) {
    let kind = err.kind();
    if is_fatal(kind) {
        error!(kind = %kind, fatal = true, error = %err, "Fatal error, aborting run");
    } else {
        error!(kind = %kind, error = %err, "Command failed");
    }
}

fn is_fatal(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Unexpected)
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Configuration | ErrorKind::Io => 1,
        ErrorKind::Unexpected => 2,
    }
}

fn run_command(args: Cli) -> Result<(), DocmatchError> {
    match args.command {
        Commands::InitConfig { path, force } => {
            let path = path.unwrap_or(args.config);
            if path.exists() && !force {
                return Err(DocmatchError::Config(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                )));
            }
            Settings::default().save(&path)?;
            info!(path = %path.display(), "Settings written");
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Run => {
            let settings = Settings::load_or_default(&args.config)?;
            let report = run_pipeline(&settings)?;
            cli::output::print_scan_stats(&report.collect_stats);
            println!(
                "Metadata: {} rows -> {}",
                report.metadata_rows,
                settings.scan.output_csv.display()
            );
            println!(
                "Comparison: {} rows <- {}",
                report.comparison_rows,
                settings.compare.df2.file_path.display()
            );
            cli::output::print_preview(
                &report.merged.dataset,
                settings.compare.preview_rows,
                &report.merged.summary,
            )
        }
        Commands::Scan { path, output } => {
            let mut settings = Settings::load_or_default(&args.config)?;
            if let Some(path) = path {
                settings.scan.path = path;
            }
            if let Some(output) = output {
                settings.scan.output_csv = output;
            }
            let collected = scan_to_file(
                &settings.scan.path,
                &settings.scan.output_csv,
                &settings.scan.walk_config(),
            )?;
            cli::output::print_scan_stats(&collected.stats);
            println!("Wrote {}", settings.scan.output_csv.display());
            Ok(())
        }
        Commands::Compare {
            left,
            right,
            left_on,
            right_on,
            output,
        } => {
            let mut settings = Settings::load_or_default(&args.config)?;
            let cmp = &mut settings.compare;
            if let Some(left) = left {
                cmp.df1.file_path = left;
            }
            if let Some(right) = right {
                cmp.df2.file_path = right;
            }
            if !left_on.is_empty() {
                cmp.df1.on_columns = left_on;
            }
            if !right_on.is_empty() {
                cmp.df2.on_columns = right_on;
            }
            if output.is_some() {
                cmp.output = output;
            }

            let merged = compare_files(&settings)?;
            cli::output::print_preview(
                &merged.dataset,
                settings.compare.preview_rows,
                &merged.summary,
            )?;
            if let Some(path) = &settings.compare.output {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
