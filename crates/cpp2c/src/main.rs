//! The cpp2c command-line driver.
//!
//! - `cpp2c check <FILE>` - parse a Cpp2 file, run the meta-functions of
//!   every annotated type and report diagnostics
//!
//! Options:
//! - `--emit` - Print the declarations after meta-functions ran
//! - `--json` - Output diagnostics as JSON (one object per line); silences
//!   logging unless `--verbose` is given
//! - `--no-color` - Disable colorized output
//! - `--verbose` - Debug logging

mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use cpp2_meta::{render_diagnostic, CompilationUnit, DiagnosticOptions};

#[derive(Parser)]
#[command(name = "cpp2c", version, about = "Cpp2 meta-function driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file, apply meta-functions and report diagnostics
    Check {
        /// Path to the Cpp2 source file
        file: PathBuf,

        /// Print every top-level declaration after meta-functions ran
        #[arg(long)]
        emit: bool,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,

        /// Log every meta-function application and generated fragment
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            emit,
            json,
            no_color,
            verbose,
        } => {
            if verbose {
                logging::init_with_level(LevelFilter::Debug);
            } else if json {
                // stderr carries JSON lines only
                logging::init_with_level(LevelFilter::Off);
            } else if std::env::var_os("RUST_LOG").is_some() {
                logging::init_from_env();
            } else {
                logging::init();
            }
            debug_assert!(logging::is_initialized());
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            if let Err(e) = check(&file, emit, &diag_opts) {
                if json {
                    let msg = serde_json::json!({
                        "severity": "error",
                        "message": e,
                        "line": 0,
                        "col": 0,
                        "generated": null
                    });
                    eprintln!("{}", msg);
                } else {
                    eprintln!("error: {}", e);
                }
                process::exit(1);
            }
        }
    }
}

/// Parse, apply meta-functions, optionally print, then report.
fn check(path: &Path, emit: bool, diag_opts: &DiagnosticOptions) -> Result<(), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;

    let unit = CompilationUnit::parse(&source);
    let report = unit.apply_meta_functions();
    log::info!(
        "{}: {} annotated types, {} failed",
        path.display(),
        report.processed,
        report.failed.len()
    );

    if emit {
        print!("{}", unit.print());
    }

    let count = report_diagnostics(&unit, path, diag_opts);
    if count > 0 {
        let plural = if count == 1 { "" } else { "s" };
        return Err(format!("check failed with {count} diagnostic{plural}"));
    }
    Ok(())
}

/// Print every diagnostic of the unit to stderr and return how many there were.
fn report_diagnostics(unit: &CompilationUnit, path: &Path, diag_opts: &DiagnosticOptions) -> usize {
    let file_name = path.display().to_string();
    let diagnostics = unit.drain_diagnostics();
    let generated = unit.generated();
    for diagnostic in &diagnostics {
        let rendered =
            render_diagnostic(diagnostic, unit.source(), &generated, &file_name, diag_opts);
        eprint!("{}", rendered);
    }
    diagnostics.len()
}
