//! docdecay CLI - Detect documentation decay in a codebase.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use docdecay::analyzer::DocumentationAnalyzer;
use docdecay::errors::{exit_code, AnalyzerError};
use docdecay::serializer::AnalysisSerializer;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "docdecay")]
#[command(about = "Detect documentation decay in a codebase")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a tree and report documentation coverage
    Scan {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write the full report to a file instead of stdout (resolved
        /// relative to `path`)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Enable debug-level logging
        #[arg(long)]
        verbose: bool,
    },

    /// Show the documentation impact of one commit
    Impact {
        /// Path to the git repository
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Commit to analyze (compared against its parent)
        #[arg(long, default_value = "HEAD")]
        commit: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Enable debug-level logging
        #[arg(long)]
        verbose: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn run_scan(path: PathBuf, json: bool, out: Option<PathBuf>, verbose: bool) -> Result<(), AnalyzerError> {
    docdecay::telemetry::init(verbose);

    let mut analyzer = DocumentationAnalyzer::new();
    analyzer.analyze_directory(&path)?;
    let report = analyzer.report(&path);

    if let Some(relative_out) = out {
        let written = AnalysisSerializer::write_json(&report, &path, &relative_out)?;
        eprintln!("wrote report to {}", written.display());
        return Ok(());
    }

    if json {
        println!("{}", AnalysisSerializer::to_json_string(&report)?);
    } else {
        let coverage = &report.coverage;
        println!("scanned {} code file(s), {} doc file(s)", report.code_file_count, report.doc_file_count);
        println!(
            "{}/{} entities documented ({:.1}%)",
            coverage.documented_entities,
            coverage.total_entities,
            coverage.coverage_ratio() * 100.0
        );
        println!(
            "{}/{} references resolved ({:.1}%)",
            coverage.linked_references,
            coverage.total_references,
            coverage.link_ratio() * 100.0
        );
    }
    Ok(())
}

fn run_impact(path: PathBuf, commit: String, json: bool, verbose: bool) -> Result<(), AnalyzerError> {
    docdecay::telemetry::init(verbose);

    let mut analyzer = DocumentationAnalyzer::new();
    analyzer.analyze_directory(&path)?;
    let impacts = analyzer.analyze_commit(&path, &commit)?;

    if json {
        println!("{}", AnalysisSerializer::to_json_string(&impacts)?);
    } else if impacts.is_empty() {
        println!("no documentation impact detected for {commit}");
    } else {
        for impact in &impacts {
            println!(
                "[{:?}/{:.2}] {:?}: {}",
                impact.severity, impact.confidence, impact.impact_type, impact.description
            );
        }
    }
    Ok(())
}

fn json_flag(command: &Commands) -> bool {
    match command {
        Commands::Scan { json, .. } | Commands::Impact { json, .. } => *json,
        Commands::Completions { .. } => false,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Scan { path, json, out, verbose } => run_scan(path, json, out, verbose),
        Commands::Impact { path, commit, json, verbose } => run_impact(path, commit, json, verbose),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "docdecay", &mut std::io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json_output {
                #[derive(Serialize)]
                struct ErrorOutput {
                    error: String,
                }
                let payload = ErrorOutput { error: e.to_string() };
                let json = serde_json::to_string(&payload)
                    .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
                eprintln!("{json}");
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}
