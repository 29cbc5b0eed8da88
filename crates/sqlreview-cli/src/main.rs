//! sqlreview CLI - SQL review tool

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlreview_core::{Analyzer, ConstraintKind, ReviewContext, ReviewEngine, SqlDialect};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Check {
            files,
            dialect,
            format,
            rules,
            config: config_path,
        } => {
            // Merge CLI args with config (CLI takes precedence)
            let config = Config::load(config_path.as_ref())?.merge_with_args(
                &files,
                dialect.as_deref(),
                format,
                &rules,
            );
            let dialect = config.dialect()?;
            let output_format = config.output_format();

            let sql_files = expand_patterns(&config.files)?;
            if sql_files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Use positional arguments or configure files in sqlreview.toml"
                );
            }

            let engine = ReviewEngine::new(config.build_registry()?);

            let mut total_errors = 0;
            let mut total_warnings = 0;
            let mut total_failures = 0;

            for sql_file in &sql_files {
                let content = fs::read_to_string(sql_file).into_diagnostic()?;
                if content.trim().is_empty() {
                    tracing::info!(file = %sql_file.display(), "skipping empty file");
                    continue;
                }

                let ctx = ReviewContext::new(&content, dialect).with_rules(config.rules.iter().cloned());
                let outcome = engine.check(&ctx);

                if !outcome.is_clean() || !args.quiet {
                    let formatter =
                        OutputFormatter::new(output_format, sql_file.display().to_string());
                    formatter.print_outcome(&outcome, &content)?;
                }

                total_errors += outcome.error_count();
                total_warnings += outcome.warning_count();
                total_failures += outcome.failures.len();
            }

            // Print summary
            if total_errors > 0 || total_warnings > 0 || total_failures > 0 {
                eprintln!();
                eprintln!(
                    "Found {} error(s), {} warning(s), {} rule failure(s) in {} file(s)",
                    total_errors,
                    total_warnings,
                    total_failures,
                    sql_files.len()
                );
            } else if !args.quiet {
                eprintln!("All {} file(s) passed review", sql_files.len());
            }

            Ok(total_errors > 0 || total_failures > 0)
        }

        Command::Rules {
            dialect,
            config: config_path,
        } => {
            let config = Config::load(config_path.as_ref())?.merge_with_args(
                &[],
                dialect.as_deref(),
                None,
                &[],
            );
            let dialect = config.dialect()?;
            let engine = ReviewEngine::new(config.build_registry()?);

            println!("Rules for {}:", dialect);
            println!("==================");
            for rule in engine.list_rules(dialect) {
                println!("  {} [{}] {}", rule.id, rule.severity, rule.name);
                println!("      {}", rule.description);
            }

            Ok(false)
        }

        Command::Tables { file, dialect } => {
            // Display structural facts (for debugging)
            let dialect: SqlDialect = dialect.parse()?;
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let facts = Analyzer::with_dialect(dialect).analyze(&content);

            println!("Statements: {}", facts.statement_count);
            for table in &facts.tables {
                let pk = if table.has_primary_key {
                    format!("({})", table.primary_key_columns().join(", "))
                } else {
                    "none".to_string()
                };
                println!(
                    "\nTable: {} (line {}, primary key: {})",
                    table.name, table.position.line, pk
                );
                println!("  Columns: {}", table.column_names().join(", "));
                for col in &table.columns {
                    let mut flags = Vec::new();
                    if col.is_primary_key_inline {
                        flags.push("PRIMARY KEY");
                    }
                    if col.is_auto_increment {
                        flags.push("AUTO_INCREMENT");
                    }
                    println!(
                        "    - {} {} {}",
                        col.name,
                        col.data_type.as_deref().unwrap_or("?"),
                        flags.join(" ")
                    );
                }
                for constraint in &table.constraints {
                    let kind = match constraint.kind {
                        ConstraintKind::PrimaryKey => "PRIMARY KEY",
                        ConstraintKind::Unique => "UNIQUE",
                        ConstraintKind::ForeignKey => "FOREIGN KEY",
                        ConstraintKind::Other => "OTHER",
                    };
                    println!(
                        "    * {} ({}){}",
                        kind,
                        constraint.columns.join(", "),
                        constraint
                            .name
                            .as_ref()
                            .map(|n| format!(" name={}", n))
                            .unwrap_or_default()
                    );
                }
            }

            for error in &facts.syntax_errors {
                eprintln!("Syntax error: {}", error);
            }

            Ok(!facts.syntax_errors.is_empty())
        }
    }
}

/// Expand glob patterns; plain paths are kept as given
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') {
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                paths.push(path);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}
