//! Output formatting

use miette::{IntoDiagnostic, Result};
use sqlreview_core::{Advice, ReviewOutcome, Severity};

use crate::args::OutputFormat;

/// Output formatter for review results
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    /// Print a review outcome in the configured format
    pub fn print_outcome(&self, outcome: &ReviewOutcome, source: &str) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human(outcome, source);
                Ok(())
            }
            OutputFormat::Json => self.print_json(outcome),
            OutputFormat::Sarif => self.print_sarif(&outcome.advice),
        }
    }

    fn print_human(&self, outcome: &ReviewOutcome, source: &str) {
        for advice in &outcome.advice {
            self.print_advice(advice, source);
        }

        for failure in &outcome.failures {
            eprintln!("\x1b[31merror\x1b[0m: {}", failure);
            eprintln!("  --> {}", self.file_name);
            eprintln!();
        }

        for skipped in &outcome.skipped {
            eprintln!("\x1b[33mwarning\x1b[0m: {} (skipped)", skipped);
        }
    }

    fn print_advice(&self, advice: &Advice, source: &str) {
        let severity_str = match advice.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        // Print main message
        eprintln!(
            "{}[{}]: {} ({})",
            severity_str, advice.code, advice.message, advice.rule_id
        );

        // Print file location if we have a position
        if let Some(position) = &advice.position {
            let (line, col) = (position.line, position.column);
            eprintln!("  --> {}:{}:{}", self.file_name, line, col);

            // Print source line with annotation
            if let Some(source_line) = get_source_line(source, line) {
                eprintln!("   |");
                eprintln!("{:>3} | {}", line, source_line);

                let padding = " ".repeat(col.saturating_sub(1));
                let available = source_line.chars().count().saturating_sub(col.saturating_sub(1));
                let underline = "^".repeat(position.length.min(available).max(1));
                eprintln!("   | {}{}", padding, underline);
            }
        }

        if let Some(help) = &advice.help {
            eprintln!("   = help: {}", help);
        }

        eprintln!();
    }

    fn print_json(&self, outcome: &ReviewOutcome) -> Result<()> {
        let failures: Vec<String> = outcome.failures.iter().map(|e| e.to_string()).collect();
        let skipped: Vec<String> = outcome.skipped.iter().map(|e| e.to_string()).collect();
        let output = serde_json::json!({
            "file": self.file_name,
            "advice": outcome.advice,
            "failures": failures,
            "skipped": skipped,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).into_diagnostic()?
        );
        Ok(())
    }

    fn print_sarif(&self, advice: &[Advice]) -> Result<()> {
        let results: Vec<serde_json::Value> = advice
            .iter()
            .map(|a| {
                let mut location = serde_json::json!({
                    "physicalLocation": {
                        "artifactLocation": {
                            "uri": self.file_name
                        }
                    }
                });
                if let Some(position) = &a.position {
                    location["physicalLocation"]["region"] = serde_json::json!({
                        "startLine": position.line,
                        "startColumn": position.column,
                    });
                }
                serde_json::json!({
                    "ruleId": a.rule_id,
                    "level": sarif_level(a.severity),
                    "message": {
                        "text": a.message
                    },
                    "locations": [location]
                })
            })
            .collect();

        let sarif = serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "sqlreview",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        println!("{}", serde_json::to_string_pretty(&sarif).into_diagnostic()?);
        Ok(())
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Get a specific line from source (1-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}
