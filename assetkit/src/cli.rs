//! CLI commands and output formatting.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::add::{self, InstallationRequest, InstallationResult, Services};
use crate::error::{InstallError, Result};
use crate::registry::RegistryEntry;
use crate::reporter::Reporter;

/// assetkit - add components, templates and themes from a registry to your project
#[derive(Parser, Debug)]
#[command(name = "assetkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Run in verbose mode (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add components, templates or themes to the project
    Add(AddArgs),

    /// List what a registry offers
    List(ListArgs),
}

/// Arguments of `assetkit add`.
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// component(s), template(s) or theme(s)
    pub namespace: String,

    /// Ids or names to add (prompts when empty)
    pub identifiers: Vec<String>,

    /// Skip prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output a single JSON document instead of log lines
    #[arg(long)]
    pub json: bool,

    /// Project directory
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub cwd: PathBuf,
}

impl From<AddArgs> for InstallationRequest {
    fn from(args: AddArgs) -> Self {
        Self {
            namespace: args.namespace,
            identifiers: args.identifiers,
            yes: args.yes,
            json: args.json,
            cwd: args.cwd,
        }
    }
}

/// Arguments of `assetkit list`.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// component(s), template(s) or theme(s)
    pub namespace: String,

    /// Only show entries whose id, name or description contain this text
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Project directory
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub cwd: PathBuf,
}

/// Execute a parsed command and return the process exit code.
pub async fn execute(command: Command, services: &Services) -> ExitCode {
    match command {
        Command::Add(args) => handle_add(args.into(), services).await,
        Command::List(args) => handle_list(args, services).await,
    }
}

async fn handle_add(request: InstallationRequest, services: &Services) -> ExitCode {
    let reporter = Reporter::new(request.json);
    match add::add(&request, services).await {
        Ok(result) => {
            if request.json {
                emit_json(&AddReport::from(&result));
            } else {
                print_summary(&result, reporter);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e, request.json),
    }
}

async fn handle_list(args: ListArgs, services: &Services) -> ExitCode {
    let reporter = Reporter::new(args.json);
    let entries = match add::list(
        &args.namespace,
        args.query.as_deref(),
        &args.cwd,
        reporter,
        services,
    )
    .await
    {
        Ok(entries) => entries,
        Err(e) => return fail(&e, args.json),
    };

    if args.json {
        emit_json(&entries);
    } else {
        format_table(&["ID", "NAME", "TYPE", "DESCRIPTION"], entry_rows(&entries));
    }
    ExitCode::SUCCESS
}

/// Successful `add` document.
#[derive(Debug, Serialize)]
struct AddReport<'a> {
    success: bool,
    #[serde(flatten)]
    result: &'a InstallationResult,
}

impl<'a> From<&'a InstallationResult> for AddReport<'a> {
    fn from(result: &'a InstallationResult) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

/// Render an error for the chosen mode and produce the failure exit code.
fn fail(error: &InstallError, json: bool) -> ExitCode {
    tracing::debug!("Command failed: {error:?}");
    if json {
        emit_json(&json!({ "success": false, "error": error.to_string() }));
    } else {
        Reporter::human().error(error);
    }
    ExitCode::FAILURE
}

fn print_summary(result: &InstallationResult, reporter: Reporter) {
    if result.is_empty() {
        reporter.info("Nothing installed.");
        return;
    }
    if !result.installed.is_empty() {
        reporter.success(format!("Installed: {}", result.installed.join(", ")));
    }
    if !result.dependencies.is_empty() {
        let deps: Vec<&str> = result.dependencies.iter().map(String::as_str).collect();
        reporter.info(format!("Dependencies: {}", deps.join(", ")));
    }
    if !result.skipped.is_empty() {
        reporter.warn(format!("Skipped: {}", result.skipped.join(", ")));
    }
}

fn entry_rows(entries: &[RegistryEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.key().to_string(),
                e.name.clone(),
                e.main_type().unwrap_or("-").to_string(),
                e.description.clone(),
            ]
        })
        .collect()
}

/// Print exactly one JSON document to stdout.
fn emit_json<T: Serialize>(data: &T) {
    match format_json(data) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

/// Format data as JSON.
fn format_json<T: Serialize>(data: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(data)?;
    Ok(json)
}

/// Format and print a table to stdout.
fn format_table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        eprintln!("No entries found");
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").trim_end());

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", separator.join("  "));

    for row in rows {
        let formatted_row: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = width)
            })
            .collect();
        println!("{}", formatted_row.join("  ").trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_add_command() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from([
            "assetkit", "add", "component", "Button", "card", "-y", "--json", "--cwd", "app",
        ])?;
        let Command::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.namespace, "component");
        assert_eq!(args.identifiers, vec!["Button", "card"]);
        assert!(args.yes);
        assert!(args.json);
        assert_eq!(args.cwd, PathBuf::from("app"));
        Ok(())
    }

    #[test]
    fn test_add_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(["assetkit", "add", "templates"])?;
        let Command::Add(args) = cli.command else {
            panic!("expected add command");
        };
        let request = InstallationRequest::from(args);
        assert!(request.identifiers.is_empty());
        assert!(!request.yes);
        assert!(!request.json);
        assert_eq!(request.cwd, PathBuf::from("."));
        Ok(())
    }

    #[test]
    fn test_parse_list_command() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(["assetkit", "-v", "list", "themes", "-q", "dark"])?;
        assert!(cli.verbose);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.namespace, "themes");
        assert_eq!(args.query.as_deref(), Some("dark"));
        Ok(())
    }

    #[test]
    fn test_add_report_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let result = InstallationResult {
            requested: vec!["button".to_string()],
            installed: vec!["button".to_string()],
            dependencies: BTreeSet::new(),
            skipped: vec![],
        };
        let value: serde_json::Value = serde_json::from_str(&format_json(&AddReport::from(&result))?)?;
        assert_eq!(
            value,
            json!({
                "success": true,
                "requested": ["button"],
                "installed": ["button"],
                "dependencies": [],
                "skipped": []
            })
        );
        Ok(())
    }

    #[test]
    fn test_entry_rows() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let entries: Vec<RegistryEntry> = serde_json::from_str(
            r#"[{"id": "btn", "name": "Button", "description": "Click me",
                 "files": {"main": {"path": "button/index.tsx", "type": "component"}}},
                {"name": "Bare"}]"#,
        )?;
        let rows = entry_rows(&entries);
        assert_eq!(rows[0], vec!["btn", "Button", "component", "Click me"]);
        assert_eq!(rows[1], vec!["Bare", "Bare", "-", ""]);
        Ok(())
    }

    #[test]
    fn test_format_table_empty() {
        format_table(&["ID", "NAME"], Vec::new());
    }
}
