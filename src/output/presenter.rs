//! Result presentation: table and JSON modes
//!
//! Receives the final report and renders it; nothing here feeds back into
//! the scrape pipeline.

use crate::output::format_stars;
use crate::scrape::{DependentEntry, DependentsReport};
use colored::Colorize;
use serde::Serialize;

/// How the final report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    repositories: &'a [DependentEntry],
    #[serde(rename = "latestDependents")]
    latest_dependents: &'a [DependentEntry],
}

/// Prints the run header shown above table output
pub fn display_project_info(repo_url: &str, entity_label: &str, package_name: Option<&str>) {
    let divider = "═".repeat(50);
    println!("\n{}", divider.cyan().bold());
    println!("{} {}", "Repository:".cyan().bold(), repo_url);
    println!("{} {}", "Type:".cyan().bold(), entity_label);
    if let Some(package) = package_name {
        println!("{} {}", "Package:".cyan().bold(), package);
    }
    println!("{}\n", divider.cyan().bold());
}

/// Renders the report in the requested format
pub fn display_report(report: &DependentsReport, entity_label: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => display_json(report),
        OutputFormat::Table => display_table(report, entity_label),
    }
}

fn display_json(report: &DependentsReport) {
    let json = JsonReport {
        repositories: &report.repositories,
        latest_dependents: &report.latest_dependents,
    };
    match serde_json::to_string_pretty(&json) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("Failed to render JSON: {e}"),
    }
}

fn display_table(report: &DependentsReport, entity_label: &str) {
    if report.repositories.is_empty() {
        println!("{}", format!("No {entity_label} found").yellow());
        return;
    }

    println!("{}", format!("Top {entity_label} by stars:").green().bold());
    print_entries_table(&report.repositories);

    println!("\n{}", format!("Latest {entity_label}:").blue().bold());
    print_entries_table(&report.latest_dependents);

    if report.stats.total_count > 0 {
        println!(
            "\n{}",
            format!(
                "Found {} {entity_label}, others are private",
                report.stats.total_count
            )
            .dimmed()
        );
        println!(
            "{}",
            format!(
                "Found {} {entity_label} with more than zero stars",
                report.stats.with_stars_count
            )
            .dimmed()
        );
    }
}

fn print_entries_table(entries: &[DependentEntry]) {
    let url_width = entries
        .iter()
        .map(|entry| entry.url.len())
        .chain(std::iter::once("URL".len()))
        .max()
        .unwrap_or(3);

    // Pad before coloring; ANSI escapes would throw the column width off
    let header = format!("{:<url_width$}  Stars", "URL");
    println!("{}", header.cyan());
    println!("{}", "-".repeat(url_width + 7));
    for entry in entries {
        println!("{:<url_width$}  {}", entry.url, format_stars(entry.stars));
    }
}
