//! Terminal output for the CLI.
//!
//! All user-facing printing goes through [`OutputFormatter`] so styling stays
//! consistent. Diagnostics go through `tracing` instead; this module is only
//! for the report a user reads.

use crate::executor::ExecutionResult;
use crate::manifest::ManifestPaths;
use crate::planner::FileOperation;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Label used in the summary table for files without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

pub struct OutputFormatter;

impl OutputFormatter {
    /// Green check mark line.
    ///
    /// ```no_run
    /// use neatdir::output::OutputFormatter;
    /// OutputFormatter::success("Organized 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross line, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// One line per planned operation: `kind  source -> destination`.
    pub fn operation(operation: &FileOperation) {
        println!(
            "  {:<16} {} {} {}",
            operation.kind.to_string().cyan(),
            operation.source_path.display(),
            "->".dimmed(),
            operation.destination_path.display()
        );
    }

    /// Progress bar for the execution phase. Draws to stderr and hides
    /// itself when stderr is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Prints file counts per category and a total row.
    ///
    /// ```no_run
    /// use neatdir::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("documents".to_string(), 15);
    /// counts.insert("images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Success and failure counts, then every failure with its message.
    pub fn execution_report(result: &ExecutionResult) {
        Self::header("RESULT");
        Self::success(&format!("{} operation(s) succeeded", result.success_count));
        if result.failure_count == 0 {
            return;
        }
        Self::error(&format!("{} operation(s) failed", result.failure_count));
        for failure in &result.failures {
            eprintln!(
                "    - {}: {}",
                failure.source_path.display(),
                failure.error_message
            );
        }
    }

    pub fn manifest_paths(paths: &ManifestPaths) {
        Self::info(&format!("Manifest written to {}", paths.json.display()));
        Self::info(&format!("Report written to {}", paths.text.display()));
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
