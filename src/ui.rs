//! Terminal formatting for progress and results.
//!
//! Everything goes to stderr so stdout stays reserved for outputs.

use crate::analyzer::Derivation;
use crate::boundary::{short_hash, BoundaryWarning};
use console::style;

const MAX_LISTED_COMMITS: usize = 10;
const MAX_SUMMARY_CHARS: usize = 60;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("WARNING:").yellow().bold(), warning);
}

/// Truncate a summary to a fixed number of characters
pub fn shorten(summary: &str) -> String {
    if summary.chars().count() > MAX_SUMMARY_CHARS {
        let cut: String = summary.chars().take(MAX_SUMMARY_CHARS).collect();
        format!("{}…", cut)
    } else {
        summary.to_string()
    }
}

/// Show what the scan found and which tag it proposes.
pub fn display_derivation(component: &str, derivation: &Derivation) {
    eprintln!(
        "\n{}",
        style(format!("Unreleased commits for '{}'", component)).bold()
    );

    if derivation.unreleased.is_empty() {
        eprintln!("  (none)");
    }

    for commit in derivation.unreleased.iter().take(MAX_LISTED_COMMITS) {
        let level = format!("{:?}", commit.level).to_lowercase();
        let level = if commit.marked {
            style(level).cyan()
        } else {
            style(level).dim()
        };
        eprintln!(
            "  {} {:<5} {}",
            short_hash(&commit.id),
            level,
            shorten(&commit.summary)
        );
    }

    if derivation.unreleased.len() > MAX_LISTED_COMMITS {
        eprintln!(
            "  ... and {} more commits",
            derivation.unreleased.len() - MAX_LISTED_COMMITS
        );
    }

    match &derivation.previous_tag {
        Some(previous) => eprintln!(
            "\n  From: {}\n  To:   {} ({})",
            style(previous).red(),
            style(&derivation.tag).green(),
            derivation.bump
        ),
        None => eprintln!(
            "\n  Starting at {}\n  New tag: {} ({})",
            derivation.previous_version,
            style(&derivation.tag).green(),
            derivation.bump
        ),
    }
}
