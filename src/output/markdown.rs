//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl:
//! run information, statistics, broken links and hardcoded links.

use crate::crawler::CrawlReport;
use crate::output::stats::{code_label, CrawlStatistics};
use crate::output::traits::{write_file, OutputResult, ReportWriter};
use crate::output::views::{broken_links, hardcoded_links};
use std::path::PathBuf;
use tracing::info;

/// Maximum broken-link rows listed per side before truncating
const MAX_BROKEN_ROWS: usize = 50;

/// Writes the markdown summary to one file
#[derive(Debug, Clone)]
pub struct MarkdownSummaryWriter {
    path: PathBuf,
    config_hash: Option<String>,
}

impl MarkdownSummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config_hash: None,
        }
    }

    /// Embeds the SHA-256 hash of the configuration file in the summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

impl ReportWriter for MarkdownSummaryWriter {
    fn write(&self, report: &CrawlReport) -> OutputResult<Vec<PathBuf>> {
        let stats = CrawlStatistics::from_report(report);
        let markdown = format_markdown_summary(report, &stats, self.config_hash.as_deref());
        write_file(&self.path, &markdown)?;
        info!("Wrote summary to {}", self.path.display());
        Ok(vec![self.path.clone()])
    }
}

/// Formats a crawl as markdown
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `stats` - Statistics computed from `report`
/// * `config_hash` - Hash of the configuration file, when one was used
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(
    report: &CrawlReport,
    stats: &CrawlStatistics,
    config_hash: Option<&str>,
) -> String {
    let mut md = String::new();

    md.push_str("# Site-Sweep Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", report.start_url));
    md.push_str(&format!("- **Base Domain**: {}\n", report.base_domain));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        stats.duration_seconds,
        stats.duration_seconds as f64 / 60.0
    ));
    let status = if report.cancelled { "cancelled" } else { "completed" };
    md.push_str(&format!("- **Status**: {}\n", status));
    md.push_str(&format!("- **Sitemap Passes**: {}\n", report.sitemap_passes));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Internal Pages**: {}\n", stats.internal_pages));
    md.push_str(&format!("- **External Pages**: {}\n", stats.external_pages));
    md.push_str(&format!("- **Skipped Pages**: {}\n", stats.skipped_pages));
    if stats.unfinished_pages > 0 {
        md.push_str(&format!("- **Unfinished Pages**: {}\n", stats.unfinished_pages));
    }
    md.push_str(&format!("- **Total Links**: {}\n", stats.total_links));
    md.push_str(&format!("- **Total Errors**: {}\n", stats.total_errors()));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", stats.success_rate()));
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", stats.error_rate()));

    // Error breakdown
    if !stats.errors_by_code.is_empty() {
        md.push_str("## Broken Pages by Code\n\n");
        md.push_str("| Code | Pages |\n");
        md.push_str("|------|-------|\n");
        for (code, count) in &stats.errors_by_code {
            md.push_str(&format!("| {} | {} |\n", code_label(*code), count));
        }
        md.push('\n');
    }

    for (title, external) in [("Broken Internal Links", false), ("Broken External Links", true)] {
        let rows: Vec<_> = broken_links(report, external)
            .into_iter()
            .flat_map(|group| {
                group
                    .pages
                    .into_iter()
                    .map(move |page| (group.code, group.parent, page))
            })
            .collect();
        if rows.is_empty() {
            continue;
        }

        md.push_str(&format!("## {}\n\n", title));
        md.push_str("| Code | Referrer | URL |\n");
        md.push_str("|------|----------|-----|\n");
        for (code, parent, page) in rows.iter().take(MAX_BROKEN_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                code_label(*code),
                parent.map(|p| p.as_str()).unwrap_or("(start URL)"),
                page.raw_url
            ));
        }
        if rows.len() > MAX_BROKEN_ROWS {
            md.push_str(&format!("\n... and {} more\n", rows.len() - MAX_BROKEN_ROWS));
        }
        md.push('\n');
    }

    let hardcoded = hardcoded_links(report);
    if !hardcoded.is_empty() {
        md.push_str("## Pages with Hardcoded Links\n\n");
        md.push_str("| Page | Hardcoded Links |\n");
        md.push_str("|------|-----------------|\n");
        for (referrer, links) in &hardcoded {
            md.push_str(&format!("| {} | {} |\n", referrer, links.len()));
        }
        md.push('\n');
    }

    if !report.skipped.is_empty() {
        md.push_str("## Skipped by Policy\n\n");
        md.push_str(&format!("Total: {}\n\n", report.skipped.len()));
        for key in report.skipped.keys() {
            md.push_str(&format!("- {}\n", key));
        }
        md.push('\n');
    }

    md
}
