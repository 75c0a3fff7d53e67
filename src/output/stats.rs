//! Statistics derived from a finished crawl
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from a `CrawlReport`.

use crate::crawler::CrawlReport;
use crate::output::views::{hardcoded_links, reported_codes};
use crate::state::NO_RESPONSE;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Pages fetched (or attempted) to completion
    pub total_pages: u64,

    pub internal_pages: u64,

    pub external_pages: u64,

    /// Policy-excluded pages that were recorded but never fetched
    pub skipped_pages: u64,

    /// Pending or in-flight pages left behind by a cancelled crawl
    pub unfinished_pages: u64,

    /// Total parent -> child edges across the done set
    pub total_links: u64,

    /// Pages carrying at least one hardcoded href
    pub pages_with_hardcoded_links: u64,

    /// Raw hardcoded hrefs across all pages
    pub hardcoded_links: u64,

    /// Broken pages per reported code (`-1` for no response)
    pub errors_by_code: BTreeMap<i32, u64>,

    pub duration_seconds: i64,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut errors_by_code = BTreeMap::new();
        for code in reported_codes(report) {
            let count = report
                .pages
                .values()
                .filter(|p| p.response_code == code)
                .count() as u64;
            if count > 0 {
                errors_by_code.insert(code, count);
            }
        }

        let hardcoded = hardcoded_links(report);

        Self {
            total_pages: report.pages.len() as u64,
            internal_pages: report.internal_pages().count() as u64,
            external_pages: report.external_pages().count() as u64,
            skipped_pages: report.skipped.len() as u64,
            unfinished_pages: report.unfinished as u64,
            total_links: report.pages.values().map(|p| p.children.len() as u64).sum(),
            pages_with_hardcoded_links: hardcoded.len() as u64,
            hardcoded_links: hardcoded.values().map(|links| links.len() as u64).sum(),
            errors_by_code,
            duration_seconds: report.duration().num_seconds(),
        }
    }

    pub fn total_errors(&self) -> u64 {
        self.errors_by_code.values().sum()
    }

    /// Percentage of finished pages that are not broken
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.total_pages - self.total_errors()) as f64 / self.total_pages as f64 * 100.0
    }

    pub fn error_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        self.total_errors() as f64 / self.total_pages as f64 * 100.0
    }
}

/// Display label for a reported code
pub fn code_label(code: i32) -> String {
    if code == NO_RESPONSE {
        "-1 (unknown)".to_string()
    } else {
        code.to_string()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages finished: {}", stats.total_pages);
    println!("    Internal: {}", stats.internal_pages);
    println!("    External: {}", stats.external_pages);
    println!("  Pages skipped by policy: {}", stats.skipped_pages);
    if stats.unfinished_pages > 0 {
        println!("  Pages left unfinished: {}", stats.unfinished_pages);
    }
    println!("  Total links found: {}", stats.total_links);
    println!(
        "  Hardcoded links: {} on {} pages",
        stats.hardcoded_links, stats.pages_with_hardcoded_links
    );
    println!("  Duration: {}s", stats.duration_seconds);
    println!();

    if !stats.errors_by_code.is_empty() {
        println!("Broken Pages by Code:");
        for (code, count) in &stats.errors_by_code {
            println!("  {}: {}", code_label(*code), count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages without errors)",
        stats.success_rate(),
        stats.total_pages - stats.total_errors(),
        stats.total_pages
    );
}
