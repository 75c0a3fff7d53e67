//! Output module for reporting crawl results
//!
//! This module handles:
//! - Partitioning the done set into broken / hardcoded / inventory views
//! - Writing one plain-text file per report
//! - Generating the markdown summary and crawl statistics
//! - Diffing two URL lists

pub mod diff;
mod markdown;
mod stats;
mod text;
mod traits;
pub mod views;

pub use diff::{diff_files, diff_url_lists, UrlListDiff};
pub use markdown::{format_markdown_summary, MarkdownSummaryWriter};
pub use stats::{code_label, print_statistics, CrawlStatistics};
pub use text::{
    render_broken_links, render_hardcoded_links, render_inventory, render_resource_issues,
    TextReportWriter, BROKEN_EXTERNAL_FILE, BROKEN_INTERNAL_FILE, EXTERNAL_PAGES_FILE,
    HARDCODED_FILE, INTERNAL_PAGES_FILE, RESOURCE_ISSUES_FILE,
};
pub use traits::{OutputError, OutputResult, ReportWriter};
