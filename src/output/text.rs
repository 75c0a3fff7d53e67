//! Plain-text report files, one report per file

use crate::crawler::CrawlReport;
use crate::detector::DetectionReport;
use crate::output::stats::code_label;
use crate::output::traits::{write_file, OutputResult, ReportWriter};
use crate::output::views::{broken_links, hardcoded_links, inventory};
use crate::state::NO_RESPONSE;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

pub const INTERNAL_PAGES_FILE: &str = "all_internal_pages.txt";
pub const EXTERNAL_PAGES_FILE: &str = "all_external_pages.txt";
pub const BROKEN_INTERNAL_FILE: &str = "broken_internal_links.txt";
pub const BROKEN_EXTERNAL_FILE: &str = "broken_external_links.txt";
pub const HARDCODED_FILE: &str = "hardcoded_url_links.txt";
pub const RESOURCE_ISSUES_FILE: &str = "resource_issues.txt";

/// One URL per line
pub fn render_inventory(report: &CrawlReport, external: bool) -> String {
    let mut out = String::new();
    for key in inventory(report, external) {
        out.push_str(key.as_str());
        out.push('\n');
    }
    out
}

/// Broken pages grouped by referrer, one block per (code, referrer)
///
/// ```text
///
/// Examined http://example.com :
/// Pages with response Code 404 :
/// http://example.com/gone
/// ```
///
/// Transport failures are listed under `-1 (unknown)` with the failure message
/// in brackets.
pub fn render_broken_links(report: &CrawlReport, external: bool) -> String {
    let mut out = String::new();

    for group in broken_links(report, external) {
        let parent = group
            .parent
            .map(|p| p.as_str())
            .unwrap_or("(start URL)");
        let _ = write!(
            out,
            "\nExamined {} : \nPages with response Code {} : \n",
            parent,
            code_label(group.code)
        );

        for page in group.pages {
            if group.code == NO_RESPONSE {
                let _ = writeln!(out, "{} [{}]", page.raw_url, page.failure_message);
            } else {
                let _ = writeln!(out, "{}", page.raw_url);
            }
        }
    }

    out
}

/// Hardcoded hrefs grouped by the page they appear on
pub fn render_hardcoded_links(report: &CrawlReport) -> String {
    let mut out = String::new();

    for (referrer, links) in hardcoded_links(report) {
        let _ = write!(
            out,
            "\nExamined {} : \nHardcoded links found : {}\n",
            referrer,
            links.len()
        );
        for link in links {
            let _ = writeln!(out, "{}", link);
        }
    }

    out
}

/// JavaScript errors and broken resources per page
pub fn render_resource_issues(detection: &DetectionReport) -> String {
    let mut out = String::new();

    for (parent, issues) in &detection.issues {
        let _ = write!(out, "\n\nExamined {}", parent);
        if !issues.javascript_errors.is_empty() {
            out.push_str("\nJavascript Errors : \n");
            out.push_str(&join_lines(&issues.javascript_errors));
        }
        if !issues.broken_resources.is_empty() {
            out.push_str("\nBroken Resources : \n");
            out.push_str(&join_lines(&issues.broken_resources));
        }
    }

    if detection.timed_out {
        out.push_str("\n\n(browser run timed out; results are partial)\n");
    }

    out
}

fn join_lines<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the plain-text report files into one directory
#[derive(Debug, Clone)]
pub struct TextReportWriter {
    dir: PathBuf,
}

impl TextReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the internal page inventory (input for the resource detector)
    pub fn internal_inventory_path(&self) -> PathBuf {
        self.dir.join(INTERNAL_PAGES_FILE)
    }

    pub fn write_resource_issues(&self, detection: &DetectionReport) -> OutputResult<PathBuf> {
        let path = self.dir.join(RESOURCE_ISSUES_FILE);
        write_file(&path, &render_resource_issues(detection))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ReportWriter for TextReportWriter {
    fn write(&self, report: &CrawlReport) -> OutputResult<Vec<PathBuf>> {
        let files = [
            (INTERNAL_PAGES_FILE, render_inventory(report, false)),
            (EXTERNAL_PAGES_FILE, render_inventory(report, true)),
            (BROKEN_INTERNAL_FILE, render_broken_links(report, false)),
            (BROKEN_EXTERNAL_FILE, render_broken_links(report, true)),
            (HARDCODED_FILE, render_hardcoded_links(report)),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = self.dir.join(name);
            write_file(&path, &content)?;
            written.push(path);
        }

        info!("Wrote {} report files to {}", written.len(), self.dir.display());
        Ok(written)
    }
}
