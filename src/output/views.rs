//! Read-only partitions of a finished crawl
//!
//! Every report is derived lazily from the `CrawlReport` done set; nothing here
//! mutates pages.

use crate::crawler::CrawlReport;
use crate::state::{Page, NO_RESPONSE};
use crate::url::CanonicalUrl;
use std::collections::{BTreeMap, BTreeSet};

/// Broken pages sharing one response code and one referring page
#[derive(Debug, Clone)]
pub struct BrokenLinkGroup<'a> {
    pub code: i32,

    /// Referring page; `None` for pages without a referrer (the start URL)
    pub parent: Option<&'a CanonicalUrl>,

    pub pages: Vec<&'a Page>,
}

/// Codes reported as broken: the configured error codes, then `-1`
pub fn reported_codes(report: &CrawlReport) -> Vec<i32> {
    let mut codes: Vec<i32> = report
        .error_codes
        .iter()
        .copied()
        .filter(|code| *code != NO_RESPONSE)
        .collect();
    codes.push(NO_RESPONSE);
    codes
}

/// Groups broken internal (or external) pages by response code, then by referrer
///
/// A page with several referrers appears once under each of them.
pub fn broken_links(report: &CrawlReport, external: bool) -> Vec<BrokenLinkGroup<'_>> {
    let mut groups = Vec::new();

    for code in reported_codes(report) {
        let mut by_parent: BTreeMap<Option<&CanonicalUrl>, Vec<&Page>> = BTreeMap::new();

        for page in report.pages.values() {
            if page.is_external_page() != external || page.response_code != code {
                continue;
            }

            if page.parents.is_empty() {
                by_parent.entry(None).or_default().push(page);
            }
            for parent in &page.parents {
                by_parent.entry(Some(parent)).or_default().push(page);
            }
        }

        groups.extend(
            by_parent
                .into_iter()
                .map(|(parent, pages)| BrokenLinkGroup { code, parent, pages }),
        );
    }

    groups
}

/// Raw hardcoded hrefs keyed by the page they were found on
pub fn hardcoded_links(report: &CrawlReport) -> BTreeMap<&CanonicalUrl, &BTreeSet<String>> {
    report
        .pages
        .iter()
        .filter(|(_, page)| !page.hardcoded_links.is_empty())
        .map(|(key, page)| (key, &page.hardcoded_links))
        .collect()
}

/// Successful HTML pages on one side of the domain boundary
///
/// A page qualifies when it got a response below 400 that is not a configured
/// error code and its content type is HTML.
pub fn inventory(report: &CrawlReport, external: bool) -> Vec<&CanonicalUrl> {
    report
        .pages
        .iter()
        .filter(|(_, page)| {
            page.is_external_page() == external
                && page.has_response()
                && page.response_code < 400
                && !report.error_codes.contains(&page.response_code)
                && page.is_html()
        })
        .map(|(key, _)| key)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::url::{canonicalize, Classification};
    use chrono::Utc;

    pub fn page(url: &str, code: i32, content_type: &str, parents: &[&str]) -> Page {
        let mut page = Page::new(url, Classification::default());
        page.response_code = code;
        page.content_type = content_type.to_string();
        page.parents = parents.iter().map(|p| canonicalize(p)).collect();
        page
    }

    /// Home links to /a, /gone, /down and an external site; /a also links to /gone
    pub fn create_test_report() -> CrawlReport {
        let mut home = page("http://example.com/", 200, "text/html", &[]);
        home.hardcoded_links.insert("http://example.com/a".to_string());

        let a = page("http://example.com/a", 200, "text/html; charset=utf-8", &["http://example.com/"]);
        let gone = page(
            "http://example.com/gone",
            404,
            "text/html",
            &["http://example.com/", "http://example.com/a"],
        );
        let mut down = page("http://example.com/down", NO_RESPONSE, "", &["http://example.com/"]);
        down.failure_message = "Request timeout".to_string();
        let pdf = page("http://example.com/doc.pdf", 200, "application/pdf", &["http://example.com/"]);

        let mut other = page("http://other.com/", 200, "text/html", &["http://example.com/"]);
        other.external = true;
        let mut other_gone = page("http://other.com/gone", 500, "text/html", &["http://example.com/a"]);
        other_gone.external = true;

        let pages = [home, a, gone, down, pdf, other, other_gone]
            .into_iter()
            .map(|p| (p.key.clone(), p))
            .collect();

        CrawlReport {
            start_url: "http://example.com/".to_string(),
            base_domain: "example.com".to_string(),
            pages,
            skipped: BTreeMap::new(),
            unfinished: 0,
            cancelled: false,
            sitemap_passes: 2,
            error_codes: [404, 500, 403].into_iter().collect(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }
}
