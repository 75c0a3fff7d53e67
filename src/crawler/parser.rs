//! HTML link extraction
//!
//! This module turns a fetched HTML body into outbound link candidates:
//! - Collects every `<a href="...">` (permissive parsing, malformed markup yields fewer links)
//! - Resolves each href against the page URL with the crawl's own resolution rules
//! - Discards hrefs with non-HTTP schemes (`javascript:`, `mailto:`, `tel:`, `data:`)
//!
//! Canonicalization and classification happen downstream, not here.

use crate::url::has_http_scheme;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// One anchor found on a page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkCandidate {
    /// Absolute URL the href resolves to
    pub url: String,

    /// The href exactly as written in the markup (trimmed)
    pub href: String,
}

/// Extracts the raw `href` values of all anchors in an HTML document
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}

/// Extracts the set of link candidates on a page
///
/// Duplicate anchors collapse: the result holds one entry per distinct
/// `(url, href)` pair, so a URL linked both relatively and absolutely appears
/// twice with different hrefs.
///
/// # Arguments
///
/// * `base_url` - URL of the page the body was fetched from
/// * `html` - The HTML body
pub fn extract_candidates(base_url: &str, html: &str) -> BTreeSet<LinkCandidate> {
    extract_hrefs(html)
        .into_iter()
        .filter_map(|href| {
            resolve_href(base_url, &href).map(|url| LinkCandidate { url, href })
        })
        .collect()
}

/// Extracts the set of absolute URLs linked from a page
///
/// # Example
///
/// ```
/// use site_sweep::crawler::extract_links;
///
/// let html = r#"<a href="../c">C</a><a href="mailto:x@example.com">mail</a>"#;
/// let links = extract_links("http://example.com/a/b.html", html);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("http://example.com/c"));
/// ```
pub fn extract_links(base_url: &str, html: &str) -> BTreeSet<String> {
    extract_candidates(base_url, html)
        .into_iter()
        .map(|candidate| candidate.url)
        .collect()
}

/// Resolves one href against the URL of the page it was found on
///
/// Rules, in priority order:
///
/// | href | Result |
/// |------|--------|
/// | empty or `#...` | the page URL itself |
/// | `http://...`, `https://...` | used as-is |
/// | any other `scheme:` | discarded |
/// | `//host/...` | page scheme + href |
/// | `/...` | page scheme + host + href |
/// | `../...` | one directory up per occurrence, then the remainder |
/// | anything else | joined to the page directory |
///
/// The page directory is the page path itself when its last segment has no
/// file extension, and the parent of that segment otherwise.
///
/// Returns `None` when the href is discarded or the base URL is unusable.
pub fn resolve_href(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let base = Url::parse(base_url).ok()?;
    let host = base.host_str()?;

    if href.is_empty() || href.starts_with('#') {
        return Some(base_url.trim().to_string());
    }

    if has_http_scheme(href) {
        return Some(href.to_string());
    }

    if has_scheme(href) {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("{}://{}", base.scheme(), rest));
    }

    let origin = match base.port() {
        Some(port) => format!("{}://{}:{}", base.scheme(), host, port),
        None => format!("{}://{}", base.scheme(), host),
    };

    if href.starts_with('/') {
        return Some(format!("{}{}", origin, href));
    }

    let mut directory = page_directory(base.path());
    let mut rest = href;
    loop {
        if let Some(stripped) = rest.strip_prefix("../") {
            directory.pop();
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if rest == ".." {
            directory.pop();
            rest = "";
        } else if rest == "." {
            rest = "";
        } else {
            break;
        }
    }

    let mut resolved = origin;
    resolved.push('/');
    for segment in &directory {
        resolved.push_str(segment);
        resolved.push('/');
    }
    resolved.push_str(rest);
    Some(resolved)
}

/// Directory segments a relative href is joined to
fn page_directory(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.last().is_some_and(|last| last.contains('.')) {
        segments.pop();
    }

    segments
}

/// Returns true if the href starts with `scheme:` (RFC 3986 scheme characters)
fn has_scheme(href: &str) -> bool {
    match href.find(':') {
        Some(idx) if idx > 0 => {
            let scheme = &href[..idx];
            scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
