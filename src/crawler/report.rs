use crate::state::Page;
use crate::url::{canonicalize, CanonicalUrl};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Result of one crawl: the final done set plus what was recorded but never fetched
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Seed URL as given
    pub start_url: String,

    /// Registered domain that bounded the crawl
    pub base_domain: String,

    /// Every finalized page, keyed by canonical URL
    pub pages: BTreeMap<CanonicalUrl, Page>,

    /// Policy-excluded pages (skip domains / skip segments)
    pub skipped: BTreeMap<CanonicalUrl, Page>,

    /// Pages still pending or in flight when the crawl stopped
    pub unfinished: usize,

    /// The crawl was stopped by cancellation rather than quiescence
    pub cancelled: bool,

    /// Sitemap passes that ran
    pub sitemap_passes: u32,

    /// Status codes treated as errors for this crawl
    pub error_codes: BTreeSet<i32>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Looks a page up by any URL that canonicalizes to its key
    pub fn page(&self, url: &str) -> Option<&Page> {
        let key = canonicalize(url);
        self.pages.get(&key).or_else(|| self.skipped.get(&key))
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Pages that were classified external or redirected off-site
    pub fn external_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values().filter(|p| p.is_external_page())
    }

    pub fn internal_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values().filter(|p| !p.is_external_page())
    }
}
