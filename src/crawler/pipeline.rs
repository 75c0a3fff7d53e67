//! Per-page fetch state machine
//!
//! ```text
//! New -> HeadSent -> {HeadOk, HeadFailed} -> (conditionally) GetSent -> {GetOk, GetFailed} -> Finalized
//! ```
//!
//! One linear async function per page. The only suspension points are the
//! HEAD and GET requests. Every failure is recorded on the page; nothing here
//! returns an error to the scheduler.

use crate::crawler::fetcher::{FetchError, HttpBackend, HttpResponse};
use crate::crawler::parser::extract_candidates;
use crate::state::{FetchStage, Page, NO_RESPONSE};
use crate::url::{CanonicalUrl, CrawlPolicy};
use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A finalized page together with the pages discovered on it
#[derive(Debug)]
pub struct FetchOutcome {
    pub page: Page,

    /// Discovered pages, one per canonical key, each carrying this page as parent
    pub children: Vec<Page>,

    /// Last stage reached before `Finalized`
    pub stage: FetchStage,
}

/// Runs the HEAD / conditional GET / extraction sequence for one page
pub struct FetchPipeline {
    backend: Arc<dyn HttpBackend>,
    policy: Arc<CrawlPolicy>,
}

/// Tracks the current stage and enforces legal transitions
struct StageTracker<'a> {
    key: &'a CanonicalUrl,
    current: FetchStage,
    last_before_final: FetchStage,
}

impl<'a> StageTracker<'a> {
    fn new(key: &'a CanonicalUrl) -> Self {
        Self {
            key,
            current: FetchStage::New,
            last_before_final: FetchStage::New,
        }
    }

    fn advance(&mut self, next: FetchStage) {
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal fetch transition {} -> {}",
            self.current,
            next
        );
        trace!("{}: {} -> {}", self.key, self.current, next);
        if next == FetchStage::Finalized {
            self.last_before_final = self.current;
        }
        self.current = next;
    }
}

impl FetchPipeline {
    pub fn new(backend: Arc<dyn HttpBackend>, policy: Arc<CrawlPolicy>) -> Self {
        Self { backend, policy }
    }

    /// Drives one page to `Finalized`
    ///
    /// # Arguments
    ///
    /// * `page` - The page taken from the frontier; owned until returned
    /// * `cancel` - Crawl cancellation; when set after HEAD, the GET is skipped
    pub async fn run(&self, mut page: Page, cancel: &CancellationToken) -> FetchOutcome {
        let key = page.key.clone();
        let mut stage = StageTracker::new(&key);
        let mut children = Vec::new();

        if page.skip {
            debug!("Skipping {} (policy)", page.key);
            stage.advance(FetchStage::Finalized);
            return Self::outcome(page, children, stage);
        }

        // ===== HEAD =====
        stage.advance(FetchStage::HeadSent);
        match self.backend.head(&page.raw_url).await {
            Ok(response) => {
                self.record_head(&mut page, &response);
                let code = i32::from(response.status);

                if self.policy.is_error_code(code) {
                    page.failure_message = status_message(response.status);
                    stage.advance(FetchStage::HeadOk);
                    debug!("{} is an error page ({})", page.key, code);
                    stage.advance(FetchStage::Finalized);
                    return Self::outcome(page, children, stage);
                }

                if response.status >= 400 {
                    page.failure_message = status_message(response.status);
                    stage.advance(FetchStage::HeadFailed);
                    stage.advance(FetchStage::Finalized);
                    return Self::outcome(page, children, stage);
                }

                stage.advance(FetchStage::HeadOk);
            }
            Err(e) => {
                Self::record_failure(&mut page, &e);
                stage.advance(FetchStage::HeadFailed);
                stage.advance(FetchStage::Finalized);
                return Self::outcome(page, children, stage);
            }
        }

        if page.is_external_page() || !page.is_html() {
            stage.advance(FetchStage::Finalized);
            return Self::outcome(page, children, stage);
        }

        if cancel.is_cancelled() {
            debug!("Crawl cancelled, not fetching body of {}", page.key);
            stage.advance(FetchStage::Finalized);
            return Self::outcome(page, children, stage);
        }

        // ===== GET =====
        stage.advance(FetchStage::GetSent);
        match self.backend.get(&page.raw_url).await {
            Ok(response) if response.status >= 400 => {
                page.response_code = i32::from(response.status);
                page.failure_message = status_message(response.status);
                stage.advance(FetchStage::GetFailed);
            }
            Ok(response) => {
                page.response_code = i32::from(response.status);
                stage.advance(FetchStage::GetOk);
                let body = response.body.unwrap_or_default();
                children = self.expand(&mut page, &response.effective_url, &body);
                debug!("{}: {} links", page.key, children.len());
            }
            Err(e) => {
                Self::record_failure(&mut page, &e);
                stage.advance(FetchStage::GetFailed);
            }
        }

        stage.advance(FetchStage::Finalized);
        Self::outcome(page, children, stage)
    }

    fn outcome(page: Page, children: Vec<Page>, stage: StageTracker<'_>) -> FetchOutcome {
        FetchOutcome {
            page,
            children,
            stage: stage.last_before_final,
        }
    }

    fn record_head(&self, page: &mut Page, response: &HttpResponse) {
        page.response_code = i32::from(response.status);
        page.content_type = response.content_type.clone();

        if !response.effective_url.is_empty()
            && crate::url::canonicalize(&response.effective_url) != page.key
        {
            page.effective_url = Some(response.effective_url.clone());
            if !page.external && self.policy.is_external(&response.effective_url) {
                debug!(
                    "{} redirected outside the site to {}",
                    page.key, response.effective_url
                );
                page.redirected_external = true;
            }
        }
    }

    fn record_failure(page: &mut Page, error: &FetchError) {
        page.response_code = NO_RESPONSE;
        page.failure_message = error.to_string();
        debug!("{} failed: {}", page.key, error);
    }

    /// Turns a fetched body into child pages and records them on `page`
    fn expand(&self, page: &mut Page, base_url: &str, body: &str) -> Vec<Page> {
        let base_url = if base_url.is_empty() {
            page.raw_url.clone()
        } else {
            base_url.to_string()
        };

        let mut children: BTreeMap<CanonicalUrl, Page> = BTreeMap::new();

        for candidate in extract_candidates(&base_url, body) {
            let hardcoded = self.policy.is_hardcoded(&candidate.href);
            if hardcoded {
                page.hardcoded_links.insert(candidate.href.clone());
            }

            let classification = match self.policy.classify(&candidate.url) {
                Ok(classification) => classification,
                Err(e) => {
                    debug!("Dropping link {} on {}: {}", candidate.url, page.key, e);
                    continue;
                }
            };

            let child = Page::discovered(&candidate.url, &page.key, classification, hardcoded);
            if child.key == page.key {
                continue;
            }

            children
                .entry(child.key.clone())
                .and_modify(|existing| existing.hardcoded |= hardcoded)
                .or_insert(child);
        }

        page.children.extend(children.keys().cloned());
        children.into_values().collect()
    }
}

fn status_message(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}
