//! Crawler module: the crawl core
//!
//! This module contains the core crawling logic, including:
//! - Link extraction from fetched HTML
//! - The `HttpBackend` capability and its reqwest implementation
//! - The per-page fetch state machine (HEAD, conditional GET, extraction)
//! - The frontier (pending / in-flight / done) with deduplication
//! - Bounded-concurrency scheduling and quiescence detection

mod fetcher;
mod frontier;
mod parser;
mod pipeline;
mod report;
mod scheduler;

pub use fetcher::{build_http_client, FetchError, HttpBackend, HttpResponse, ReqwestBackend};
pub use frontier::{Frontier, FrontierContents, FrontierCounts};
pub use parser::{extract_candidates, extract_hrefs, extract_links, resolve_href, LinkCandidate};
pub use pipeline::{FetchOutcome, FetchPipeline};
pub use report::CrawlReport;
pub use scheduler::{crawl, Crawl};
