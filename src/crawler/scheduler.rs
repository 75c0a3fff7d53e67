//! Crawler scheduler: bounded concurrency and quiescence detection
//!
//! This module handles:
//! - The per-invocation `Crawl` context (configuration, policy, frontier, pipeline)
//! - Global concurrency limiting via a semaphore
//! - Dispatching fetch pipelines and settling their results into the frontier
//! - Sitemap seeding (initial pass plus one refresh pass at first quiescence)
//! - Idle-counter termination and cancellation

use crate::config::{validate, Config};
use crate::crawler::fetcher::{HttpBackend, ReqwestBackend};
use crate::crawler::frontier::Frontier;
use crate::crawler::pipeline::FetchPipeline;
use crate::crawler::report::CrawlReport;
use crate::sitemap::{default_sitemap_url, HttpSitemapSource, SitemapSource};
use crate::state::Page;
use crate::url::{CanonicalUrl, CrawlPolicy};
use crate::{Result, SweepError};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one settled fetch task: children newly added to the frontier
type TaskResult = Result<usize>;

/// One crawl invocation
///
/// Holds everything a crawl mutates or consults, so independent crawls can run
/// side by side in one process.
pub struct Crawl {
    config: Arc<Config>,
    policy: Arc<CrawlPolicy>,
    frontier: Arc<Frontier>,
    pipeline: Arc<FetchPipeline>,
    sitemap: Arc<dyn SitemapSource>,
    cancel: CancellationToken,
}

impl Crawl {
    /// Creates a crawl that talks HTTP through reqwest
    ///
    /// # Errors
    ///
    /// * `SweepError::InvalidSeed` - The start URL cannot be classified
    /// * `SweepError::Reqwest` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let backend = Arc::new(ReqwestBackend::new(&config)?);
        let sitemap = Arc::new(HttpSitemapSource::new(&config)?);
        Self::with_backends(config, backend, sitemap)
    }

    /// Creates a crawl over caller-supplied HTTP and sitemap collaborators
    ///
    /// # Errors
    ///
    /// * `SweepError::InvalidSeed` - The start URL cannot be classified
    /// * `SweepError::Config` - A configuration value is out of range
    pub fn with_backends(
        config: Config,
        backend: Arc<dyn HttpBackend>,
        sitemap: Arc<dyn SitemapSource>,
    ) -> Result<Self> {
        let policy = Arc::new(CrawlPolicy::from_config(&config)?);
        validate(&config)?;
        let pipeline = Arc::new(FetchPipeline::new(backend, Arc::clone(&policy)));

        Ok(Self {
            config: Arc::new(config),
            policy,
            frontier: Arc::new(Frontier::new()),
            pipeline,
            sitemap,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the crawl when cancelled
    ///
    /// No new pages are dispatched after cancellation; in-flight fetches run to
    /// their (timeout-bounded) end and are still reported.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn policy(&self) -> &CrawlPolicy {
        &self.policy
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Sitemap location: configured, or `/sitemap.xml` on the seed's host
    fn sitemap_url(&self) -> Option<String> {
        self.config
            .crawler
            .sitemap_url
            .clone()
            .or_else(|| default_sitemap_url(&self.config.crawler.start_url))
    }

    /// Drives the crawl until the frontier stays quiescent or the crawl is cancelled
    pub async fn run(self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        let crawler = &self.config.crawler;

        let seed_key = self.offer_seed()?;
        info!(
            "Starting crawl of {} (base domain {}, concurrency {})",
            crawler.start_url, self.policy.base_domain, crawler.max_concurrency
        );

        let mut passes = 0;
        if passes < crawler.sitemap_passes {
            passes += 1;
            self.seed_from_sitemap(&seed_key, passes).await;
        }

        let semaphore = Arc::new(Semaphore::new(crawler.max_concurrency as usize));
        let poll_interval = Duration::from_millis(crawler.idle_poll_interval);
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let mut progress = Progress::new(crawler.progress_interval);
        let mut idle_cycles = 0u32;
        let mut last_generation = self.frontier.generation();

        loop {
            self.reap(&mut tasks, &mut progress)?;

            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            if let Some(page) = self.frontier.take() {
                idle_cycles = 0;
                self.dispatch(&mut tasks, page, permit);
                continue;
            }
            drop(permit);

            let generation = self.frontier.generation();
            if self.frontier.is_quiescent() && generation == last_generation {
                idle_cycles += 1;
            } else {
                idle_cycles = 0;
            }
            last_generation = generation;

            if idle_cycles > crawler.idle_threshold {
                if passes < crawler.sitemap_passes {
                    passes += 1;
                    self.seed_from_sitemap(&seed_key, passes).await;
                    idle_cycles = 0;
                    last_generation = self.frontier.generation();
                    continue;
                }

                info!("Frontier quiescent for {} polls, crawl complete", idle_cycles);
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            warn!(
                "Crawl cancelled, waiting for {} in-flight fetches",
                tasks.len()
            );
        }
        while let Some(joined) = tasks.join_next().await {
            joined??;
            progress.record(&self.frontier);
        }

        let contents = self.frontier.drain();
        let report = CrawlReport {
            start_url: crawler.start_url.clone(),
            base_domain: self.policy.base_domain.clone(),
            pages: contents.done,
            skipped: contents.skipped,
            unfinished: contents.unfinished,
            cancelled,
            sitemap_passes: passes,
            error_codes: self.policy.error_codes.clone(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Crawl finished: {} pages, {} skipped, {} unfinished in {:.1}s",
            report.pages.len(),
            report.skipped.len(),
            report.unfinished,
            progress.elapsed().as_secs_f64()
        );

        Ok(report)
    }

    fn offer_seed(&self) -> Result<CanonicalUrl> {
        let start_url = &self.config.crawler.start_url;
        let classification =
            self.policy
                .classify(start_url)
                .map_err(|e| SweepError::InvalidSeed {
                    url: start_url.clone(),
                    reason: e.to_string(),
                })?;

        let seed = Page::new(start_url, classification);
        let key = seed.key.clone();
        if seed.skip {
            warn!("Start URL {} matches the skip policy, nothing to crawl", start_url);
            self.frontier.record_skipped(seed);
        } else {
            self.frontier.offer(seed);
        }
        Ok(key)
    }

    /// Offers every sitemap URL with the seed as synthetic parent
    ///
    /// # Returns
    ///
    /// Number of pages newly added to `pending`
    async fn seed_from_sitemap(&self, seed_key: &CanonicalUrl, pass: u32) -> usize {
        let Some(sitemap_url) = self.sitemap_url() else {
            warn!("No sitemap location for {}", self.config.crawler.start_url);
            return 0;
        };

        let urls = self.sitemap.urls(&sitemap_url).await;
        let mut added = 0;

        for raw in &urls {
            let classification = match self.policy.classify(raw) {
                Ok(classification) => classification,
                Err(e) => {
                    debug!("Ignoring sitemap entry {}: {}", raw, e);
                    continue;
                }
            };

            let page = Page::discovered(raw, seed_key, classification, false);
            if page.skip {
                self.frontier.record_skipped(page);
            } else if self.frontier.offer(page) {
                added += 1;
            }
        }

        info!(
            "Sitemap pass {} ({}): {} URLs listed, {} new",
            pass,
            sitemap_url,
            urls.len(),
            added
        );
        added
    }

    fn dispatch(&self, tasks: &mut JoinSet<TaskResult>, page: Page, permit: OwnedSemaphorePermit) {
        let pipeline = Arc::clone(&self.pipeline);
        let frontier = Arc::clone(&self.frontier);
        let cancel = self.cancel.clone();

        tasks.spawn(async move {
            let outcome = pipeline.run(page, &cancel).await;
            if outcome.stage.is_failure() {
                debug!(
                    "{} finished at {}: {}",
                    outcome.page.key, outcome.stage, outcome.page.failure_message
                );
            }
            let added = frontier.settle(outcome.page, outcome.children);
            drop(permit);
            added
        });
    }

    /// Collects finished tasks without waiting; surfaces panics and invariant violations
    fn reap(&self, tasks: &mut JoinSet<TaskResult>, progress: &mut Progress) -> Result<()> {
        while let Some(joined) = tasks.try_join_next() {
            joined??;
            progress.record(&self.frontier);
        }
        Ok(())
    }
}

/// Periodic progress logging
struct Progress {
    interval: u64,
    completed: u64,
    started: Instant,
}

impl Progress {
    fn new(interval: u64) -> Self {
        Self {
            interval,
            completed: 0,
            started: Instant::now(),
        }
    }

    fn record(&mut self, frontier: &Frontier) {
        self.completed += 1;

        if self.interval > 0 && self.completed % self.interval == 0 {
            let counts = frontier.counts();
            let rate = self.completed as f64 / self.elapsed().as_secs_f64().max(f64::EPSILON);
            info!(
                "Progress: {} pages done, {} pending, {} in flight, {:.2} pages/sec",
                counts.done, counts.pending, counts.in_flight, rate
            );
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Runs a complete crawl with the reqwest backend and HTTP sitemap source
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl reached quiescence
/// * `Err(SweepError)` - The seed was invalid or a frontier invariant broke
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    Crawl::new(config)?.run().await
}
