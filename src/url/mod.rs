//! URL handling module for Site-Sweep
//!
//! This module provides canonical keys, public-suffix domain splitting,
//! skip / hardcoded policy matching, and internal/external classification.

mod domain;
mod matcher;
mod normalize;

use crate::config::Config;
use crate::{SweepError, UrlResult};
use std::collections::BTreeSet;

// Re-export main functions
pub use domain::DomainParts;
pub(crate) use matcher::has_http_scheme;
pub use matcher::{is_hardcoded, is_skipped};
pub use normalize::{canonicalize, CanonicalUrl};

/// Classification of a URL relative to the crawl's base domain and policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Classification {
    /// The registered domain does not contain the base domain
    pub external: bool,
    /// Matched a skip domain or skip segment: recorded, never fetched
    pub skip: bool,
}

/// Classifies a URL against a base domain and the skip lists
///
/// `external` is true when `base_domain` is not a substring of the URL's
/// registered domain (`domain.suffix`). `skip` follows [`is_skipped`].
///
/// # Examples
///
/// ```
/// use site_sweep::url::classify;
///
/// let skip = vec!["blog.example.com".to_string()];
/// let c = classify("http://blog.example.com/post", "example.com", &skip, &[]).unwrap();
/// assert!(!c.external);
/// assert!(c.skip);
///
/// let c = classify("http://other.com/", "example.com", &skip, &[]).unwrap();
/// assert!(c.external);
/// ```
pub fn classify(
    url: &str,
    base_domain: &str,
    skip_domains: &[String],
    skip_segments: &[String],
) -> UrlResult<Classification> {
    let parts = DomainParts::from_url(url)?;

    Ok(Classification {
        external: !parts.registered().contains(base_domain),
        skip: is_skipped(url, &parts, skip_domains, skip_segments),
    })
}

/// Everything the crawl needs to judge a URL, derived once per crawl
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    /// Registered domain of the seed URL
    pub base_domain: String,
    pub skip_domains: Vec<String>,
    pub skip_segments: Vec<String>,
    pub hardcoded_domains: Vec<String>,
    pub hardcoded_exclusions: Vec<String>,
    /// Status codes that mark a page as an error page
    pub error_codes: BTreeSet<i32>,
}

impl CrawlPolicy {
    /// Builds the policy for a crawl seeded at `config.crawler.start_url`
    ///
    /// Fails with [`SweepError::InvalidSeed`] when the seed cannot be classified.
    pub fn from_config(config: &Config) -> Result<Self, SweepError> {
        let seed = &config.crawler.start_url;
        let parts = DomainParts::from_url(seed).map_err(|e| SweepError::InvalidSeed {
            url: seed.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_domain: parts.registered(),
            skip_domains: config.policy.skip_domains.clone(),
            skip_segments: config.policy.skip_segments.clone(),
            hardcoded_domains: config.policy.hardcoded_domains.clone(),
            hardcoded_exclusions: config.policy.hardcoded_exclusions.clone(),
            error_codes: config.policy.error_codes.iter().copied().collect(),
        })
    }

    /// Classifies a URL against this crawl's base domain and skip lists
    pub fn classify(&self, url: &str) -> UrlResult<Classification> {
        classify(
            url,
            &self.base_domain,
            &self.skip_domains,
            &self.skip_segments,
        )
    }

    /// Checks a raw href against the hardcoded-domain policy
    pub fn is_hardcoded(&self, href: &str) -> bool {
        is_hardcoded(href, &self.hardcoded_domains, &self.hardcoded_exclusions)
    }

    /// Returns true if the URL's registered domain lies outside the crawl
    ///
    /// Unparseable URLs count as external.
    pub fn is_external(&self, url: &str) -> bool {
        DomainParts::from_url(url)
            .map(|parts| !parts.registered().contains(&self.base_domain))
            .unwrap_or(true)
    }

    /// Returns true if the status code is one of the configured error codes
    pub fn is_error_code(&self, code: i32) -> bool {
        self.error_codes.contains(&code)
    }
}
