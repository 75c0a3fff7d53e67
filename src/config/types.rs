use serde::Deserialize;

/// Main configuration structure for Site-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub browser: Option<BrowserConfig>,
}

impl Config {
    /// Builds a configuration from defaults and a start URL alone
    pub fn with_start_url(start_url: &str) -> Self {
        Self {
            crawler: CrawlerConfig::with_start_url(start_url),
            user_agent: UserAgentConfig::default(),
            policy: PolicyConfig::default(),
            output: OutputConfig::default(),
            browser: None,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; its registered domain bounds the crawl
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Sitemap location; defaults to `<scheme>://<host>/sitemap.xml` of the seed
    #[serde(rename = "sitemap-url", default)]
    pub sitemap_url: Option<String>,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Idle polling cycles observed at quiescence before the crawl ends
    #[serde(rename = "idle-threshold", default = "default_idle_threshold")]
    pub idle_threshold: u32,

    /// Wait between frontier polls when nothing is pending (milliseconds)
    #[serde(rename = "idle-poll-interval", default = "default_idle_poll_interval")]
    pub idle_poll_interval: u64,

    /// Number of sitemap seeding passes (0 disables sitemap seeding)
    #[serde(rename = "sitemap-passes", default = "default_sitemap_passes")]
    pub sitemap_passes: u32,

    /// Completed pages between progress log lines
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl CrawlerConfig {
    pub fn with_start_url(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            sitemap_url: None,
            max_concurrency: default_max_concurrency(),
            request_timeout: default_request_timeout(),
            max_redirects: default_max_redirects(),
            idle_threshold: default_idle_threshold(),
            idle_poll_interval: default_idle_poll_interval(),
            sitemap_passes: default_sitemap_passes(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the client identifier sent with every request
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`, the contact part omitted when unset.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Domain boundary and reporting policy
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Hosts (`subdomain.domain.suffix`) that are recorded but never fetched
    #[serde(rename = "skip-domains", default)]
    pub skip_domains: Vec<String>,

    /// URL substrings (e.g. `/blog/`) that mark a page as skipped
    #[serde(rename = "skip-segments", default)]
    pub skip_segments: Vec<String>,

    /// Hosts whose absolute links should have been written as relative paths
    #[serde(rename = "hardcoded-domains", default)]
    pub hardcoded_domains: Vec<String>,

    /// Substrings that exempt an absolute href from the hardcoded check
    #[serde(rename = "hardcoded-exclusions", default)]
    pub hardcoded_exclusions: Vec<String>,

    /// HTTP status codes treated as error pages
    #[serde(rename = "error-codes", default = "default_error_codes")]
    pub error_codes: Vec<i32>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            skip_domains: Vec::new(),
            skip_segments: Vec::new(),
            hardcoded_domains: Vec::new(),
            hardcoded_exclusions: Vec::new(),
            error_codes: default_error_codes(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the plain-text report files
    #[serde(rename = "report-dir", default = "default_report_dir")]
    pub report_dir: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            summary_path: default_summary_path(),
        }
    }
}

/// Headless browser used for JavaScript/resource error detection
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable
    pub program: String,

    /// Script handed to the browser along with the URL list file
    pub script: String,

    /// Upper bound on the whole detection run (seconds)
    #[serde(default = "default_browser_timeout")]
    pub timeout: u64,

    /// Browser processes run side by side, each on a slice of the URL list
    #[serde(default = "default_browser_workers")]
    pub workers: usize,
}

fn default_max_concurrency() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_redirects() -> u32 {
    10
}

fn default_idle_threshold() -> u32 {
    10
}

fn default_idle_poll_interval() -> u64 {
    50
}

fn default_sitemap_passes() -> u32 {
    2
}

fn default_progress_interval() -> u64 {
    25
}

fn default_crawler_name() -> String {
    "SiteSweep".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_error_codes() -> Vec<i32> {
    vec![404, 500, 403]
}

fn default_report_dir() -> String {
    "./reports".to_string()
}

fn default_summary_path() -> String {
    "./reports/summary.md".to_string()
}

fn default_browser_timeout() -> u64 {
    900
}

fn default_browser_workers() -> usize {
    3
}
