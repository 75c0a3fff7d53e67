//! JavaScript and broken-resource detection through a headless browser
//!
//! Runs after the crawl, never during it. The URL list is split across a few
//! browser processes; each one loads its URLs and prints one JSON object per
//! finding on stdout:
//!
//! ```text
//! {"error":"ReferenceError: $ is not defined","parent":"http://example.com/"}
//! {"broken-resource":"http://example.com/logo.png","parent":"http://example.com/"}
//! ```
//!
//! Any other output line is ignored.

use crate::config::BrowserConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

/// Errors from running the detector
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Failed to read URL list {path}: {source}")]
    UrlList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Detector worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Findings for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIssues {
    pub javascript_errors: BTreeSet<String>,
    pub broken_resources: BTreeSet<String>,
}

impl ResourceIssues {
    pub fn is_empty(&self) -> bool {
        self.javascript_errors.is_empty() && self.broken_resources.is_empty()
    }
}

/// Findings for every page that reported at least one issue
#[derive(Debug, Clone, Default)]
pub struct DetectionReport {
    /// Page URL -> findings
    pub issues: BTreeMap<String, ResourceIssues>,

    /// At least one browser process hit the timeout and was killed
    pub timed_out: bool,
}

impl DetectionReport {
    fn absorb(&mut self, other: DetectionReport) {
        for (parent, found) in other.issues {
            let entry = self.issues.entry(parent).or_default();
            entry.javascript_errors.extend(found.javascript_errors);
            entry.broken_resources.extend(found.broken_resources);
        }
        self.timed_out |= other.timed_out;
    }
}

/// One line of browser output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRecord {
    pub parent: String,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(rename = "broken-resource", default)]
    pub broken_resource: Option<String>,
}

/// Parses one stdout line; `None` for anything that is not a finding
pub fn parse_issue_line(line: &str) -> Option<IssueRecord> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }

    match serde_json::from_str::<IssueRecord>(line) {
        Ok(record) if record.error.is_some() || record.broken_resource.is_some() => Some(record),
        Ok(_) => None,
        Err(e) => {
            debug!("Skipped browser line {:?}: {}", line, e);
            None
        }
    }
}

fn record_issue(issues: &mut BTreeMap<String, ResourceIssues>, record: IssueRecord) {
    let entry = issues.entry(record.parent).or_default();
    if let Some(error) = record.error {
        entry.javascript_errors.insert(error);
    }
    if let Some(resource) = record.broken_resource {
        entry.broken_resources.insert(resource);
    }
}

/// Reads a one-URL-per-line file, skipping blank lines
pub async fn read_url_list(path: &Path) -> Result<Vec<String>, DetectorError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DetectorError::UrlList {
            path: path.display().to_string(),
            source,
        })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Batch detector for JavaScript errors and broken page resources
#[async_trait]
pub trait ResourceIssueDetector: Send + Sync {
    /// Examines every URL listed in `url_file` (one per line)
    async fn detect(&self, url_file: &Path) -> Result<DetectionReport, DetectorError>;
}

/// Runs an external browser program as `<program> <script> <url-file>`
#[derive(Debug, Clone)]
pub struct BrowserCommandDetector {
    program: PathBuf,
    script: PathBuf,
    timeout: Duration,
    workers: usize,
}

impl BrowserCommandDetector {
    pub fn new(
        program: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        timeout: Duration,
        workers: usize,
    ) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            timeout,
            workers: workers.max(1),
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(
            &config.program,
            &config.script,
            Duration::from_secs(config.timeout),
            config.workers,
        )
    }

    /// Runs one browser process over one URL file
    async fn run_worker(&self, url_file: &Path) -> Result<DetectionReport, DetectorError> {
        let mut child = Command::new(&self.program)
            .arg(&self.script)
            .arg(url_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DetectorError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "browser stdout was not captured")
        })?;

        let mut report = DetectionReport::default();
        let mut lines = BufReader::new(stdout).lines();
        let read_all = async {
            while let Some(line) = lines.next_line().await? {
                match parse_issue_line(&line) {
                    Some(record) => record_issue(&mut report.issues, record),
                    None => trace!("browser: {}", line),
                }
            }
            Ok::<_, std::io::Error>(())
        };

        match tokio::time::timeout(self.timeout, read_all).await {
            Ok(result) => {
                result?;
                child.wait().await?;
            }
            Err(_) => {
                warn!(
                    "Browser run on {} exceeded {:?}, killing it",
                    url_file.display(),
                    self.timeout
                );
                child.kill().await?;
                report.timed_out = true;
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl ResourceIssueDetector for BrowserCommandDetector {
    async fn detect(&self, url_file: &Path) -> Result<DetectionReport, DetectorError> {
        let urls = read_url_list(url_file).await?;
        if urls.is_empty() {
            return Ok(DetectionReport::default());
        }

        let chunk_size = urls.len().div_ceil(self.workers);
        let mut chunk_files = Vec::new();
        for chunk in urls.chunks(chunk_size) {
            let mut file = NamedTempFile::new()?;
            for url in chunk {
                writeln!(file, "{}", url)?;
            }
            file.flush()?;
            chunk_files.push(file);
        }

        info!(
            "Examining {} URLs with {} browser processes",
            urls.len(),
            chunk_files.len()
        );

        let mut workers = JoinSet::new();
        for file in &chunk_files {
            let detector = self.clone();
            let path = file.path().to_path_buf();
            workers.spawn(async move { detector.run_worker(&path).await });
        }

        let mut report = DetectionReport::default();
        while let Some(joined) = workers.join_next().await {
            report.absorb(joined??);
        }

        info!(
            "{} pages reported JavaScript or resource issues",
            report.issues.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_line() {
        let record =
            parse_issue_line(r#"{"error":"TypeError: x is undefined","parent":"http://example.com/"}"#)
                .unwrap();
        assert_eq!(record.parent, "http://example.com/");
        assert_eq!(record.error.as_deref(), Some("TypeError: x is undefined"));
        assert!(record.broken_resource.is_none());
    }

    #[test]
    fn test_parse_broken_resource_line() {
        let record = parse_issue_line(
            r#"{"broken-resource":"http://example.com/a.png","parent":"http://example.com/"}"#,
        )
        .unwrap();
        assert_eq!(record.broken_resource.as_deref(), Some("http://example.com/a.png"));
    }

    #[test]
    fn test_noise_lines_ignored() {
        assert!(parse_issue_line("Remaining Urls : 12 for /tmp/x").is_none());
        assert!(parse_issue_line(r#"{"parent":"http://example.com/"}"#).is_none());
        assert!(parse_issue_line(r#"{"error":"unterminated"#).is_none());
    }

    #[test]
    fn test_issues_grouped_by_parent() {
        let mut issues = BTreeMap::new();
        for line in [
            r#"{"error":"e1","parent":"http://example.com/"}"#,
            r#"{"error":"e1","parent":"http://example.com/"}"#,
            r#"{"broken-resource":"r1","parent":"http://example.com/"}"#,
            r#"{"error":"e2","parent":"http://example.com/b"}"#,
        ] {
            record_issue(&mut issues, parse_issue_line(line).unwrap());
        }

        assert_eq!(issues.len(), 2);
        let home = &issues["http://example.com/"];
        assert_eq!(home.javascript_errors.len(), 1);
        assert_eq!(home.broken_resources.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_url_list() {
        let detector = BrowserCommandDetector::new("sh", "x.js", Duration::from_secs(1), 1);
        let result = detector.detect(Path::new("/definitely/not/here.txt")).await;
        assert!(matches!(result, Err(DetectorError::UrlList { .. })));
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn write_file(content: &str) -> NamedTempFile {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(content.as_bytes()).unwrap();
            file.flush().unwrap();
            file
        }

        #[tokio::test]
        async fn test_runs_browser_per_chunk() {
            let script = write_file(
                "while read url; do\n\
                 echo \"loading $url\"\n\
                 echo \"{\\\"error\\\":\\\"boom\\\",\\\"parent\\\":\\\"$url\\\"}\"\n\
                 done < \"$1\"\n",
            );
            let urls = write_file("http://example.com/a\nhttp://example.com/b\n\nhttp://example.com/c\n");

            let detector =
                BrowserCommandDetector::new("sh", script.path(), Duration::from_secs(10), 2);
            let report = detector.detect(urls.path()).await.unwrap();

            assert!(!report.timed_out);
            assert_eq!(report.issues.len(), 3);
            assert!(report.issues["http://example.com/b"]
                .javascript_errors
                .contains("boom"));
        }

        #[tokio::test]
        async fn test_timeout_kills_browser() {
            let script = write_file("sleep 5\n");
            let urls = write_file("http://example.com/\n");

            let detector =
                BrowserCommandDetector::new("sh", script.path(), Duration::from_millis(200), 1);
            let report = detector.detect(urls.path()).await.unwrap();

            assert!(report.timed_out);
            assert!(report.issues.is_empty());
        }

        #[tokio::test]
        async fn test_missing_program() {
            let urls = write_file("http://example.com/\n");
            let detector = BrowserCommandDetector::new(
                "/nonexistent/browser",
                "x.js",
                Duration::from_secs(1),
                1,
            );
            let result = detector.detect(urls.path()).await;
            assert!(matches!(result, Err(DetectorError::Spawn { .. })));
        }
    }
}
