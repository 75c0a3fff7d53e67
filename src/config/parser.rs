use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads, parses and validates the configuration file at `path`
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex SHA-256 of configuration text, used to tie reports to the config that produced them
pub fn hash_config(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration and hashes the exact text that was parsed
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_config(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;

    const FULL: &str = r#"
[crawler]
start-url = "http://www.example.com/"
sitemap-url = "http://www.example.com/sitemap.xml"
max-concurrency = 40
request-timeout = 20
idle-threshold = 5

[user-agent]
crawler-name = "TestSweep"
crawler-version = "2.1"
contact-url = "https://example.com/about"

[policy]
skip-domains = ["blog.example.com"]
skip-segments = ["/blog/"]
hardcoded-domains = ["www.example.com"]
hardcoded-exclusions = ["/wp-content/"]
error-codes = [404, 500]

[output]
report-dir = "./out"
summary-path = "./out/summary.md"

[browser]
program = "/usr/bin/phantomjs"
script = "single_url_invoker.js"
"#;

    #[test]
    fn test_parse_every_section() {
        let config = parse_config(FULL).unwrap();

        assert_eq!(config.crawler.start_url, "http://www.example.com/");
        assert_eq!(
            config.crawler.sitemap_url.as_deref(),
            Some("http://www.example.com/sitemap.xml")
        );
        assert_eq!(config.crawler.max_concurrency, 40);
        assert_eq!(config.crawler.request_timeout, 20);
        assert_eq!(config.crawler.max_redirects, 10);
        assert_eq!(config.user_agent.header_value(), "TestSweep/2.1 (+https://example.com/about)");
        assert_eq!(config.policy.skip_domains, vec!["blog.example.com"]);
        assert_eq!(config.policy.error_codes, vec![404, 500]);
        assert_eq!(config.output.report_dir, "./out");

        let browser = config.browser.unwrap();
        assert_eq!(browser.timeout, 900);
        assert_eq!(browser.workers, 3);
    }

    #[test]
    fn test_start_url_alone_is_enough() {
        let config = parse_config("[crawler]\nstart-url = \"https://example.com/\"\n").unwrap();

        assert_eq!(config.crawler.max_concurrency, 50);
        assert_eq!(config.crawler.request_timeout, 30);
        assert_eq!(config.crawler.sitemap_passes, 2);
        assert_eq!(config.policy.error_codes, vec![404, 500, 403]);
        assert_eq!(config.user_agent.crawler_name, "SiteSweep");
        assert!(config.browser.is_none());
    }

    #[test]
    fn test_missing_start_url_is_a_parse_error() {
        let err = parse_config("[crawler]\nmax-concurrency = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_value_fails_validation() {
        let err = parse_config("[crawler]\nstart-url = \"https://example.com/\"\nmax-concurrency = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/sweep.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_hash_matches_loaded_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.toml");
        std::fs::write(&path, FULL).unwrap();

        let (config, hash) = load_config_with_hash(&path).unwrap();
        assert_eq!(config.crawler.max_concurrency, 40);
        assert_eq!(hash, hash_config(FULL));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_config("[crawler]\n"));
    }
}
