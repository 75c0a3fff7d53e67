use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, PolicyConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Wildcard entry in `hardcoded-domains` meaning every absolute link
pub const ALL_DOMAINS: &str = "all";

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_policy_config(&config.policy)?;
    validate_output_config(&config.output)?;
    if let Some(browser) = &config.browser {
        validate_browser_config(browser)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_http_url("start_url", &config.start_url)?;

    if let Some(sitemap) = &config.sitemap_url {
        validate_http_url("sitemap_url", sitemap)?;
    }

    if config.max_concurrency < 1 || config.max_concurrency > 500 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 500, got {}",
            config.max_concurrency
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.idle_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "idle_threshold must be >= 1, got {}",
            config.idle_threshold
        )));
    }

    if config.sitemap_passes > 2 {
        return Err(ConfigError::Validation(format!(
            "sitemap_passes must be at most 2, got {}",
            config.sitemap_passes
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the skip / hardcoded / error-code policy
fn validate_policy_config(config: &PolicyConfig) -> ConfigResult<()> {
    for domain in &config.skip_domains {
        validate_domain_string(domain)?;
    }

    for domain in &config.hardcoded_domains {
        if domain != ALL_DOMAINS {
            validate_domain_string(domain)?;
        }
    }

    if config.skip_segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "skip_segments cannot contain empty strings".to_string(),
        ));
    }

    if config
        .hardcoded_exclusions
        .iter()
        .any(|s| s.is_empty())
    {
        return Err(ConfigError::Validation(
            "hardcoded_exclusions cannot contain empty strings".to_string(),
        ));
    }

    for code in &config.error_codes {
        if !(100..=599).contains(code) {
            return Err(ConfigError::Validation(format!(
                "error_codes must be HTTP status codes (100-599), got {}",
                code
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report_dir cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> ConfigResult<()> {
    if config.program.trim().is_empty() || config.script.trim().is_empty() {
        return Err(ConfigError::Validation(
            "browser program and script must both be set".to_string(),
        ));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "browser timeout must be at least 1 second".to_string(),
        ));
    }

    if config.workers == 0 {
        return Err(ConfigError::Validation(
            "browser workers must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a URL parses with an http(s) scheme and a host
fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use the http or https scheme",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

/// Validates a host string used in the policy lists
///
/// Every dot-separated label must be non-empty, alphanumeric or `-`, and may
/// not begin or end with `-`.
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    let bad_label = domain.split('.').find(|label| {
        label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });

    match bad_label {
        Some(label) => Err(ConfigError::InvalidPattern(format!(
            "'{}' is not a valid host (bad label '{}')",
            domain, label
        ))),
        None => Ok(()),
    }
}
