use crate::{UrlError, UrlResult};
use url::{Host, Url};

/// A host split into `{subdomain, domain, suffix}` by public-suffix rules
///
/// For `blog.example.co.uk` this is `{"blog", "example", "co.uk"}`.
/// IP literals and single-label hosts (e.g. `localhost`) carry the whole host
/// in `domain` with empty `subdomain` and `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// Splits a host name (already stripped of scheme and port)
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('.').to_lowercase();

        if host.parse::<std::net::IpAddr>().is_ok() || !host.contains('.') {
            return Self::opaque(host);
        }

        let registrable = match psl::domain_str(&host) {
            Some(registrable) => registrable.to_string(),
            // The host is itself a public suffix
            None => return Self::opaque(host),
        };

        let suffix = psl::suffix_str(&host).unwrap_or("").to_string();
        let domain = registrable
            .strip_suffix(&suffix)
            .map(|d| d.trim_end_matches('.'))
            .unwrap_or(registrable.as_str())
            .to_string();
        let subdomain = host
            .strip_suffix(&registrable)
            .map(|s| s.trim_end_matches('.'))
            .unwrap_or("")
            .to_string();

        Self {
            subdomain,
            domain,
            suffix,
        }
    }

    /// Parses a URL and splits its host
    ///
    /// # Examples
    ///
    /// ```
    /// use site_sweep::url::DomainParts;
    ///
    /// let parts = DomainParts::from_url("http://blog.example.com/post").unwrap();
    /// assert_eq!(parts.subdomain, "blog");
    /// assert_eq!(parts.registered(), "example.com");
    /// assert_eq!(parts.full_host(), "blog.example.com");
    /// ```
    pub fn from_url(url: &str) -> UrlResult<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                parsed.scheme()
            )));
        }

        match parsed.host() {
            Some(Host::Domain(name)) => Ok(Self::from_host(name)),
            Some(Host::Ipv4(addr)) => Ok(Self::opaque(addr.to_string())),
            Some(Host::Ipv6(addr)) => Ok(Self::opaque(addr.to_string())),
            None => Err(UrlError::MissingDomain),
        }
    }

    /// Registered domain: `domain.suffix`
    pub fn registered(&self) -> String {
        if self.suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }

    /// Host as matched against policy lists: `subdomain.domain.suffix`,
    /// or `domain.suffix` when there is no subdomain
    pub fn full_host(&self) -> String {
        if self.subdomain.is_empty() {
            self.registered()
        } else {
            format!("{}.{}", self.subdomain, self.registered())
        }
    }

    fn opaque(host: String) -> Self {
        Self {
            subdomain: String::new(),
            domain: host,
            suffix: String::new(),
        }
    }
}
