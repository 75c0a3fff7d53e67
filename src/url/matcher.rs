use crate::config::ALL_DOMAINS;
use crate::url::{canonicalize, DomainParts};

/// Checks whether a URL falls under the skip policy
///
/// A URL is skipped when its full host exactly matches an entry of
/// `skip_domains`, or when any of `skip_segments` occurs in the URL's
/// canonical key with a `/` appended. Matching on the key makes `/blog` and
/// `/blog/` fall under the same decision whichever is seen first.
///
/// # Examples
///
/// ```
/// use site_sweep::url::{is_skipped, DomainParts};
///
/// let url = "http://example.com/blog/hello";
/// let parts = DomainParts::from_url(url).unwrap();
/// assert!(is_skipped(url, &parts, &[], &["/blog/".to_string()]));
/// ```
pub fn is_skipped(
    url: &str,
    parts: &DomainParts,
    skip_domains: &[String],
    skip_segments: &[String],
) -> bool {
    let host = parts.full_host();
    if skip_domains.iter().any(|d| d.eq_ignore_ascii_case(&host)) {
        return true;
    }

    let key = format!("{}/", canonicalize(url));
    skip_segments
        .iter()
        .any(|segment| key.contains(segment.as_str()))
}

/// Returns true if the href starts with `http://` or `https://`, in any case
pub(crate) fn has_http_scheme(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Checks whether a raw href is a hardcoded absolute link
///
/// The href must be absolute (`http://` or `https://`), its full host must be
/// listed in `hardcoded_domains` (or the list contains `all`), and the raw href
/// must not contain any of `exclusions`.
pub fn is_hardcoded(href: &str, hardcoded_domains: &[String], exclusions: &[String]) -> bool {
    let href = href.trim();
    if !has_http_scheme(href) {
        return false;
    }

    if exclusions
        .iter()
        .any(|exclusion| href.contains(exclusion.as_str()))
    {
        return false;
    }

    if hardcoded_domains.iter().any(|d| d == ALL_DOMAINS) {
        return true;
    }

    match DomainParts::from_url(href) {
        Ok(parts) => {
            let host = parts.full_host();
            hardcoded_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&host))
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skip_domain_exact_match() {
        let url = "http://blog.example.com/post";
        let parts = DomainParts::from_url(url).unwrap();
        assert!(is_skipped(url, &parts, &strings(&["blog.example.com"]), &[]));
    }

    #[test]
    fn test_skip_domain_is_not_suffix_match() {
        let url = "http://www.blog.example.com/post";
        let parts = DomainParts::from_url(url).unwrap();
        assert!(!is_skipped(url, &parts, &strings(&["blog.example.com"]), &[]));

        let url = "http://example.com/post";
        let parts = DomainParts::from_url(url).unwrap();
        assert!(!is_skipped(url, &parts, &strings(&["blog.example.com"]), &[]));
    }

    #[test]
    fn test_skip_segment_substring() {
        let url = "http://example.com/blog/2010/09/01/survey";
        let parts = DomainParts::from_url(url).unwrap();
        assert!(is_skipped(url, &parts, &[], &strings(&["/blog/"])));
        assert!(!is_skipped(url, &parts, &[], &strings(&["/news/"])));
    }

    #[test]
    fn test_skip_segment_ignores_trailing_slash() {
        let segments = strings(&["/blog/"]);
        for url in ["http://example.com/blog", "http://example.com/blog/", "HTTPS://example.com/blog"] {
            let parts = DomainParts::from_url(url).unwrap();
            assert!(is_skipped(url, &parts, &[], &segments), "{}", url);
        }

        let url = "http://example.com/blogroll";
        let parts = DomainParts::from_url(url).unwrap();
        assert!(!is_skipped(url, &parts, &[], &segments));
    }

    #[test]
    fn test_hardcoded_listed_host() {
        let domains = strings(&["www.example.com"]);
        assert!(is_hardcoded("http://www.example.com/pricing", &domains, &[]));
        assert!(is_hardcoded("https://www.example.com/pricing", &domains, &[]));
        assert!(!is_hardcoded("http://other.com/pricing", &domains, &[]));
    }

    #[test]
    fn test_hardcoded_scheme_is_case_insensitive() {
        let domains = strings(&["www.example.com"]);
        assert!(is_hardcoded("HTTP://www.example.com/pricing", &domains, &[]));
        assert!(is_hardcoded("Https://WWW.Example.com/pricing", &domains, &[]));
        assert!(has_http_scheme("hTtP://x"));
        assert!(!has_http_scheme("ftp://x"));
    }

    #[test]
    fn test_relative_href_never_hardcoded() {
        let domains = strings(&["all"]);
        assert!(!is_hardcoded("/pricing", &domains, &[]));
        assert!(!is_hardcoded("pricing.html", &domains, &[]));
        assert!(!is_hardcoded("//www.example.com/pricing", &domains, &[]));
    }

    #[test]
    fn test_all_wildcard() {
        let domains = strings(&["all"]);
        assert!(is_hardcoded("http://anything.org/x", &domains, &[]));
    }

    #[test]
    fn test_exclusions_apply() {
        let domains = strings(&["www.example.com"]);
        let exclusions = strings(&["/wp-content/"]);
        assert!(!is_hardcoded(
            "http://www.example.com/wp-content/logo.png",
            &domains,
            &exclusions
        ));
        assert!(is_hardcoded(
            "http://www.example.com/about",
            &domains,
            &exclusions
        ));

        // Exclusions also apply under the wildcard
        let all = strings(&["all"]);
        assert!(!is_hardcoded(
            "http://www.example.com/wp-content/logo.png",
            &all,
            &exclusions
        ));
    }

    #[test]
    fn test_empty_list_never_hardcoded() {
        assert!(!is_hardcoded("http://www.example.com/", &[], &[]));
    }
}
