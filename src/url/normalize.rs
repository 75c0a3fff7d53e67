use std::fmt;

/// Canonical key of a URL, used for page equality and deduplication
///
/// Two URLs that differ only by `http`/`https` scheme or by a trailing `/`
/// produce the same key. Path and query are otherwise kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Computes the canonical key of a URL string
///
/// # Canonicalization Steps
///
/// 1. Trim leading whitespace
/// 2. Fold the scheme: `https://` (any case) becomes `http://`
/// 3. Strip trailing `/` characters (and trailing whitespace)
///
/// The function never fails; it does not parse the URL. It is idempotent:
/// `canonicalize(canonicalize(u).as_str()) == canonicalize(u)`.
///
/// # Examples
///
/// ```
/// use site_sweep::url::canonicalize;
///
/// assert_eq!(
///     canonicalize("https://a.com/x/"),
///     canonicalize("http://a.com/x")
/// );
/// assert_eq!(canonicalize("HTTPS://a.com/").as_str(), "http://a.com");
/// ```
pub fn canonicalize(url: &str) -> CanonicalUrl {
    let trimmed = url.trim_start();

    let folded = match split_scheme(trimmed) {
        Some(rest) => format!("http://{}", rest),
        None => trimmed.to_string(),
    };

    CanonicalUrl(
        folded
            .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
            .to_string(),
    )
}

/// Returns the part after `http://` or `https://`, compared case-insensitively
fn split_scheme(url: &str) -> Option<&str> {
    for prefix in ["https://", "http://"] {
        if let Some(head) = url.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return Some(&url[prefix.len()..]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scheme_and_slash_equivalence() {
        assert_eq!(
            canonicalize("https://a.com/x/"),
            canonicalize("http://a.com/x")
        );
    }

    #[test]
    fn test_https_folds_to_http() {
        assert_eq!(
            canonicalize("https://example.com/page").as_str(),
            "http://example.com/page"
        );
    }

    #[test]
    fn test_uppercase_scheme_folds() {
        assert_eq!(
            canonicalize("HTTPS://example.com/page").as_str(),
            "http://example.com/page"
        );
        assert_eq!(
            canonicalize("Http://example.com/page").as_str(),
            "http://example.com/page"
        );
    }

    #[test]
    fn test_only_scheme_is_folded() {
        // "https" inside the path must survive
        assert_eq!(
            canonicalize("https://example.com/https-guide").as_str(),
            "http://example.com/https-guide"
        );
    }

    #[test]
    fn test_root_slash_removed() {
        assert_eq!(canonicalize("http://example.com/").as_str(), "http://example.com");
    }

    #[test]
    fn test_query_and_path_case_kept() {
        assert_eq!(
            canonicalize("http://example.com/Path?b=2&a=1").as_str(),
            "http://example.com/Path?b=2&a=1"
        );
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert_eq!(
            canonicalize("  http://example.com/x/ \n").as_str(),
            "http://example.com/x"
        );
    }

    #[test]
    fn test_repeated_trailing_slashes() {
        let once = canonicalize("http://example.com/x//");
        assert_eq!(once.as_str(), "http://example.com/x");
        assert_eq!(canonicalize(once.as_str()), once);
    }

    #[test]
    fn test_non_http_left_alone() {
        assert_eq!(canonicalize("ftp://example.com/").as_str(), "ftp://example.com");
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert_eq!(canonicalize("héllo/").as_str(), "héllo");
    }

    proptest! {
        #[test]
        fn prop_canonicalize_is_idempotent(url in "\\PC{0,40}") {
            let once = canonicalize(&url);
            let twice = canonicalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_scheme_and_slash_collapse(host in "[a-z]{1,10}\\.com", path in "(/[a-z0-9]{1,6}){0,3}") {
            let secure = canonicalize(&format!("https://{}{}/", host, path));
            let plain = canonicalize(&format!("http://{}{}", host, path));
            prop_assert_eq!(secure, plain);
        }
    }
}
