use crate::url::{canonicalize, CanonicalUrl, Classification};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Response code recorded when no HTTP response was obtained
pub const NO_RESPONSE: i32 = -1;

/// One discovered URL, its fetch results, and its fragment of the link graph
///
/// `parents` and `children` hold canonical keys only; they are lookup
/// relations into the crawl's key space, never ownership. Equality and hashing
/// use the canonical key.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL as discovered
    pub raw_url: String,

    /// Canonical key derived from `raw_url`
    pub key: CanonicalUrl,

    /// Pages linking to this one
    pub parents: BTreeSet<CanonicalUrl>,

    /// HTTP status, or [`NO_RESPONSE`]
    pub response_code: i32,

    /// Content-Type header; empty until a response is observed
    pub content_type: String,

    /// Fixed at creation from classification
    pub external: bool,

    /// Fixed at creation from the skip policy
    pub skip: bool,

    /// Discovered through an absolute href that should have been relative
    pub hardcoded: bool,

    /// Transport or HTTP failure description
    pub failure_message: String,

    /// Pages discovered on this page
    pub children: BTreeSet<CanonicalUrl>,

    /// Final URL after redirects, when it differs from `raw_url`
    pub effective_url: Option<String>,

    /// A redirect chain led outside the base domain
    pub redirected_external: bool,

    /// Raw absolute hrefs on this page judged hardcoded
    pub hardcoded_links: BTreeSet<String>,
}

impl Page {
    /// Creates a page with no parent
    pub fn new(raw_url: &str, classification: Classification) -> Self {
        Self {
            raw_url: raw_url.trim().to_string(),
            key: canonicalize(raw_url),
            parents: BTreeSet::new(),
            response_code: NO_RESPONSE,
            content_type: String::new(),
            external: classification.external,
            skip: classification.skip,
            hardcoded: false,
            failure_message: String::new(),
            children: BTreeSet::new(),
            effective_url: None,
            redirected_external: false,
            hardcoded_links: BTreeSet::new(),
        }
    }

    /// Creates a page found on `parent`
    pub fn discovered(
        raw_url: &str,
        parent: &CanonicalUrl,
        classification: Classification,
        hardcoded: bool,
    ) -> Self {
        let mut page = Self::new(raw_url, classification);
        page.parents.insert(parent.clone());
        page.hardcoded = hardcoded;
        page
    }

    /// Records additional referrers; returns how many were new
    pub fn merge_parents<I>(&mut self, parents: I) -> usize
    where
        I: IntoIterator<Item = CanonicalUrl>,
    {
        let before = self.parents.len();
        for parent in parents {
            if parent != self.key {
                self.parents.insert(parent);
            }
        }
        self.parents.len() - before
    }

    /// External by classification or by redirect
    pub fn is_external_page(&self) -> bool {
        self.external || self.redirected_external
    }

    /// Returns true if a response carried an HTML content type
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }

    /// Returns true if any HTTP response was observed
    pub fn has_response(&self) -> bool {
        self.response_code != NO_RESPONSE
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn internal() -> Classification {
        Classification::default()
    }

    #[test]
    fn test_new_page_defaults() {
        let page = Page::new("https://example.com/about/", internal());
        assert_eq!(page.key.as_str(), "http://example.com/about");
        assert_eq!(page.response_code, NO_RESPONSE);
        assert!(page.content_type.is_empty());
        assert!(page.parents.is_empty());
        assert!(!page.has_response());
    }

    #[test]
    fn test_equality_uses_canonical_key() {
        let a = Page::new("https://example.com/x/", internal());
        let b = Page::new("http://example.com/x", internal());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_discovered_records_parent() {
        let parent = canonicalize("http://example.com");
        let page = Page::discovered("http://example.com/a", &parent, internal(), true);
        assert!(page.parents.contains(&parent));
        assert!(page.hardcoded);
    }

    #[test]
    fn test_merge_parents_ignores_self_and_duplicates() {
        let mut page = Page::new("http://example.com/a", internal());
        let added = page.merge_parents(vec![
            canonicalize("http://example.com"),
            canonicalize("https://example.com/"),
            canonicalize("http://example.com/a/"),
        ]);
        assert_eq!(added, 1);
        assert_eq!(page.parents.len(), 1);
    }

    #[test]
    fn test_external_by_redirect() {
        let mut page = Page::new("http://example.com/go", internal());
        assert!(!page.is_external_page());
        page.redirected_external = true;
        assert!(page.is_external_page());
    }

    #[test]
    fn test_is_html() {
        let mut page = Page::new("http://example.com/", internal());
        page.content_type = "text/html; charset=utf-8".to_string();
        assert!(page.is_html());
        page.content_type = "application/pdf".to_string();
        assert!(!page.is_html());
    }
}
