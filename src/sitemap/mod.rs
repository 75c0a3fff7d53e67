//! Sitemap source for seeding the frontier
//!
//! The crawl consumes sitemaps as a plain list of URL strings. Retrieval and
//! parsing problems are never fatal: the source logs a warning and yields
//! whatever it managed to read (possibly nothing).

use crate::config::Config;
use crate::crawler::build_http_client;
use async_trait::async_trait;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Supplies the URLs listed in a sitemap
#[async_trait]
pub trait SitemapSource: Send + Sync {
    /// Returns the absolute URLs listed at `sitemap_url`, in document order
    async fn urls(&self, sitemap_url: &str) -> Vec<String>;
}

/// Default sitemap location for a site: `<scheme>://<host>[:port]/sitemap.xml`
///
/// Returns `None` if `start_url` has no host.
pub fn default_sitemap_url(start_url: &str) -> Option<String> {
    let url = Url::parse(start_url.trim()).ok()?;
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("{}://{}:{}/sitemap.xml", url.scheme(), host, port),
        None => format!("{}://{}/sitemap.xml", url.scheme(), host),
    })
}

/// Extracts the text of every `<loc>` element
///
/// Works for both `<urlset>` and `<sitemapindex>` documents; namespaced tags
/// are matched by local name. Parsing stops at the first XML error and keeps
/// what was read up to that point.
pub fn parse_sitemap(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = true;
                }
            }
            Ok(XmlEvent::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Ok(XmlEvent::Text(t)) if in_loc => match t.unescape() {
                Ok(text) => push_loc(&mut locs, &text),
                Err(e) => debug!("Skipping undecodable <loc>: {}", e),
            },
            Ok(XmlEvent::CData(t)) if in_loc => {
                push_loc(&mut locs, &String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => {
                warn!(
                    "Malformed sitemap XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    locs
}

fn push_loc(locs: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        locs.push(text.to_string());
    }
}

/// Fetches sitemaps over HTTP with the crawler's client settings
#[derive(Debug, Clone)]
pub struct HttpSitemapSource {
    client: Client,
}

impl HttpSitemapSource {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    async fn fetch(&self, sitemap_url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(sitemap_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapSource {
    async fn urls(&self, sitemap_url: &str) -> Vec<String> {
        match self.fetch(sitemap_url).await {
            Ok(xml) => {
                let urls = parse_sitemap(&xml);
                debug!("Sitemap {} lists {} URLs", sitemap_url, urls.len());
                urls
            }
            Err(e) => {
                warn!("Could not read sitemap {}: {}", sitemap_url, e);
                Vec::new()
            }
        }
    }
}

/// A fixed URL list standing in for a sitemap
#[derive(Debug, Clone, Default)]
pub struct StaticSitemap {
    urls: Vec<String>,
}

impl StaticSitemap {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

#[async_trait]
impl SitemapSource for StaticSitemap {
    async fn urls(&self, _sitemap_url: &str) -> Vec<String> {
        self.urls.clone()
    }
}
