//! Monster image resolution
//!
//! This module finds a representative image for a monster from its wiki
//! page. The page is fetched once per identity and probed by an ordered list
//! of strategies:
//! - The first `<img>` inside the infobox image cell
//! - The `og:image` meta tag
//!
//! Results go through the run-scoped [`ImageCache`].

use crate::aggregate::cache::{ImageCache, MonsterIdentityKey};
use crate::http::{get_text_with_status, is_final_status};
use crate::LoreboxError;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Typed outcome of one resolution strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An absolute image URL
    Found(String),

    /// The strategy ran and found nothing
    NotFound,

    /// The attempt failed in a way a later attempt might not
    TransientError(String),
}

/// One way of locating an image in a parsed wiki page
pub trait ImageStrategy: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Probes a parsed page
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed monster page
    /// * `base_url` - Wiki root used to absolutize relative paths
    fn probe(&self, document: &Html, base_url: &Url) -> Resolution;
}

/// First image inside the full-width infobox image cell
pub struct InfoboxImage;

impl ImageStrategy for InfoboxImage {
    fn name(&self) -> &'static str {
        "infobox-image"
    }

    fn probe(&self, document: &Html, base_url: &Url) -> Resolution {
        let (Ok(infobox_selector), Ok(img_selector)) = (
            Selector::parse(".infobox-image.infobox-full-width-content"),
            Selector::parse("img"),
        ) else {
            return Resolution::NotFound;
        };

        let src = document
            .select(&infobox_selector)
            .next()
            .and_then(|infobox| infobox.select(&img_selector).next())
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty());

        match src.map(|src| base_url.join(src)) {
            Some(Ok(url)) => Resolution::Found(url.to_string()),
            Some(Err(e)) => {
                tracing::debug!("Unusable infobox image path: {}", e);
                Resolution::NotFound
            }
            None => Resolution::NotFound,
        }
    }
}

/// Open Graph `og:image` meta tag
pub struct OgImageMeta;

impl ImageStrategy for OgImageMeta {
    fn name(&self) -> &'static str {
        "og-image"
    }

    fn probe(&self, document: &Html, _base_url: &Url) -> Resolution {
        let Ok(meta_selector) = Selector::parse("meta[property]") else {
            return Resolution::NotFound;
        };

        document
            .select(&meta_selector)
            .filter(|meta| meta.value().attr("property") == Some("og:image"))
            .filter_map(|meta| meta.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(|content| Resolution::Found(content.to_string()))
            .unwrap_or(Resolution::NotFound)
    }
}

/// The strategies in the order they are tried
pub fn default_strategies() -> Vec<Box<dyn ImageStrategy>> {
    vec![Box::new(InfoboxImage), Box::new(OgImageMeta)]
}

/// Tries each strategy in order and returns the first `Found`
///
/// When nothing is found, a `TransientError` from any strategy wins over
/// `NotFound` so the caller can tell the two apart.
pub fn resolve_first(
    strategies: &[Box<dyn ImageStrategy>],
    document: &Html,
    base_url: &Url,
) -> Resolution {
    let mut transient = None;

    for strategy in strategies {
        match strategy.probe(document, base_url) {
            Resolution::Found(url) => {
                tracing::trace!("{} found {}", strategy.name(), url);
                return Resolution::Found(url);
            }
            Resolution::NotFound => {
                tracing::trace!("{} found nothing", strategy.name());
            }
            Resolution::TransientError(reason) => {
                tracing::debug!("{} failed: {}", strategy.name(), reason);
                transient.get_or_insert(reason);
            }
        }
    }

    match transient {
        Some(reason) => Resolution::TransientError(reason),
        None => Resolution::NotFound,
    }
}

/// Resolves monster images through the run's cache
pub struct ImageResolver {
    client: Client,
    base_url: Url,
    strategies: Vec<Box<dyn ImageStrategy>>,
    retry_limit: u32,
}

impl ImageResolver {
    /// Creates a resolver with the default strategies
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `base_url` - Wiki root used to absolutize relative image paths
    /// * `retry_limit` - Extra attempts per identity after transient failures
    pub fn new(client: Client, base_url: &str, retry_limit: u32) -> Result<Self, LoreboxError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            strategies: default_strategies(),
            retry_limit,
        })
    }

    /// Replaces the strategy list
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ImageStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Resolves the image for one monster identity
    ///
    /// A cache hit, including the empty sentinel, returns without touching
    /// the network. On a miss the sentinel is written before fetching, so a
    /// failed attempt leaves a negative entry behind.
    ///
    /// Client-error pages such as a 404 are still probed, and a page without
    /// an image settles the entry for the rest of the run. Server errors,
    /// timeouts and rate limiting count against the retry budget.
    ///
    /// # Returns
    ///
    /// The image URL, or an empty string when none was found
    pub async fn resolve_image(
        &self,
        cache: &mut ImageCache,
        identity: &MonsterIdentityKey,
        wiki_url: &str,
    ) -> String {
        if let Some(url) = cache.lookup(identity, self.retry_limit) {
            return url.to_string();
        }

        cache.mark_pending(identity);

        if wiki_url.is_empty() {
            cache.settle_empty(identity);
            tracing::warn!("No wiki page for {}, leaving image empty", identity);
            return String::new();
        }

        let resolution = match get_text_with_status(&self.client, wiki_url).await {
            Ok((status, body)) if is_final_status(status) => {
                if !status.is_success() {
                    tracing::debug!("{} answered {}, probing the page anyway", wiki_url, status);
                }
                self.probe_page(&body)
            }
            Ok((status, _)) => {
                Resolution::TransientError(format!("HTTP {} from {}", status.as_u16(), wiki_url))
            }
            Err(e) => Resolution::TransientError(e.to_string()),
        };

        match resolution {
            Resolution::Found(url) => {
                cache.store(identity, &url);
                tracing::debug!("Image for {}: {}", identity, url);
                url
            }
            Resolution::NotFound => {
                cache.settle_empty(identity);
                tracing::warn!("No image found for {} at {}", identity, wiki_url);
                String::new()
            }
            Resolution::TransientError(reason) => {
                cache.record_failure(identity);
                tracing::warn!("Image lookup failed for {}: {}", identity, reason);
                String::new()
            }
        }
    }

    fn probe_page(&self, body: &str) -> Resolution {
        let document = Html::parse_document(body);
        resolve_first(&self.strategies, &document, &self.base_url)
    }
}
