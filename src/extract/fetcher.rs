//! Wiki markup fetcher
//!
//! Issues `action=parse&prop=wikitext` requests against the MediaWiki API
//! and classifies the answer.

use crate::http::get_text;
use crate::LoreboxError;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Result of asking the wiki for a page's markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The response carried `parse.wikitext.*`
    Found { markup: String },

    /// The response had no markup; the page does not exist or is not parseable
    NotFound,
}

/// Builds the parse request URL for a title
///
/// Every query value is form-encoded, so titles containing `&`, `+`, `#` or
/// `%` reach the API unchanged.
pub fn wikitext_url(api_url: &str, title: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        api_url,
        [
            ("action", "parse"),
            ("prop", "wikitext"),
            ("format", "json"),
            ("page", title),
        ],
    )
}

/// Pulls the markup out of a parse response
///
/// Returns `None` when any step of `parse → wikitext → *` is missing.
pub fn markup_from_response(response: &Value) -> Option<&str> {
    response
        .get("parse")?
        .get("wikitext")?
        .get("*")?
        .as_str()
}

/// Fetches the markup of one page
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `api_url` - The MediaWiki API endpoint
/// * `title` - The page title, unescaped
///
/// # Returns
///
/// * `Ok(FetchResult)` - The wiki answered; the page was found or not
/// * `Err(LoreboxError)` - Transport failure, non-2xx status or invalid JSON
pub async fn fetch_wikitext(
    client: &Client,
    api_url: &str,
    title: &str,
) -> Result<FetchResult, LoreboxError> {
    let url = wikitext_url(api_url, title)?;
    let body = get_text(client, url.as_str()).await?;

    let response: Value = serde_json::from_str(&body).map_err(|source| LoreboxError::Decode {
        url: url.to_string(),
        source,
    })?;

    match markup_from_response(&response) {
        Some(markup) => Ok(FetchResult::Found {
            markup: markup.to_string(),
        }),
        None => Ok(FetchResult::NotFound),
    }
}
