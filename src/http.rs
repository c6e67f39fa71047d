//! HTTP transport shared by both pipelines
//!
//! This module handles:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Plain GET requests that classify non-success statuses as errors
//! - Status-aware GET requests for pages whose error bodies are still useful

use crate::config::{HttpConfig, UserAgentConfig};
use crate::LoreboxError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Formats the user agent string
///
/// Format: `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.name, config.version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `http` - Request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use lorebox::config::{HttpConfig, UserAgentConfig};
/// use lorebox::http::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     name: "Lorebox".to_string(),
///     version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// # Errors
///
/// * `LoreboxError::Http` - Connection, timeout or body read failure
/// * `LoreboxError::HttpStatus` - Any non-2xx response
pub async fn get_text(client: &Client, url: &str) -> Result<String, LoreboxError> {
    let (status, body) = get_text_with_status(client, url).await?;

    if !status.is_success() {
        return Err(LoreboxError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(body)
}

/// Fetches a URL and returns its status and body, whatever the status
///
/// # Errors
///
/// * `LoreboxError::Http` - Connection, timeout or body read failure
pub async fn get_text_with_status(
    client: &Client,
    url: &str,
) -> Result<(StatusCode, String), LoreboxError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| LoreboxError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| LoreboxError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok((status, body))
}

/// Whether a response status is final for the requested page
///
/// Success and client errors are final, except for request timeouts and rate
/// limiting. Server errors are not.
pub fn is_final_status(status: StatusCode) -> bool {
    status.is_success()
        || (status.is_client_error()
            && status != StatusCode::REQUEST_TIMEOUT
            && status != StatusCode::TOO_MANY_REQUESTS)
}
