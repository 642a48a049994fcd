mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::config::Config;
use crate::error::{FetchError, Result};
use serde_json::Value;
use tracing::debug;

/// Builds the client described by `config`: a timed [`BasicClient`], wrapped
/// in an [`auth::ApiKey`] when an app token is configured.
pub fn build_client(config: &Config) -> Result<Box<dyn HttpClient>> {
    let basic = BasicClient::new(config.timeout)?;
    match config.app_token.as_deref() {
        Some(token) => {
            debug!("Using app token for requests");
            Ok(Box::new(auth::ApiKey::app_token(basic, token)?))
        }
        None => Ok(Box::new(basic)),
    }
}

/// Issues a GET for `url` and decodes the body as JSON.
///
/// Non-success statuses become [`FetchError::Status`] with the response body
/// attached; nothing is retried.
pub async fn fetch_json<C: HttpClient>(client: &C, url: reqwest::Url) -> Result<Value> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}
