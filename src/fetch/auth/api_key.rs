use crate::error::{FetchError, Result};
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// Header Socrata portals read application tokens from.
pub const APP_TOKEN_HEADER: &str = "X-App-Token";

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header on
/// every request.
///
/// The header name and value are validated once at construction, so
/// `execute` never has to deal with a malformed key.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let invalid = || FetchError::InvalidHeader {
            header: header_name.to_string(),
        };
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|_| invalid())?;
        let mut value = HeaderValue::from_str(key).map_err(|_| invalid())?;
        value.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// `X-App-Token: <token>`, as used by the USAC and IMLS open-data portals.
    pub fn app_token(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, APP_TOKEN_HEADER, token)
    }

    /// `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, "Authorization", &format!("Bearer {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the value of one header on every request.
    struct Capture {
        header: &'static str,
        seen: Mutex<Vec<Option<String>>>,
    }

    impl Capture {
        fn header(header: &'static str) -> Self {
            Self {
                header,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for Capture {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let value = req
                .headers()
                .get(self.header)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.seen.lock().unwrap().push(value);
            Ok(http::Response::new("[]").into())
        }
    }

    fn request() -> reqwest::Request {
        reqwest::Request::new(
            reqwest::Method::GET,
            "https://example.org/resource.json".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_app_token_header_is_sent() {
        let client = ApiKey::app_token(Capture::header(APP_TOKEN_HEADER), "test_token").unwrap();
        client.execute(request()).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[Some("test_token".to_string())]);
    }

    #[tokio::test]
    async fn test_bearer_header_is_sent() {
        let client = ApiKey::bearer(Capture::header("authorization"), "s3cret").unwrap();
        client.execute(request()).await.unwrap();
        client.execute(request()).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|v| v.as_deref() == Some("Bearer s3cret")));
    }

    #[test]
    fn test_invalid_token_rejected_at_construction() {
        let result = ApiKey::app_token(Capture::header(APP_TOKEN_HEADER), "bad\ntoken");
        assert!(matches!(result, Err(FetchError::InvalidHeader { .. })));
    }
}
