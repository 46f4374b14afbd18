use std::future::Future;

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::credentials::CredentialProvider;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The HTTP capability every view goes through.
///
/// `path` is relative to the API base. A successful response yields its parsed
/// JSON body, or `Value::Null` when the body is empty.
pub trait ResourceClient: Send + Sync {
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = ApiResult<Value>> + Send;
}

/// `ResourceClient` over reqwest. No retry and no timeout.
pub struct HttpResourceClient<P> {
    http: reqwest::Client,
    base: Url,
    credentials: P,
}

impl<P: CredentialProvider> HttpResourceClient<P> {
    pub fn new(base_url: &str, credentials: P) -> ApiResult<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(&base)?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

impl<P: CredentialProvider> ResourceClient for HttpResourceClient<P> {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        let token = self.credentials.token().await?;
        debug!(?method, %url, "sending request");

        let mut request = self.http.request(method.into(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::ServerRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticCredential;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client =
            HttpResourceClient::new("http://localhost:8000/api", StaticCredential::new("t")).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            client.base_url().join("bill-items/").unwrap().as_str(),
            "http://localhost:8000/api/bill-items/"
        );
    }

    #[tokio::test]
    async fn test_token_unusable_as_header_is_invalid_request() {
        // Nothing listens here; the request fails before it is sent.
        let client =
            HttpResourceClient::new("http://127.0.0.1:9/api/", StaticCredential::new("bad\ntoken")).unwrap();
        let result = client.send(Method::Get, "customers/", None).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))), "{result:?}");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpResourceClient::new("not a url", StaticCredential::new("t"));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
