//! HTTP transport for the Haulbook REST API.
//!
//! `ApiClient` attaches the current bearer token to every request,
//! deserializes 2xx bodies, and classifies failures into `ApiError`.
//! Every failed call emits exactly one user-visible notice through the
//! configured `NoticeSink` and is also returned to the caller, so views
//! can branch (keep a form open on validation failure, bail on 401).

use std::sync::Arc;

use anyhow::Result;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::notify::SharedSink;

use super::ApiError;

/// HTTP request timeout in seconds.
/// Matches the hosted backend's worst observed cold-start latency.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Chunk size for streamed file uploads. Small enough that progress
/// callbacks fire at a useful rate on slow links.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// API client for the Haulbook backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    notices: SharedSink,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore, notices: SharedSink) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            tokens,
            notices,
        })
    }

    /// The token store this client reads before each request.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The notice sink failures are reported through. Services also use
    /// it for write confirmations.
    pub fn sink(&self) -> &SharedSink {
        &self.notices
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the current bearer token, if any. Read fresh on every call
    /// so a login/refresh/logout takes effect immediately.
    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Funnel for every error leaving this client: emit the user-visible
    /// notice exactly once, then hand the error back to the caller.
    fn fail(&self, err: ApiError) -> ApiError {
        debug!(error = %err, "API call failed");
        self.notices.notify(err.notice());
        err
    }

    /// Check if response is successful; classify and report if not.
    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        if matches!(err, ApiError::SessionExpired) {
            warn!("Received 401 - clearing bearer token");
            self.tokens.clear();
        }
        Err(self.fail(err))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = req.send().await.map_err(|e| self.fail(ApiError::Network(e)))?;
        let response = self.check(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| self.fail(ApiError::Network(e)))?;
        serde_json::from_str(&text).map_err(|e| {
            self.fail(ApiError::Unexpected(format!(
                "Failed to parse response from {}: {}",
                path, e
            )))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.apply_auth(self.client.get(self.url(path)));
        self.send_json(req, path).await
    }

    /// GET returning the raw JSON value. This is the cacheable read path:
    /// the response cache stores `serde_json::Value` so one fetch can feed
    /// differently-typed consumers.
    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        self.get(path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.apply_auth(self.client.post(self.url(path))).json(body);
        self.send_json(req, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.apply_auth(self.client.put(self.url(path))).json(body);
        self.send_json(req, path).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.apply_auth(self.client.patch(self.url(path))).json(body);
        self.send_json(req, path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.apply_auth(self.client.delete(self.url(path)));
        self.send_json(req, path).await
    }

    /// GET returning raw bytes, for server-produced export artifacts.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let req = self.apply_auth(self.client.get(self.url(path)));
        let response = req.send().await.map_err(|e| self.fail(ApiError::Network(e)))?;
        let response = self.check(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.fail(ApiError::Network(e)))?;
        Ok(bytes.to_vec())
    }

    /// Upload a file as multipart form data, reporting fractional progress.
    ///
    /// `on_progress` receives monotonically non-decreasing percentages from
    /// 0 to 100; the final 100 is emitted once the server has accepted the
    /// upload.
    pub async fn upload<F>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        on_progress: F,
    ) -> Result<Value, ApiError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let progress = Arc::new(on_progress);
        (*progress)(0);

        let total = bytes.len();
        let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();

        let tick = Arc::clone(&progress);
        let mut sent = 0usize;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len();
            let pct = if total == 0 {
                100
            } else {
                ((sent as u64 * 100) / total as u64) as u8
            };
            (*tick)(pct);
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let part = multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            total as u64,
        )
        .file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let req = self
            .apply_auth(self.client.post(self.url(path)))
            .multipart(form);
        let value = self.send_json::<Value>(req, path).await?;
        (*progress)(100);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;

    fn test_client(base: &str) -> ApiClient {
        ApiClient::new(base, TokenStore::new(), Arc::new(MemorySink::new()))
            .expect("client should build")
    }

    #[test]
    fn test_url_joining_strips_trailing_slash() {
        let client = test_client("https://api.example.com/api/");
        assert_eq!(
            client.url("/parties"),
            "https://api.example.com/api/parties"
        );
        assert_eq!(
            client.url("/parties?limit=10"),
            "https://api.example.com/api/parties?limit=10"
        );
    }

    #[test]
    fn test_fail_emits_exactly_one_notice() {
        let sink = Arc::new(MemorySink::new());
        let client = ApiClient::new("http://x", TokenStore::new(), sink.clone())
            .expect("client should build");

        let _ = client.fail(ApiError::Unexpected("bad".into()));
        assert_eq!(sink.len(), 1);
        let notices = sink.take();
        assert_eq!(notices[0].message, "bad");
    }
}
