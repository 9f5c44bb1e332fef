//! HTTP client implementation using reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use core_async::time::sleep;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Reqwest-based HTTP client
///
/// Retries transport failures, 429 and 5xx responses according to the
/// supplied [`RetryPolicy`]. Any other response is returned as-is.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("tunestream-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(Self::convert_method(request.method), &request.url);

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 429
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self.build_request(request).send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::OperationFailed("Request timed out".to_string())
            } else if e.is_connect() {
                BridgeError::OperationFailed(format!("Connection failed: {}", e))
            } else {
                BridgeError::OperationFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default()).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt, max_attempts = attempts, method = ?request.method, "Executing HTTP request");

            let outcome = self.send_once(&request).await;
            let retryable = match &outcome {
                Ok(response) => Self::is_retryable_status(response.status),
                Err(_) => true,
            };

            if !retryable || attempt >= attempts {
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(status = response.status, attempt, "Retryable HTTP status"),
                Err(e) => warn!(error = %e, attempt, "HTTP request failed"),
            }

            let delay = policy.delay_for(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
        }
    }
}
