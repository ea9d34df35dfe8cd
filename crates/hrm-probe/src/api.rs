//! Thin HTTP client for endpoint checks against the application.
//!
//! Requests are sent once; there is no retry at this layer. Every response is
//! read to the end so a failed status check can quote the body.

use crate::config::{join_url, Settings};
use crate::logging::Logger;
use crate::result::{ProbeError, ProbeResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Extra headers and query parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

impl RequestOptions {
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }
}

/// Fully buffered HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Header names are lower-case
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client bound to the application's base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    logger: Logger,
}

impl ApiClient {
    /// Client for the configured base URL, timing out after the navigation
    /// timeout
    pub fn new(settings: &Settings, logger: &Logger) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.navigation_timeout)
            .build()?;
        Ok(Self::with_client(&settings.base_url, client, logger))
    }

    /// Client with a custom reqwest client (for redirect policy, proxies, etc.)
    #[must_use]
    pub fn with_client(base_url: &str, client: reqwest::Client, logger: &Logger) -> Self {
        Self {
            base_url: base_url.to_string(),
            client,
            logger: logger.scoped("ApiClient"),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL joined with `endpoint`, plus URL-encoded query parameters.
    ///
    /// Absolute `http(s)://` endpoints bypass the base URL.
    pub fn build_url(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> ProbeResult<String> {
        let joined = join_url(&self.base_url, endpoint);
        if params.is_empty() {
            return Ok(joined);
        }
        let url = Url::parse_with_params(&joined, params).map_err(|e| {
            ProbeError::InvalidArgument {
                message: format!("invalid URL {joined}: {e}"),
            }
        })?;
        Ok(url.into())
    }

    pub async fn get(&self, endpoint: &str, options: &RequestOptions) -> ProbeResult<ApiResponse> {
        self.send::<()>(Method::GET, endpoint, None, options).await
    }

    /// POST `data` as JSON
    pub async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        data: Option<&B>,
        options: &RequestOptions,
    ) -> ProbeResult<ApiResponse> {
        self.send(Method::POST, endpoint, data, options).await
    }

    /// PUT `data` as JSON
    pub async fn put<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        data: Option<&B>,
        options: &RequestOptions,
    ) -> ProbeResult<ApiResponse> {
        self.send(Method::PUT, endpoint, data, options).await
    }

    pub async fn delete(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> ProbeResult<ApiResponse> {
        self.send::<()>(Method::DELETE, endpoint, None, options).await
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<&B>,
        options: &RequestOptions,
    ) -> ProbeResult<ApiResponse> {
        let url = self.build_url(endpoint, &options.params)?;
        self.logger.info(&format!("API {method}: {url}"));

        let mut request = self.client.request(method.clone(), &url);
        if method == Method::POST || method == Method::PUT {
            request = request.header(CONTENT_TYPE, "application/json");
            if let Some(body) = data {
                request = request.json(body);
            }
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.text().await?;
            Ok::<_, ProbeError>(ApiResponse {
                status,
                headers,
                body,
            })
        }
        .await;

        match result {
            Ok(response) => {
                self.logger
                    .info(&format!("API Response Status: {}", response.status));
                Ok(response)
            }
            Err(err) => {
                self.logger.failure(&format!("API {method} {url}"), &err);
                Err(err)
            }
        }
    }

    /// Fail with [`ProbeError::UnexpectedStatus`] unless the status matches
    pub fn verify_status(&self, response: &ApiResponse, expected: u16) -> ProbeResult<()> {
        let passed = response.status == expected;
        self.logger
            .assertion(&format!("Status is {expected}"), passed);
        if passed {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedStatus {
                expected,
                actual: response.status,
                body: response.body.clone(),
            })
        }
    }

    /// Accepted for call-site compatibility; requests are not authenticated
    pub fn set_auth_token(&self, _token: &str) {
        self.logger.info("Auth token set for API client");
    }
}
