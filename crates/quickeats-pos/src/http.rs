//! # Provider HTTP Client
//!
//! Thin wrapper over one shared `reqwest::Client`, bound to a single
//! provider's base URL and auth headers.
//!
//! ## Request Flow
//! ```text
//! adapter ──► ApiClient::send(method, "/orders/abc", body)
//!                 │
//!                 │  {base}/v2/orders/abc   + provider headers
//!                 ▼
//!            reqwest (shared pool, timeout from [http])
//!                 │
//!        ┌────────┼─────────────────────────┐
//!        ▼        ▼                         ▼
//!   transport   204 → ApiResponse::NoContent   non-2xx → PosError::Provider
//!   failure     2xx → ApiResponse::Json(body)    "Toast API Error: 500 - ..."
//! ```

use quickeats_core::PosProvider;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::HttpSettings;
use crate::error::{PosError, PosResult};

/// Path prefix shared by both provider APIs.
pub const API_VERSION_PREFIX: &str = "/v2";

/// Builds the process-wide HTTP client.
pub fn build_http_client(settings: &HttpSettings) -> PosResult<Client> {
    Client::builder()
        .timeout(settings.timeout())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            PosError::InvalidClientConfig(e.to_string())
        })
}

/// Picks the base URL: explicit override, else sandbox or production host.
pub fn resolve_base_url(
    override_url: Option<&str>,
    sandbox_mode: bool,
    sandbox: &str,
    production: &str,
) -> PosResult<String> {
    let base = match override_url {
        Some(url) => url,
        None if sandbox_mode => sandbox,
        None => production,
    };
    Url::parse(base)?;
    Ok(format!("{}{}", base.trim_end_matches('/'), API_VERSION_PREFIX))
}

/// A successful provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    NoContent,
}

impl ApiResponse {
    /// Returns the JSON body, or `Value::Null` for 204.
    pub fn into_json(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::NoContent => Value::Null,
        }
    }
}

/// HTTP client bound to one provider and one set of credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    provider: PosProvider,
    base_url: String,
    headers: HeaderMap,
}

impl ApiClient {
    pub fn new(http: Client, provider: PosProvider, base_url: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        ApiClient {
            http,
            provider,
            base_url,
            headers,
        }
    }

    /// Adds a `Bearer` authorization header.
    pub fn with_bearer(self, token: &str) -> PosResult<Self> {
        self.with_header(AUTHORIZATION, &format!("Bearer {}", token))
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> PosResult<Self> {
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| PosError::InvalidClientConfig(format!("{}: {}", name, e)))?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> PosResult<ApiResponse> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> PosResult<ApiResponse> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Sends one request. Bodies are only attached for non-GET methods.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> PosResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(provider = self.provider.as_str(), %method, path, "Provider request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(self.headers.clone());
        if let Some(body) = body.filter(|_| method != Method::GET) {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PosError::from(e).for_provider(self.provider))?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.rejection(status, &text));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::NoContent);
        }

        let text = response
            .text()
            .await
            .map_err(|e| PosError::from(e).for_provider(self.provider))?;
        if text.trim().is_empty() {
            return Ok(ApiResponse::NoContent);
        }

        serde_json::from_str(&text)
            .map(ApiResponse::Json)
            .map_err(|e| PosError::from(e).for_provider(self.provider))
    }

    /// Builds the provider error for a non-2xx response.
    ///
    /// Toast surfaces the raw body. Square surfaces its `errors` array when
    /// the body is JSON, else the whole body.
    fn rejection(&self, status: StatusCode, body: &str) -> PosError {
        let detail = match self.provider {
            PosProvider::Square => match serde_json::from_str::<Value>(body) {
                Ok(json) => json.get("errors").unwrap_or(&json).to_string(),
                Err(_) => body.to_string(),
            },
            _ => body.to_string(),
        };
        PosError::Provider {
            provider: self.provider,
            status: Some(status.as_u16()),
            message: format!(
                "{} API Error: {} - {}",
                self.provider,
                status.as_u16(),
                detail
            ),
        }
    }
}

/// Maps a 404 rejection to `OrderNotFound`, leaving other errors alone.
pub fn order_not_found(err: PosError, external_id: &str) -> PosError {
    match err {
        PosError::Provider {
            provider,
            status: Some(404),
            ..
        } => PosError::OrderNotFound {
            provider,
            external_id: external_id.to_string(),
        },
        other => other,
    }
}
