//! HTTP transport for the list REST API

use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, IF_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ClientConfig, ClientError, ClientResult};

const ODATA_JSON: &str = "application/json;odata=nometadata";
const X_HTTP_METHOD: HeaderName = HeaderName::from_static("x-http-method");

/// Verb tunnelled through POST via `X-HTTP-Method`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelledMethod {
    Merge,
    Delete,
}

impl TunnelledMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "MERGE",
            Self::Delete => "DELETE",
        }
    }
}

/// Error body returned by the REST API
#[derive(Deserialize)]
struct ODataErrorBody {
    #[serde(alias = "odata.error")]
    error: ODataError,
}

#[derive(Deserialize)]
struct ODataError {
    #[serde(default)]
    code: Option<String>,
    message: ODataMessage,
}

#[derive(Deserialize)]
struct ODataMessage {
    value: String,
}

/// Extract a readable message from an error body, if it is OData-shaped
pub(crate) fn odata_error_message(text: &str) -> Option<String> {
    let body: ODataErrorBody = serde_json::from_str(text).ok()?;
    Some(match body.error.code {
        Some(code) if !code.is_empty() => format!("{} ({})", body.error.message.value, code),
        _ => body.error.message.value,
    })
}

/// HTTP client for the site's REST endpoints
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    site_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            site_url: config.site_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Site URL without trailing slash
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.site_url, path.trim_start_matches('/'))
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, HeaderValue::from_static(ODATA_JSON));
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// GET with query options, returning the JSON body
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Value> {
        let url = self.url(path);
        tracing::debug!(%url, ?query, "GET");
        let response = self.prepare(self.client.get(&url).query(query)).send().await?;
        Self::handle_response(response).await
    }

    /// POST a JSON body, returning the JSON body of the response
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.prepare(self.client.post(&url).json(body)).send().await?;
        Self::handle_response(response).await
    }

    /// POST with `X-HTTP-Method` and `IF-MATCH: *`; the response body is ignored
    pub async fn post_tunnelled(
        &self,
        path: &str,
        method: TunnelledMethod,
        body: Option<&Value>,
    ) -> ClientResult<()> {
        let url = self.url(path);
        tracing::debug!(%url, method = method.as_str(), "POST");
        let mut request = self
            .prepare(self.client.post(&url))
            .header(IF_MATCH, HeaderValue::from_static("*"))
            .header(X_HTTP_METHOD, HeaderValue::from_static(method.as_str()));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }
        Ok(())
    }

    /// Handle the HTTP response
    async fn handle_response(response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(Into::into)
    }

    fn status_error(status: StatusCode, text: String) -> ClientError {
        let message = odata_error_message(&text).unwrap_or(text);
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            _ => ClientError::Internal(format!("{}: {}", status, message)),
        }
    }
}
