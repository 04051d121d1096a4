//! Anthropic (Claude) endpoint client.

use crate::{
    error::ProviderError, wire::ApiRequest, wire::ApiResponse, ModelClient, ProviderResult,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

/// The Anthropic API base URL.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

/// The Anthropic API version.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Connection-level timeout for one exchange. Distinct from tool timeouts;
/// after this the exchange is abandoned and reported as a transport error.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// How the outbound request authenticates.
///
/// Mutually exclusive, chosen by credential kind. `None` is the proxy
/// operating mode: the proxy carries its own authentication downstream, so
/// no header is attached at all.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// Static API key, sent as `x-api-key`.
    ApiKey(String),
    /// OAuth access token, sent as `Authorization: Bearer`.
    Bearer(String),
    /// No client-side auth (talking to a proxy).
    None,
}

/// Client for the Anthropic messages endpoint.
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    /// Create a client against the default endpoint.
    pub fn new(auth: AuthHeader) -> ProviderResult<Self> {
        Self::with_base_url(auth, ANTHROPIC_API_URL)
    }

    /// Create a client against a custom base URL (e.g. a proxy).
    pub fn with_base_url(auth: AuthHeader, base_url: &str) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        match &auth {
            AuthHeader::ApiKey(key) => {
                headers.insert(
                    "x-api-key",
                    HeaderValue::from_str(key)
                        .map_err(|_| ProviderError::internal("API key is not a valid header"))?,
                );
            }
            AuthHeader::Bearer(token) => {
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {token}"))
                        .map_err(|_| ProviderError::internal("token is not a valid header"))?,
                );
            }
            AuthHeader::None => {}
        }

        debug!(base_url = %base_url, "Creating Anthropic client");

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(ProviderError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        // A proxy override may already point at the full messages path.
        if self.base_url.ends_with("/v1/messages") {
            self.base_url.clone()
        } else {
            format!("{}/v1/messages", self.base_url)
        }
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(&self, request: &ApiRequest) -> ProviderResult<ApiResponse> {
        debug!(
            model = %request.model,
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            "Sending messages request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Request failed");
            return Err(ProviderError::api_error(status.as_u16(), body));
        }

        let body = response.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("malformed response body: {e}"))
        })?;

        debug!(
            stop_reason = ?parsed.stop_reason,
            blocks = parsed.content.len(),
            "Response received"
        );

        Ok(parsed)
    }

    fn client_id(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ApiRequest {
        ApiRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            system: Some("system prompt".to_string()),
            messages: vec![Message::user("hello")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_complete_end_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "hi there"}],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url(
            AuthHeader::ApiKey("sk-test".to_string()),
            &server.uri(),
        )
        .unwrap();

        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.stop_reason(), crate::wire::StopReason::EndTurn);
        assert_eq!(response.content.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "ok"}],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let client = AnthropicClient::with_base_url(
            AuthHeader::Bearer("tok-123".to_string()),
            &server.uri(),
        )
        .unwrap();

        assert!(client.complete(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_complete_api_error_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client =
            AnthropicClient::with_base_url(AuthHeader::None, &server.uri()).unwrap();

        match client.complete(&request()).await {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client =
            AnthropicClient::with_base_url(AuthHeader::None, &server.uri()).unwrap();

        assert!(matches!(
            client.complete(&request()).await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_proxy_mode_sends_no_auth_header() {
        let server = MockServer::start().await;
        // Fails the request if either auth header is present.
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header_exists("x-api-key"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "via proxy"}],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let client =
            AnthropicClient::with_base_url(AuthHeader::None, &server.uri()).unwrap();

        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.content.len(), 1);
    }

    #[test]
    fn test_messages_url_handles_full_path_override() {
        let client = AnthropicClient::with_base_url(
            AuthHeader::None,
            "http://proxy.local:8765/v1/messages",
        )
        .unwrap();
        assert_eq!(
            client.messages_url(),
            "http://proxy.local:8765/v1/messages"
        );

        let client =
            AnthropicClient::with_base_url(AuthHeader::None, "http://proxy.local:8765/").unwrap();
        assert_eq!(
            client.messages_url(),
            "http://proxy.local:8765/v1/messages"
        );
    }
}
