//! HTTP routes implementing the wire contract.

use crate::agent::AgentInvoker;
use crate::error::ProxyError;
use crate::flatten;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tern_auth::CredentialProvider;
use tern_provider::{ApiRequest, ApiResponse};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// How much of the conversation is forwarded to the external agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Fidelity {
    /// Latest user message only; tool-use semantics are lost.
    Simple,
    /// Entire conversation flattened into one composite prompt.
    #[default]
    Full,
}

/// Shared state for the proxy server.
#[derive(Clone)]
pub struct ProxyState {
    /// Subprocess invoker; each request spawns its own subprocess.
    pub invoker: Arc<AgentInvoker>,
    /// Re-queried on every request so external token rotation is
    /// tolerated without a restart.
    pub credentials: Arc<dyn CredentialProvider>,
    /// Forwarding fidelity.
    pub fidelity: Fidelity,
}

/// Create the proxy router.
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/messages", post(messages))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// The one endpoint the transport client knows about. The response shape
/// must be indistinguishable from the real endpoint's.
async fn messages(
    State(state): State<ProxyState>,
    Json(request): Json<ApiRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    info!(
        messages = request.messages.len(),
        tools = request.tools.len(),
        fidelity = ?state.fidelity,
        "Proxying request"
    );

    // Credential availability is checked per request, not cached.
    if let Err(e) = state.credentials.credential().await {
        warn!(error = %e, "No credential for downstream agent");
        return Err(status_of(ProxyError::NoCredential(e)));
    }

    let response = match state.fidelity {
        Fidelity::Simple => {
            let prompt = flatten::latest_user_text(&request)
                .ok_or_else(|| status_of(ProxyError::NoUserMessage))?;
            let output = state.invoker.run(&prompt, false).await.map_err(status_of)?;
            ApiResponse::end_turn(output)
        }
        Fidelity::Full => {
            let prompt = flatten::flatten_request(&request);
            let output = state.invoker.run(&prompt, true).await.map_err(status_of)?;
            reshape_output(&output)
        }
    };

    Ok(Json(response))
}

/// Parse the agent's output as a structured envelope when possible,
/// falling back to plain-text wrapping.
fn reshape_output(output: &str) -> ApiResponse {
    if let Ok(parsed) = serde_json::from_str::<ApiResponse>(output) {
        if !parsed.content.is_empty() {
            debug!("Agent output parsed as structured envelope");
            return parsed;
        }
    }

    // Agents in JSON print mode wrap the answer as {"type":"result","result":"..."}.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(output) {
        if let Some(result) = value.get("result").and_then(|r| r.as_str()) {
            return ApiResponse::end_turn(result);
        }
    }

    ApiResponse::end_turn(output)
}

/// Map proxy errors onto the caller-facing status codes.
fn status_of(error: ProxyError) -> (StatusCode, String) {
    let status = match &error {
        ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ProxyError::NoUserMessage => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use std::time::Duration;
    use tern_auth::{Credential, StaticCredentialProvider};
    use tern_provider::Message;

    fn fake_agent(dir: &std::path::Path, body: &str) -> AgentInvoker {
        let script = dir.join("agent.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        AgentInvoker::new(script.display().to_string(), Duration::from_secs(5))
    }

    fn server(invoker: AgentInvoker, fidelity: Fidelity) -> TestServer {
        let state = ProxyState {
            invoker: Arc::new(invoker),
            credentials: Arc::new(StaticCredentialProvider(Credential::OAuth(
                "tok".to_string(),
            ))),
            fidelity,
        };
        TestServer::new(create_router(state)).unwrap()
    }

    fn request_body(messages: Vec<Message>) -> serde_json::Value {
        serde_json::to_value(ApiRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            system: Some("sys".to_string()),
            messages,
            tools: vec![],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(fake_agent(dir.path(), "echo hi"), Fidelity::Simple);

        let response = server.get("/health").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_simple_fidelity_wraps_text() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(
            fake_agent(dir.path(), r#"echo "proxied answer""#),
            Fidelity::Simple,
        );

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![Message::user("hello")]))
            .await;

        response.assert_status_ok();
        let body: ApiResponse = response.json();
        assert_eq!(body.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(body.content.len(), 1);
        assert!(serde_json::to_string(&body.content[0])
            .unwrap()
            .contains("proxied answer"));
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_simple_fidelity_no_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(fake_agent(dir.path(), "echo hi"), Fidelity::Simple);

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_full_fidelity_flattens_conversation() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the prompt back so we can inspect the flattened form.
        let server = server(fake_agent(dir.path(), r#"echo "$2""#), Fidelity::Full);

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![
                Message::user("question one"),
                Message::assistant("answer one"),
                Message::user("question two"),
            ]))
            .await;

        response.assert_status_ok();
        let body: ApiResponse = response.json();
        let text = serde_json::to_string(&body.content).unwrap();
        assert!(text.contains("question one"));
        assert!(text.contains("answer one"));
        assert!(text.contains("question two"));
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_full_fidelity_parses_result_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(
            fake_agent(
                dir.path(),
                r#"echo '{"type":"result","result":"structured answer"}'"#,
            ),
            Fidelity::Full,
        );

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![Message::user("hi")]))
            .await;

        response.assert_status_ok();
        let body: ApiResponse = response.json();
        assert!(serde_json::to_string(&body.content)
            .unwrap()
            .contains("structured answer"));
    }

    #[tokio::test]
    #[cfg_attr(windows, ignore)]
    async fn test_agent_failure_maps_to_500() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(
            fake_agent(dir.path(), "echo doom >&2; exit 2"),
            Fidelity::Simple,
        );

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![Message::user("hi")]))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("doom"));
    }

    #[tokio::test]
    async fn test_missing_agent_binary_maps_to_500() {
        let state = ProxyState {
            invoker: Arc::new(AgentInvoker::new(
                "no-such-agent-binary",
                Duration::from_secs(1),
            )),
            credentials: Arc::new(StaticCredentialProvider(Credential::OAuth(
                "tok".to_string(),
            ))),
            fidelity: Fidelity::Simple,
        };
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .post("/v1/messages")
            .json(&request_body(vec![Message::user("hi")]))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reshape_passes_through_structured_envelope() {
        let raw = r#"{"content":[{"type":"text","text":"already shaped"}],"stop_reason":"end_turn"}"#;
        let reshaped = reshape_output(raw);
        assert_eq!(reshaped.content.len(), 1);
        assert_eq!(reshaped.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_reshape_wraps_plain_text() {
        let reshaped = reshape_output("just words");
        assert_eq!(reshaped.stop_reason.as_deref(), Some("end_turn"));
        assert!(serde_json::to_string(&reshaped.content)
            .unwrap()
            .contains("just words"));
    }
}
