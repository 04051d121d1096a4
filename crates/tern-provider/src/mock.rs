//! Scripted model client for testing.

use crate::{
    message::ContentBlock, wire::ApiRequest, wire::ApiResponse, ModelClient, ProviderError,
    ProviderResult,
};
use async_trait::async_trait;
use std::sync::Mutex;

/// One scripted response.
#[derive(Debug)]
enum Scripted {
    Response(ApiResponse),
    Error(String),
}

/// Mock client that replays a fixed script of responses.
///
/// Each `complete` call pops the next scripted entry; when the script is
/// exhausted a plain "end of script" text response is returned. Requests
/// are recorded so tests can assert on what was sent.
#[derive(Default)]
pub struct MockClient {
    script: Mutex<Vec<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockClient {
    /// Create an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a plain text final answer.
    pub fn expect_text(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push(Scripted::Response(ApiResponse::end_turn(text)));
    }

    /// Script a tool-use response with optional leading text.
    pub fn expect_tool_use(
        &self,
        leading_text: Option<&str>,
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) {
        let mut content = Vec::new();
        if let Some(text) = leading_text {
            content.push(ContentBlock::text(text));
        }
        content.push(ContentBlock::tool_use(id, name, input));

        self.script.lock().unwrap().push(Scripted::Response(ApiResponse {
            content,
            stop_reason: Some("tool_use".to_string()),
            model: None,
        }));
    }

    /// Script an arbitrary response envelope.
    pub fn expect_response(&self, response: ApiResponse) {
        self.script.lock().unwrap().push(Scripted::Response(response));
    }

    /// Script a transport-level failure.
    pub fn expect_error(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push(Scripted::Error(message.into()));
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests recorded so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn complete(&self, request: &ApiRequest) -> ProviderResult<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let next = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error(message)) => Err(ProviderError::internal(message)),
            None => Ok(ApiResponse::end_turn("end of script")),
        }
    }

    fn client_id(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::wire::StopReason;

    fn request() -> ApiRequest {
        ApiRequest {
            model: "mock".to_string(),
            max_tokens: 1024,
            system: None,
            messages: vec![Message::user("hi")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let client = MockClient::new();
        client.expect_tool_use(None, "tu_1", "glob", serde_json::json!({"pattern": "*"}));
        client.expect_text("done");

        let first = client.complete(&request()).await.unwrap();
        assert_eq!(first.stop_reason(), StopReason::ToolUse);

        let second = client.complete(&request()).await.unwrap();
        assert_eq!(second.stop_reason(), StopReason::EndTurn);

        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockClient::new();
        client.expect_text("ok");
        client.complete(&request()).await.unwrap();

        let recorded = client.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_error() {
        let client = MockClient::new();
        client.expect_error("boom");
        assert!(client.complete(&request()).await.is_err());
    }
}
