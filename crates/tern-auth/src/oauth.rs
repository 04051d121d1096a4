//! Interactive authorization-code + PKCE flow.
//!
//! The flow opens an authorization URL in the user's browser (on any
//! machine), listens for the redirect on a fixed local port, validates
//! the CSRF state, and exchanges the code for an access token. The
//! caller persists the token via [`crate::CredentialStore`].

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, warn};

/// Authorization endpoint.
const AUTHORIZE_URL: &str = "https://console.anthropic.com/oauth/authorize";

/// Token endpoint.
const TOKEN_URL: &str = "https://console.anthropic.com/oauth/token";

/// Public client ID.
const CLIENT_ID: &str = "9d1c250a-e61b-44cd-8913-9f323a2c5c1b";

/// Fixed local callback port.
pub const CALLBACK_PORT: u16 = 45454;

/// Requested scope.
const SCOPE: &str = "user:inference";

/// How long to wait for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Page shown in the browser after a successful authorization.
const SUCCESS_PAGE: &str = "<html><body style=\"font-family: system-ui; text-align: center; padding: 50px;\">\
<h1>Success!</h1><p>You can close this window and return to tern.</p></body></html>";

/// One run of the authorization-code flow.
pub struct PkceFlow {
    verifier: String,
    state: String,
    port: u16,
}

impl PkceFlow {
    /// Create a flow with fresh PKCE material.
    pub fn new() -> Self {
        Self {
            verifier: random_urlsafe(64),
            state: random_urlsafe(32),
            port: CALLBACK_PORT,
        }
    }

    /// The redirect URI registered with the authorization server.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.port)
    }

    /// Build the authorization URL for the user to open in a browser.
    pub fn authorize_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", CLIENT_ID)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri())
            .append_pair("scope", SCOPE)
            .append_pair("state", &self.state)
            .append_pair("code_challenge", &pkce_challenge(&self.verifier))
            .append_pair("code_challenge_method", "S256")
            .finish();
        format!("{AUTHORIZE_URL}?{query}")
    }

    /// Wait for the browser redirect and extract the authorization code.
    ///
    /// Binds the fixed callback port, accepts a single request, answers
    /// with a small HTML page, and validates the CSRF state.
    pub async fn wait_for_code(&self) -> AuthResult<String> {
        let listener = TcpListener::bind(("127.0.0.1", self.port))
            .await
            .map_err(|e| {
                AuthError::Authorization(format!("cannot bind callback port {}: {e}", self.port))
            })?;

        let accept = tokio::time::timeout(CALLBACK_TIMEOUT, listener.accept())
            .await
            .map_err(|_| AuthError::Authorization("timed out waiting for authorization".into()))?;
        let (mut stream, _) = accept?;

        let mut buf = vec![0u8; 8192];
        let n = stream.read(&mut buf).await?;
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let result = parse_callback(&request, &self.state);

        let (status, body) = match &result {
            Ok(_) => ("200 OK", SUCCESS_PAGE.to_string()),
            Err(e) => ("400 Bad Request", format!("<html><body>{e}</body></html>")),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        if let Err(e) = stream.write_all(response.as_bytes()).await {
            warn!(error = %e, "Failed to write callback response");
        }

        result
    }

    /// Exchange the authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> AuthResult<String> {
        let client = reqwest::Client::new();
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", CLIENT_ID),
            ("code", code),
            ("redirect_uri", &self.redirect_uri()),
            ("code_verifier", &self.verifier),
        ];

        let response = client.post(TOKEN_URL).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Authorization(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: serde_json::Value = serde_json::from_str(&body)?;
        let token = parsed["access_token"]
            .as_str()
            .ok_or_else(|| AuthError::Authorization("no access_token in response".into()))?;

        debug!("Token exchange succeeded");
        Ok(token.to_string())
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the S256 code challenge for a verifier.
pub fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate `len` bytes of randomness, URL-safe base64 encoded.
fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Parse the callback HTTP request and extract the authorization code.
fn parse_callback(request: &str, expected_state: &str) -> AuthResult<String> {
    // Request line looks like: GET /callback?code=...&state=... HTTP/1.1
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| AuthError::Authorization("empty callback request".into()))?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AuthError::Authorization("malformed callback request".into()))?;

    let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
    let params = parse_query(query);

    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(|s| s.as_str())
            .unwrap_or(error.as_str());
        return Err(AuthError::Authorization(description.to_string()));
    }

    let code = params
        .get("code")
        .ok_or_else(|| AuthError::Authorization("missing authorization code".into()))?;
    let state = params
        .get("state")
        .ok_or_else(|| AuthError::Authorization("missing state".into()))?;

    if state != expected_state {
        return Err(AuthError::StateMismatch);
    }

    Ok(code.clone())
}

/// Parse a URL query string into a map, percent-decoding values.
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_challenge_known_vector() {
        // RFC 7636 appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            pkce_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_authorize_url_contains_required_params() {
        let flow = PkceFlow::new();
        let url = flow.authorize_url();

        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("code_challenge="));
        assert!(url.contains("state="));
        assert!(url.contains(&format!("client_id={CLIENT_ID}")));
    }

    #[test]
    fn test_parse_callback_success() {
        let request = "GET /callback?code=abc123&state=st HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(parse_callback(request, "st").unwrap(), "abc123");
    }

    #[test]
    fn test_parse_callback_state_mismatch() {
        let request = "GET /callback?code=abc123&state=wrong HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_callback(request, "st"),
            Err(AuthError::StateMismatch)
        ));
    }

    #[test]
    fn test_parse_callback_error_param() {
        let request =
            "GET /callback?error=access_denied&error_description=user%20said%20no HTTP/1.1\r\n\r\n";
        match parse_callback(request, "st") {
            Err(AuthError::Authorization(msg)) => assert_eq!(msg, "user said no"),
            other => panic!("Expected Authorization error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_callback_missing_code() {
        let request = "GET /callback?state=st HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_callback(request, "st"),
            Err(AuthError::Authorization(_))
        ));
    }

    #[test]
    fn test_random_urlsafe_distinct() {
        assert_ne!(random_urlsafe(32), random_urlsafe(32));
    }

    #[tokio::test]
    async fn test_wait_for_code_round_trip() {
        // Use a throwaway flow but a random free port to avoid clashing
        // with a real flow on the fixed port.
        let mut flow = PkceFlow::new();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        flow.port = listener.local_addr().unwrap().port();
        drop(listener);

        let state = flow.state.clone();
        let port = flow.port;

        let server = tokio::spawn(async move { flow.wait_for_code().await });

        // Give the listener a moment to bind.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        let request =
            format!("GET /callback?code=the-code&state={state} HTTP/1.1\r\nHost: x\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.contains("200 OK"));

        let code = server.await.unwrap().unwrap();
        assert_eq!(code, "the-code");
    }
}
