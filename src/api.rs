//! Mem API client: health probe and thread upload.

use serde_json::Value;
use std::io;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;
use crate::payload::ThreadPayload;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of a failed response body kept in the error message
const ERROR_BODY_CHARS: usize = 200;

/// Blocking HTTP client for a Mem server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    auth_token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, auth_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Redirects are never followed, so a 3xx surfaces as its own status.
    fn request(&self, method: &str, path: &str, timeout: Duration) -> ureq::Request {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(0)
            .build();
        agent
            .request(method, &format!("{}{path}", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.auth_token))
            .set("Content-Type", "application/json")
    }

    /// Returns true only when `GET /health` answers 200. Never errors.
    pub fn health_check(&self) -> bool {
        match self.request("GET", "/health", HEALTH_TIMEOUT).call() {
            Ok(response) => {
                debug!(status = response.status(), "health check");
                response.status() == 200
            }
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    /// Upload a thread with `POST /threads`, returning the decoded response body
    pub fn save_thread(&self, payload: &ThreadPayload) -> Result<Value, ApiError> {
        debug!(url = %format!("{}/threads", self.base_url), thread_id = %payload.thread_id, "uploading thread");
        let response = match self
            .request("POST", "/threads", UPLOAD_TIMEOUT)
            .send_json(payload)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(status_error(status, response));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(transport_error(&transport));
            }
        };

        let status = response.status();
        debug!(status, "upload response");
        if status != 200 && status != 201 {
            return Err(status_error(status, response));
        }
        response
            .into_json::<Value>()
            .map_err(|err| ApiError::Unexpected(err.to_string()))
    }
}

fn status_error(status: u16, response: ureq::Response) -> ApiError {
    let body = response.into_string().unwrap_or_default();
    ApiError::Status {
        status,
        body: body.chars().take(ERROR_BODY_CHARS).collect(),
    }
}

fn transport_error(transport: &ureq::Transport) -> ApiError {
    let timed_out = std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|err| matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock));
    if timed_out {
        ApiError::Timeout(transport.to_string())
    } else {
        ApiError::Request(transport.to_string())
    }
}

/// Identifiers of a saved thread, as reported back by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub id: String,
    pub message_count: String,
}

impl ThreadSummary {
    /// Read `thread.{thread_id,id,message_count}`, with "N/A" for anything missing
    pub fn from_response(response: &Value) -> Self {
        let field = |name: &str| match response.pointer(&format!("/thread/{name}")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "N/A".to_string(),
            Some(other) => other.to_string(),
        };
        Self {
            thread_id: field("thread_id"),
            id: field("id"),
            message_count: field("message_count"),
        }
    }
}
