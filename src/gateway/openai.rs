//! OpenAI Assistants (v2) adapter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{AssistantError, ErrorContext};
use super::types::*;
use super::usage::{CallRecord, NoopUsageSink, UsageSink};
use super::AssistantGateway;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum allowed response body length (1MB).
const MAX_RESPONSE_LEN: usize = 1_024 * 1_024;

/// How many recent messages to scan for the assistant's reply.
const MESSAGE_PAGE_SIZE: u32 = 20;

// =============================================================================
// ADAPTER
// =============================================================================

/// HTTP client for the Assistants API.
#[derive(Clone)]
pub struct OpenAiAssistants {
    client: reqwest::Client,
    base_url: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl std::fmt::Debug for OpenAiAssistants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAssistants")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiAssistants {
    /// Create with custom configuration.
    pub fn with_config(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        if api_key.trim().is_empty() {
            return Err(AssistantError::config("API key is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| AssistantError::config("Invalid API key format"))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AssistantError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            usage_sink: Arc::new(NoopUsageSink),
        })
    }

    pub fn with_usage_sink(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.usage_sink = sink;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract request ID from response headers.
    fn extract_request_id(headers: &HeaderMap) -> Option<String> {
        headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    /// Send a request, record the call, and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, AssistantError> {
        let start = Instant::now();
        let mut meta = CallMeta::default();
        let result = self.send_inner(endpoint, request, &mut meta).await;

        let record = CallRecord::new(endpoint)
            .http_status(meta.http_status)
            .request_id(meta.request_id)
            .latency(start.elapsed());
        let record = match &result {
            Ok(_) => record,
            Err(err) => record.error(err.code()),
        };
        self.usage_sink.record(record).await;

        result
    }

    async fn send_inner<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
        meta: &mut CallMeta,
    ) -> Result<T, AssistantError> {
        tracing::debug!(endpoint, "sending assistant request");

        let mut response = request.send().await?;
        let status = response.status();
        meta.http_status = Some(status.as_u16());
        meta.request_id = Self::extract_request_id(response.headers());

        // Stream response to enforce size limit
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let new_len = bytes.len() + chunk.len();
            if new_len > MAX_RESPONSE_LEN {
                return Err(AssistantError::InvalidResponse(format!(
                    "{endpoint}: response too large: {new_len} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes);

        if !status.is_success() {
            let ctx = ErrorContext::new().with_status(status.as_u16());
            let ctx = match &meta.request_id {
                Some(id) => ctx.with_request_id(id),
                None => ctx,
            };
            return Err(Self::classify_failure(status, &body, ctx));
        }

        serde_json::from_str(&body)
            .map_err(|e| AssistantError::InvalidResponse(format!("{endpoint}: invalid JSON: {e}")))
    }

    fn classify_failure(status: StatusCode, body: &str, ctx: ErrorContext) -> AssistantError {
        let parsed = serde_json::from_str::<ApiErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error);
        let (message, ctx) = match parsed {
            Some(error) => {
                let ctx = match error.code {
                    Some(code) => ctx.with_code(code),
                    None => ctx,
                };
                (
                    error
                        .message
                        .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                    ctx,
                )
            }
            None => (format!("HTTP {}", status.as_u16()), ctx),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AssistantError::Authentication {
                message,
                context: ctx,
            },
            _ => AssistantError::api(
                message,
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
                ctx,
            ),
        }
    }
}

// =============================================================================
// API TYPES
// =============================================================================

/// Response metadata captured for the call record.
#[derive(Default)]
struct CallMeta {
    http_status: Option<u16>,
    request_id: Option<String>,
}

#[derive(Serialize)]
struct EmptyBody {}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct ObjectRef {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunLastError>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Deserialize)]
struct RunLastError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}

impl From<RunObject> for RunStatus {
    fn from(run: RunObject) -> Self {
        let last_error = run
            .last_error
            .and_then(|e| match (e.code, e.message) {
                (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                (None, Some(message)) => Some(message),
                (Some(code), None) => Some(code),
                (None, None) => None,
            })
            .or_else(|| run.incomplete_details.and_then(|d| d.reason));
        Self {
            id: RunId::new(run.id),
            state: RunState::from(run.status.as_str()),
            last_error,
        }
    }
}

#[derive(Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Deserialize)]
struct TextContent {
    value: String,
}

impl MessageObject {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.as_ref())
            .map(|t| t.value.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<String>,
}

// =============================================================================
// GATEWAY IMPL
// =============================================================================

#[async_trait]
impl AssistantGateway for OpenAiAssistants {
    async fn create_thread(&self) -> Result<ThreadId, AssistantError> {
        let req = self.client.post(self.url("/threads")).json(&EmptyBody {});
        let thread: ObjectRef = self.send("threads.create", req).await?;
        Ok(ThreadId::new(thread.id))
    }

    async fn add_user_message(&self, thread: &ThreadId, content: &str) -> Result<(), AssistantError> {
        let req = self
            .client
            .post(self.url(&format!("/threads/{thread}/messages")))
            .json(&CreateMessageRequest {
                role: "user",
                content,
            });
        let _: ObjectRef = self.send("threads.messages.create", req).await?;
        Ok(())
    }

    async fn start_run(
        &self,
        thread: &ThreadId,
        assistant: &AssistantId,
    ) -> Result<RunStatus, AssistantError> {
        let req = self
            .client
            .post(self.url(&format!("/threads/{thread}/runs")))
            .json(&CreateRunRequest {
                assistant_id: assistant.as_str(),
            });
        let run: RunObject = self.send("threads.runs.create", req).await?;
        Ok(run.into())
    }

    async fn run_status(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AssistantError> {
        let req = self
            .client
            .get(self.url(&format!("/threads/{thread}/runs/{run}")));
        let run: RunObject = self.send("threads.runs.retrieve", req).await?;
        Ok(run.into())
    }

    async fn cancel_run(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AssistantError> {
        let req = self
            .client
            .post(self.url(&format!("/threads/{thread}/runs/{run}/cancel")))
            .json(&EmptyBody {});
        let run: RunObject = self.send("threads.runs.cancel", req).await?;
        Ok(run.into())
    }

    async fn latest_assistant_message(
        &self,
        thread: &ThreadId,
    ) -> Result<Option<String>, AssistantError> {
        let req = self.client.get(self.url(&format!(
            "/threads/{thread}/messages?order=desc&limit={MESSAGE_PAGE_SIZE}"
        )));
        let list: MessageList = self.send("threads.messages.list", req).await?;
        Ok(list
            .data
            .iter()
            .find(|m| m.role == "assistant")
            .map(MessageObject::text)
            .filter(|text| !text.is_empty()))
    }
}
