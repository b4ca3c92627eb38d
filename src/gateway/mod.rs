//! Gateway to the conversational assistant service.
//!
//! The recommendation flow only needs six operations, captured by
//! [`AssistantGateway`]. [`openai::OpenAiAssistants`] implements them over
//! HTTP; tests substitute scripted gateways.

pub mod error;
pub mod openai;
pub mod types;
pub mod usage;

pub use error::{AssistantError, ErrorContext};
pub use openai::OpenAiAssistants;
pub use types::*;
pub use usage::{CallRecord, CallStatus, NoopUsageSink, TracingUsageSink, UsageSink};

#[async_trait::async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Create an empty conversation thread.
    async fn create_thread(&self) -> Result<ThreadId, AssistantError>;

    /// Append a user message to a thread.
    async fn add_user_message(&self, thread: &ThreadId, content: &str) -> Result<(), AssistantError>;

    /// Start processing the thread with the given assistant.
    async fn start_run(
        &self,
        thread: &ThreadId,
        assistant: &AssistantId,
    ) -> Result<RunStatus, AssistantError>;

    async fn run_status(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AssistantError>;

    async fn cancel_run(&self, thread: &ThreadId, run: &RunId) -> Result<RunStatus, AssistantError>;

    /// Text of the most recent assistant message, if any.
    async fn latest_assistant_message(
        &self,
        thread: &ThreadId,
    ) -> Result<Option<String>, AssistantError>;
}
