//! Environment configuration for the recommendation service.

use std::fmt;
use std::time::Duration;

use crate::gateway::openai::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::gateway::{AssistantError, AssistantId};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ASSISTANT_ID: &str = "READINESS_ASSISTANT_ID";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "OPENAI_TIMEOUT_SECONDS";
pub const ENV_POLL_INTERVAL_MS: &str = "READINESS_POLL_INTERVAL_MS";
pub const ENV_MAX_POLLS: &str = "READINESS_MAX_POLLS";

/// How often and how long to wait for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: 120,
        }
    }
}

/// Everything needed to reach the assistant service.
#[derive(Clone)]
pub struct AssistantConfig {
    api_key: String,
    pub assistant_id: AssistantId,
    pub base_url: String,
    pub timeout: Duration,
    pub poll: PollPolicy,
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"<redacted>")
            .field("assistant_id", &self.assistant_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("poll", &self.poll)
            .finish()
    }
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Result<Self, AssistantError> {
        let api_key = api_key.into();
        let assistant_id = assistant_id.into();
        if api_key.trim().is_empty() {
            return Err(AssistantError::config(format!("{ENV_API_KEY} is empty")));
        }
        if assistant_id.trim().is_empty() {
            return Err(AssistantError::config(format!("{ENV_ASSISTANT_ID} is empty")));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            assistant_id: AssistantId::new(assistant_id.trim()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll: PollPolicy::default(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, AssistantError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AssistantError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AssistantError::config(format!("{ENV_API_KEY} not set")))?;
        let assistant_id = lookup(ENV_ASSISTANT_ID)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AssistantError::config(format!("{ENV_ASSISTANT_ID} not set")))?;

        let mut config = Self::new(api_key, assistant_id)?;

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECONDS)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_POLL_INTERVAL_MS)? {
            config.poll.interval = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<u32>(&lookup, ENV_MAX_POLLS)? {
            if max == 0 {
                return Err(AssistantError::config(format!("{ENV_MAX_POLLS} must be >= 1")));
            }
            config.poll.max_polls = max;
        }

        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AssistantError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AssistantError::config(format!("{key} is not a valid number: {raw:?}"))),
    }
}
