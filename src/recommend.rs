//! Recommendation requests against the assistant service.
//!
//! A request walks thread → message → run, then polls the run at a fixed
//! interval. Polling is a small state machine ([`RunPoller`]) with a hard cap
//! on polls. Every network call and every wait between polls races an
//! optional [`CancellationToken`], so cancelling abandons the request at once
//! instead of after the in-flight call finishes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::config::{AssistantConfig, PollPolicy};
use crate::gateway::{
    AssistantError, AssistantGateway, AssistantId, OpenAiAssistants, RunId, RunState, RunStatus,
    ThreadId, UsageSink,
};
use crate::prompts::DEFAULT_PROMPT;
use crate::scoring::Scores;

/// Upper bound on the best-effort run cancel sent while giving up.
const CANCEL_RUN_GRACE: Duration = Duration::from_secs(5);

/// Where a polled run stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Pending { polls: u32 },
    Completed { polls: u32 },
    Failed { state: RunState, message: Option<String> },
    TimedOut { polls: u32 },
    Cancelled { polls: u32 },
}

/// Counts observations of a run and decides when to stop.
#[derive(Debug, Clone)]
pub struct RunPoller {
    max_polls: u32,
    polls: u32,
}

impl RunPoller {
    pub fn new(max_polls: u32) -> Self {
        Self {
            max_polls: max_polls.max(1),
            polls: 0,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Feed one polled status; anything but `Pending` is final.
    pub fn observe(&mut self, status: &RunStatus) -> PollState {
        self.polls += 1;
        if status.state.is_success() {
            return PollState::Completed { polls: self.polls };
        }
        if status.state.is_terminal() {
            return PollState::Failed {
                state: status.state,
                message: status.last_error.clone(),
            };
        }
        if self.polls >= self.max_polls {
            return PollState::TimedOut { polls: self.polls };
        }
        PollState::Pending { polls: self.polls }
    }

    /// The caller gave up; no further observations are expected.
    pub fn cancel(&self) -> PollState {
        PollState::Cancelled { polls: self.polls }
    }
}

/// Assistant advice for one set of scores.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub text: String,
    pub thread_id: String,
    pub run_id: String,
    pub polls: u32,
}

pub struct RecommendationRequester<G: AssistantGateway> {
    gateway: Arc<G>,
    assistant_id: AssistantId,
    poll: PollPolicy,
}

impl RecommendationRequester<OpenAiAssistants> {
    /// Build the HTTP-backed requester from validated configuration.
    pub fn from_config(
        config: &AssistantConfig,
        usage_sink: Arc<dyn UsageSink>,
    ) -> Result<Self, AssistantError> {
        let gateway = OpenAiAssistants::with_config(config.api_key(), &config.base_url, config.timeout)?
            .with_usage_sink(usage_sink);
        Ok(Self::new(Arc::new(gateway), config.assistant_id.clone(), config.poll))
    }
}

impl<G: AssistantGateway> RecommendationRequester<G> {
    pub fn new(gateway: Arc<G>, assistant_id: AssistantId, poll: PollPolicy) -> Self {
        Self {
            gateway,
            assistant_id,
            poll,
        }
    }

    pub fn prompt_for(&self, scores: &Scores) -> String {
        DEFAULT_PROMPT.render(&scores.pillars)
    }

    /// Ask the assistant for advice on `scores`.
    pub async fn request(
        &self,
        scores: &Scores,
        cancel: Option<&CancellationToken>,
    ) -> Result<Recommendation, AssistantError> {
        let prompt = self.prompt_for(scores);

        let thread = until_cancelled(cancel, self.gateway.create_thread()).await?;
        tracing::debug!(thread = %thread, prompt = DEFAULT_PROMPT.slug, "created thread");

        until_cancelled(cancel, self.gateway.add_user_message(&thread, &prompt)).await?;

        let run = until_cancelled(cancel, self.gateway.start_run(&thread, &self.assistant_id)).await?;
        tracing::debug!(thread = %thread, run = %run.id, state = %run.state, "started run");

        let polls = self.wait_for_run(&thread, &run.id, cancel).await?;

        let text = until_cancelled(cancel, self.gateway.latest_assistant_message(&thread))
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or(AssistantError::EmptyRecommendation)?;

        tracing::info!(thread = %thread, run = %run.id, polls, "recommendation received");
        Ok(Recommendation {
            text,
            thread_id: thread.0,
            run_id: run.id.0,
            polls,
        })
    }

    async fn wait_for_run(
        &self,
        thread: &ThreadId,
        run: &RunId,
        cancel: Option<&CancellationToken>,
    ) -> Result<u32, AssistantError> {
        let mut poller = RunPoller::new(self.poll.max_polls);
        loop {
            let state = match until_cancelled(cancel, self.gateway.run_status(thread, run)).await {
                Ok(status) => {
                    tracing::debug!(run = %run, state = %status.state, "polled run");
                    poller.observe(&status)
                }
                Err(AssistantError::Cancelled) => poller.cancel(),
                Err(err) => return Err(err),
            };

            match state {
                PollState::Pending { .. } => {}
                PollState::Completed { polls } => return Ok(polls),
                PollState::Failed { state, message } => {
                    tracing::warn!(run = %run, %state, message = message.as_deref(), "run did not complete");
                    return Err(AssistantError::RunFailed { state, message });
                }
                PollState::TimedOut { polls } => {
                    tracing::warn!(run = %run, polls, "run still pending, giving up");
                    self.cancel_quietly(thread, run).await;
                    return Err(AssistantError::TimedOut { polls });
                }
                PollState::Cancelled { polls } => {
                    tracing::info!(run = %run, polls, "recommendation cancelled");
                    self.cancel_quietly(thread, run).await;
                    return Err(AssistantError::Cancelled);
                }
            }

            // A cancel during the wait is picked up by the next status call,
            // which returns before sending anything.
            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = sleep(self.poll.interval) => {}
                    }
                }
                None => sleep(self.poll.interval).await,
            }
        }
    }

    /// Best-effort run cancel; errors are logged, not returned.
    async fn cancel_quietly(&self, thread: &ThreadId, run: &RunId) {
        match timeout(CANCEL_RUN_GRACE, self.gateway.cancel_run(thread, run)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => tracing::warn!(run = %run, error = %err, "failed to cancel run"),
            Err(_) => tracing::warn!(run = %run, "cancel request did not finish in time"),
        }
    }
}

/// Run one gateway step unless `cancel` fires first. A token that is already
/// cancelled wins without the step ever being polled.
async fn until_cancelled<T, F>(cancel: Option<&CancellationToken>, step: F) -> Result<T, AssistantError>
where
    F: Future<Output = Result<T, AssistantError>>,
{
    match cancel {
        None => step.await,
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(AssistantError::Cancelled),
                result = step => result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: RunState) -> RunStatus {
        RunStatus {
            id: RunId::new("run_1"),
            state,
            last_error: None,
        }
    }

    #[test]
    fn poller_completes() {
        let mut poller = RunPoller::new(5);
        assert_eq!(
            poller.observe(&status(RunState::Queued)),
            PollState::Pending { polls: 1 }
        );
        assert_eq!(
            poller.observe(&status(RunState::Completed)),
            PollState::Completed { polls: 2 }
        );
    }

    #[test]
    fn poller_reports_failure_with_reason() {
        let mut poller = RunPoller::new(5);
        let mut failed = status(RunState::Failed);
        failed.last_error = Some("server_error: boom".into());
        assert_eq!(
            poller.observe(&failed),
            PollState::Failed {
                state: RunState::Failed,
                message: Some("server_error: boom".into()),
            }
        );
    }

    #[test]
    fn poller_times_out_at_cap() {
        let mut poller = RunPoller::new(3);
        assert!(matches!(
            poller.observe(&status(RunState::InProgress)),
            PollState::Pending { .. }
        ));
        assert!(matches!(
            poller.observe(&status(RunState::InProgress)),
            PollState::Pending { .. }
        ));
        assert_eq!(
            poller.observe(&status(RunState::InProgress)),
            PollState::TimedOut { polls: 3 }
        );
    }

    #[test]
    fn terminal_state_on_last_poll_wins_over_timeout() {
        let mut poller = RunPoller::new(1);
        assert_eq!(
            poller.observe(&status(RunState::Completed)),
            PollState::Completed { polls: 1 }
        );
    }

    #[test]
    fn cancel_reports_polls_so_far() {
        let mut poller = RunPoller::new(5);
        poller.observe(&status(RunState::InProgress));
        assert_eq!(poller.cancel(), PollState::Cancelled { polls: 1 });
    }

    #[test]
    fn zero_cap_still_allows_one_poll() {
        let mut poller = RunPoller::new(0);
        assert_eq!(
            poller.observe(&status(RunState::Queued)),
            PollState::TimedOut { polls: 1 }
        );
    }
}
