//! Submit-and-poll loop for long-running operations.
//!
//! The loop is an explicit state machine driven by a scheduler-agnostic
//! [`PollDelay`], so the same logic runs under any executor and tests can
//! step it without real waiting. Polls are strictly sequential: each
//! re-fetch depends on the previous handle.

use crate::error::{Result, VeoGenError};
use crate::operation::Operation;
use crate::request::GenerationRequest;
use crate::service::VideoService;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Fixed delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Suspension point between poll attempts.
#[async_trait]
pub trait PollDelay: Send + Sync {
    /// Suspends until the next status check should run.
    async fn wait(&self);
}

/// Fixed-interval delay backed by the tokio timer.
#[derive(Debug, Clone)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    /// Creates a delay of the given interval.
    pub fn new(interval: Duration) -> Self {
        Self(interval)
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_POLL_INTERVAL)
    }
}

#[async_trait]
impl PollDelay for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Where a generation run currently stands.
#[derive(Debug)]
enum PollState {
    /// Accepted by the server; status not yet re-checked.
    Submitted(Operation),
    /// Still running after `polls` status re-fetches.
    Polling {
        /// Latest operation handle.
        operation: Operation,
        /// Re-fetches performed so far.
        polls: u32,
    },
    /// Terminal: the server reported completion.
    Done(Operation),
    /// Terminal: a call failed or a guard tripped.
    Failed(VeoGenError),
}

/// Drives an operation from submission to completion.
///
/// By default the poller waits indefinitely, matching the service's lack of
/// a completion bound; an operation that never finishes polls forever.
/// [`with_max_polls`](Self::with_max_polls) and
/// [`with_max_wait`](Self::with_max_wait) bound the wait. A run cannot be
/// cancelled once started (known limitation); drop the future to abandon it.
pub struct OperationPoller<'a, S: ?Sized> {
    service: &'a S,
    delay: Box<dyn PollDelay>,
    max_polls: Option<u32>,
    max_wait: Option<Duration>,
}

impl<'a, S: VideoService + ?Sized> OperationPoller<'a, S> {
    /// Creates a poller with the default fixed 1 s delay and no bounds.
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            delay: Box::new(FixedDelay::default()),
            max_polls: None,
            max_wait: None,
        }
    }

    /// Substitutes the inter-poll delay.
    pub fn with_delay(mut self, delay: impl PollDelay + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Bounds the number of status re-fetches.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Bounds the total wall-clock wait.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Submits the request and polls until the operation is terminal.
    pub async fn run(&self, request: &GenerationRequest) -> Result<Operation> {
        let started = Instant::now();
        let mut state = match self.service.submit(request).await {
            Ok(operation) => PollState::Submitted(operation),
            Err(error) => PollState::Failed(error),
        };

        loop {
            state = match state {
                PollState::Done(operation) => return Ok(operation),
                PollState::Failed(error) => return Err(error),
                PollState::Submitted(operation) => self.advance(operation, 0, started).await,
                PollState::Polling { operation, polls } => {
                    self.advance(operation, polls, started).await
                }
            };
        }
    }

    /// One state-machine step: finish, trip a guard, or wait and re-fetch.
    async fn advance(&self, operation: Operation, polls: u32, started: Instant) -> PollState {
        if operation.is_done() {
            return PollState::Done(operation);
        }

        let budget_spent = self.max_polls.is_some_and(|limit| polls >= limit)
            || self.max_wait.is_some_and(|limit| started.elapsed() >= limit);
        if budget_spent {
            return PollState::Failed(VeoGenError::PollBudgetExhausted {
                polls,
                waited: started.elapsed(),
            });
        }

        tracing::debug!(operation = %operation.name, polls, "waiting for completion");
        self.delay.wait().await;

        match self.service.poll(&operation).await {
            Ok(next) => PollState::Polling {
                operation: next,
                polls: polls + 1,
            },
            Err(error) => PollState::Failed(error),
        }
    }
}
