//! Transaction submission and finalization monitoring.
//!
//! # Responsibilities
//! - Submit a prepared payload through the gateway (no retries)
//! - Poll the handle at a fixed interval until a terminal state
//! - Interpret the finalized outcome as success (with events) or rejection
//! - Stop on the poll policy's attempt/deadline limits or on cancellation

use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{
    ContractEvent, ContractInitializedEvent, LifecycleError, LifecycleResult,
    SummaryResult, TransactionHandle, TransactionOutcome, TransactionPayload, TransactionStatus,
    TransactionStatusKind,
};
use crate::config::schema::PollingConfig;
use crate::lifecycle::CancelToken;
use crate::observability::metrics;

/// How long to keep polling a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay before every status query.
    pub interval: Duration,
    /// Give up after this many non-terminal polls.
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since polling began.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: None,
            deadline: None,
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
            deadline: config.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Drives state-changing contract calls from submission to a terminal outcome.
pub struct TransactionLifecycle<G> {
    gateway: G,
    policy: PollPolicy,
}

impl<G: ChainGateway> TransactionLifecycle<G> {
    pub fn new(gateway: G, policy: PollPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit `payload` signed by `signer` and wait for its terminal outcome.
    ///
    /// Submission failures propagate immediately. Only "not yet finalized"
    /// is retried.
    pub async fn submit_and_await(
        &self,
        signer: &str,
        payload: &TransactionPayload,
        cancel: &CancelToken,
    ) -> LifecycleResult<TransactionOutcome> {
        let handle = self
            .gateway
            .send_transaction(signer, payload)
            .await
            .map_err(LifecycleError::Submission)?;

        metrics::record_submission(payload.kind());
        tracing::info!(
            tx_hash = %handle,
            kind = payload.kind(),
            signer = signer,
            "Transaction submitted"
        );

        self.await_outcome(&handle, cancel).await
    }

    /// Poll an already submitted transaction until it reaches a terminal state.
    pub async fn await_outcome(
        &self,
        handle: &TransactionHandle,
        cancel: &CancelToken,
    ) -> LifecycleResult<TransactionOutcome> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => break Err(LifecycleError::Cancelled),
                _ = sleep(self.policy.interval) => {}
            }

            attempts += 1;
            metrics::record_poll();

            let status = tokio::select! {
                _ = cancel.cancelled() => break Err(LifecycleError::Cancelled),
                status = self.gateway.get_transaction_status(handle) => status,
            };

            let status = match status {
                Ok(status) => status,
                Err(e) => break Err(LifecycleError::Gateway(e)),
            };

            match interpret_status(handle, status) {
                Ok(Some(outcome)) => break Ok(outcome),
                Ok(None) => {
                    tracing::debug!(tx_hash = %handle, attempt = attempts, "Transaction pending");
                }
                Err(e) => break Err(e),
            }

            if self.policy.max_attempts.is_some_and(|max| attempts >= max)
                || self.policy.deadline.is_some_and(|d| started.elapsed() >= d)
            {
                break Ok(TransactionOutcome::TimedOut { attempts });
            }
        };

        let elapsed = started.elapsed();
        match &result {
            Ok(outcome) => {
                metrics::record_outcome(outcome.label(), elapsed);
                tracing::info!(
                    tx_hash = %handle,
                    outcome = outcome.label(),
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Transaction resolved"
                );
            }
            Err(e) => {
                metrics::record_outcome("error", elapsed);
                tracing::warn!(tx_hash = %handle, attempts, error = %e, "Transaction wait failed");
            }
        }
        result
    }

    /// Create a contract instance and return the initialization event.
    ///
    /// Rejection and timeout become errors here, since the caller needs the
    /// new address.
    pub async fn initialize(
        &self,
        signer: &str,
        payload: &TransactionPayload,
        cancel: &CancelToken,
    ) -> LifecycleResult<ContractInitializedEvent> {
        let events = self
            .submit_and_await(signer, payload, cancel)
            .await?
            .into_events()?;
        first_init_event(events)
    }
}

/// Map a gateway status to an outcome; `Ok(None)` means keep polling.
fn interpret_status(
    handle: &TransactionHandle,
    status: Option<TransactionStatus>,
) -> LifecycleResult<Option<TransactionOutcome>> {
    let status = status.ok_or_else(|| LifecycleError::Lookup(handle.clone()))?;
    if status.status != TransactionStatusKind::Finalized {
        return Ok(None);
    }

    let outcomes = status.outcomes.unwrap_or_default();
    if outcomes.len() > 1 {
        tracing::warn!(
            tx_hash = %handle,
            blocks = outcomes.len(),
            "Finalized transaction reports several outcomes; using the first"
        );
    }
    let summary = outcomes
        .into_values()
        .next()
        .ok_or(LifecycleError::MissingOutcome)?;

    Ok(Some(match summary.result {
        SummaryResult::Success { events } => TransactionOutcome::Success { events },
        SummaryResult::Reject { reject_reason } => TransactionOutcome::Rejected {
            reason: reject_reason,
        },
    }))
}

/// The first event, read as a contract initialization.
pub fn first_init_event(events: Vec<ContractEvent>) -> LifecycleResult<ContractInitializedEvent> {
    match events.into_iter().next() {
        Some(ContractEvent::ContractInitialized(event)) => Ok(event),
        _ => Err(LifecycleError::MissingInitEvent),
    }
}
