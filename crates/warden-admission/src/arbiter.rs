//! Admission arbiter — the acquire protocol over the capacity ledger.
//!
//! `acquire` is a suspendable async operation: it may sleep between capacity
//! re-checks but never blocks other callers. Requests that can never fit
//! (a single dimension above its configured ceiling) are rejected without
//! polling; transient shortages are retried until success, deadline, or
//! cancellation.
//!
//! No FIFO fairness is guaranteed between waiters: each retries on its own
//! cadence, and whichever attempt lands first after a release wins.

use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use warden_core::{Dimension, Provenance, ResourceBundle};
use warden_settings::AdmissionSettings;

use crate::errors::AdmissionError;
use crate::lease::Lease;
use crate::ledger::{CapacityLedger, CapacityShortage, RuntimeLimits};
use crate::metrics::{ADMISSION_DECISIONS_TOTAL, ADMISSION_WAIT_SECONDS};
use crate::snapshot::AdmissionSnapshot;

/// A caller's request to start one orchestration.
#[derive(Clone, Debug)]
pub struct DispatchRequest {
    /// Tool/operation identifier, used for logging and diagnostics only.
    pub tool: String,
    /// Additional resource amounts needed per dimension.
    pub bundle: ResourceBundle,
    /// How the dispatch was triggered.
    pub provenance: Provenance,
    /// Maximum wait for capacity. Zero means no waiting: fail fast on the
    /// first shortage.
    pub max_wait_ms: u64,
    /// Interval between capacity re-checks while waiting. Must be positive.
    pub poll_interval_ms: u64,
}

impl DispatchRequest {
    /// Create a fail-fast request (no waiting) with manual provenance.
    pub fn new(tool: impl Into<String>, bundle: ResourceBundle) -> Self {
        Self {
            tool: tool.into(),
            bundle,
            provenance: Provenance::Manual,
            max_wait_ms: 0,
            poll_interval_ms: AdmissionSettings::default().default_poll_interval_ms,
        }
    }

    /// Apply the configured wait defaults (max wait and poll interval).
    pub fn with_defaults_from(mut self, settings: &AdmissionSettings) -> Self {
        self.max_wait_ms = settings.default_max_wait_ms;
        self.poll_interval_ms = settings.default_poll_interval_ms;
        self
    }

    /// Set the provenance tag.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Set the maximum wait in milliseconds.
    pub fn with_max_wait_ms(mut self, max_wait_ms: u64) -> Self {
        self.max_wait_ms = max_wait_ms;
        self
    }

    /// Set the poll interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

/// Outcome of an admission attempt.
///
/// Capacity conditions are always reported through this shape, never as
/// errors: `timed_out` is true only when the deadline elapsed while
/// capacity was transiently unavailable, and `reasons` is non-empty exactly
/// when admission was denied.
#[derive(Debug)]
pub struct Permit {
    /// Whether admission was granted.
    pub allowed: bool,
    /// The granted lease; present iff `allowed`.
    pub lease: Option<Lease>,
    /// True only when the deadline elapsed during a transient shortage.
    pub timed_out: bool,
    /// Ordered rejection/explanation codes; empty iff `allowed`.
    pub reasons: Vec<String>,
}

impl Permit {
    fn granted(lease: Lease) -> Self {
        Self {
            allowed: true,
            lease: Some(lease),
            timed_out: false,
            reasons: Vec::new(),
        }
    }

    fn denied(reasons: Vec<String>) -> Self {
        Self {
            allowed: false,
            lease: None,
            timed_out: false,
            reasons,
        }
    }

    fn timeout(reasons: Vec<String>) -> Self {
        Self {
            allowed: false,
            lease: None,
            timed_out: true,
            reasons,
        }
    }

    /// Consume the permit, returning the lease if admission was granted.
    pub fn into_lease(self) -> Option<Lease> {
        self.lease
    }
}

/// Coordinates admission across many concurrent callers.
///
/// Holds the capacity ledger behind an `Arc` so granted leases can free
/// their slots independently of the arbiter's lifetime.
#[derive(Debug)]
pub struct AdmissionArbiter {
    ledger: Arc<CapacityLedger>,
}

impl AdmissionArbiter {
    /// Create an arbiter with a fresh ledger.
    pub fn new(limits: RuntimeLimits) -> Self {
        Self {
            ledger: Arc::new(CapacityLedger::new(limits)),
        }
    }

    /// Create an arbiter over an existing ledger (dependency injection).
    pub fn with_ledger(ledger: Arc<CapacityLedger>) -> Self {
        Self { ledger }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &Arc<CapacityLedger> {
        &self.ledger
    }

    /// Read-only view of current usage and limits.
    pub fn snapshot(&self) -> AdmissionSnapshot {
        self.ledger.snapshot()
    }

    /// Clear the ledger to zero between isolated test runs.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset_transient_state(&self) {
        self.ledger.reset();
    }

    /// Acquire a permit, waiting up to the request's deadline for capacity.
    ///
    /// Never blocks other callers; suspension happens only between poll
    /// attempts. The only error is a contract violation in the request —
    /// every capacity outcome is reported through the returned [`Permit`].
    pub async fn acquire(&self, request: &DispatchRequest) -> Result<Permit, AdmissionError> {
        self.acquire_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// [`acquire`](Self::acquire), aborting the wait when `cancel` fires.
    ///
    /// Cancellation terminates the poll loop promptly and returns a
    /// non-timed-out denial; no reservation is taken on that path.
    #[instrument(
        skip(self, request, cancel),
        fields(tool = %request.tool, provenance = %request.provenance)
    )]
    pub async fn acquire_with_cancellation(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<Permit, AdmissionError> {
        if request.poll_interval_ms == 0 {
            return Err(AdmissionError::InvalidRequest(
                "poll_interval_ms must be positive".into(),
            ));
        }

        // Fast-reject: a request no amount of waiting can ever satisfy.
        let limits = self.ledger.limits();
        let permanent: Vec<Dimension> = Dimension::ALL
            .into_iter()
            .filter(|d| request.bundle.amount(*d) > limits.limit(*d))
            .collect();
        if !permanent.is_empty() {
            counter!(ADMISSION_DECISIONS_TOTAL, "outcome" => "rejected").increment(1);
            warn!(reasons = permanent.len(), "admission permanently rejected");
            return Ok(Permit::denied(permanent_reasons(
                &request.bundle,
                limits,
                &permanent,
            )));
        }

        let max_wait = Duration::from_millis(request.max_wait_ms);
        let poll_interval = Duration::from_millis(request.poll_interval_ms);
        let start = Instant::now();
        let deadline = start + max_wait;

        loop {
            match self.ledger.try_reserve(&request.bundle) {
                Ok(token) => {
                    let lease = Lease::new(token, Arc::clone(&self.ledger));
                    counter!(ADMISSION_DECISIONS_TOTAL, "outcome" => "granted").increment(1);
                    histogram!(ADMISSION_WAIT_SECONDS).record(start.elapsed().as_secs_f64());
                    info!(lease_id = %lease.id(), "admission granted");
                    return Ok(Permit::granted(lease));
                }
                Err(shortage) => {
                    if max_wait.is_zero() {
                        counter!(ADMISSION_DECISIONS_TOTAL, "outcome" => "fail_fast").increment(1);
                        debug!(%shortage, "admission denied without waiting");
                        return Ok(Permit::denied(shortage_reasons(&shortage)));
                    }

                    let now = Instant::now();
                    if now >= deadline {
                        counter!(ADMISSION_DECISIONS_TOTAL, "outcome" => "timeout").increment(1);
                        warn!(waited_ms = request.max_wait_ms, %shortage, "admission timed out");
                        let mut reasons = vec![format!(
                            "timed out after {}ms waiting for capacity",
                            request.max_wait_ms
                        )];
                        reasons.extend(shortage_reasons(&shortage));
                        return Ok(Permit::timeout(reasons));
                    }

                    // Re-check at the next poll tick, but never past the
                    // deadline; a cancelled caller stops polling without
                    // touching the ledger.
                    let next_check = cmp::min(now + poll_interval, deadline);
                    tokio::select! {
                        () = cancel.cancelled() => {
                            counter!(ADMISSION_DECISIONS_TOTAL, "outcome" => "cancelled")
                                .increment(1);
                            debug!("admission wait cancelled");
                            return Ok(Permit::denied(vec![
                                "wait cancelled before capacity became available".to_string(),
                            ]));
                        }
                        () = tokio::time::sleep_until(next_check) => {}
                    }
                }
            }
        }
    }
}

fn permanent_reasons(
    bundle: &ResourceBundle,
    limits: RuntimeLimits,
    dimensions: &[Dimension],
) -> Vec<String> {
    dimensions
        .iter()
        .map(|d| {
            format!(
                "{d}: requested {} permanently exceeds limit {}",
                bundle.amount(*d),
                limits.limit(*d)
            )
        })
        .collect()
}

fn shortage_reasons(shortage: &CapacityShortage) -> Vec<String> {
    shortage
        .dimensions
        .iter()
        .map(|d| format!("{d}: transient capacity shortage"))
        .collect()
}
