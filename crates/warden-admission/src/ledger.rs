//! Capacity ledger — reserved/active accounting per resource dimension.
//!
//! The ledger is the only shared mutable state in the admission subsystem.
//! A single `parking_lot::Mutex` covers the entire check-and-reserve
//! sequence, so no caller ever observes counters that are the product of
//! half of another operation. Ledger operations are synchronous and never
//! suspend while holding the lock.

use metrics::gauge;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_core::{Dimension, ResourceBundle};
use warden_settings::LimitSettings;

use crate::metrics::{ADMISSION_ACTIVE_SLOTS, ADMISSION_RESERVED_SLOTS};
use crate::snapshot::AdmissionSnapshot;

/// Immutable per-dimension capacity ceilings.
///
/// Constructed once at startup (from settings or directly) and read-only
/// thereafter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeLimits {
    /// Maximum total active orchestrations/requests.
    pub max_active_requests: u32,
    /// Maximum concurrent model-invocation slots.
    pub max_model_invocations: u32,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self::from(&LimitSettings::default())
    }
}

impl From<&LimitSettings> for RuntimeLimits {
    fn from(settings: &LimitSettings) -> Self {
        Self {
            max_active_requests: settings.max_active_requests,
            max_model_invocations: settings.max_model_invocations,
        }
    }
}

impl RuntimeLimits {
    /// Create limits with explicit per-dimension ceilings.
    pub fn new(max_active_requests: u32, max_model_invocations: u32) -> Self {
        Self {
            max_active_requests,
            max_model_invocations,
        }
    }

    /// Ceiling for a single dimension.
    pub fn limit(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Requests => self.max_active_requests,
            Dimension::ModelInvocations => self.max_model_invocations,
        }
    }
}

/// Granted reservation amounts, held by a lease until freed.
#[derive(Debug)]
pub struct ReservationToken {
    bundle: ResourceBundle,
}

impl ReservationToken {
    /// The amounts this token holds in the ledger.
    pub fn bundle(&self) -> &ResourceBundle {
        &self.bundle
    }
}

/// Which counter currently holds a token's amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeldState {
    /// Claimed but not yet confirmed as active.
    Reserved,
    /// Confirmed in-use.
    Active,
}

/// All-or-nothing reservation failure listing the dimensions that did not
/// fit. The ledger was not mutated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("insufficient capacity for: {}", join_dimensions(.dimensions))]
pub struct CapacityShortage {
    /// Exceeded dimensions, in ledger evaluation order.
    pub dimensions: Vec<Dimension>,
}

fn join_dimensions(dimensions: &[Dimension]) -> String {
    dimensions
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-dimension counter pair.
#[derive(Clone, Copy, Debug, Default)]
struct DimensionCounters {
    reserved: u32,
    active: u32,
}

#[derive(Debug, Default)]
struct Counters {
    requests: DimensionCounters,
    model_invocations: DimensionCounters,
}

impl Counters {
    fn slot(&self, dimension: Dimension) -> DimensionCounters {
        match dimension {
            Dimension::Requests => self.requests,
            Dimension::ModelInvocations => self.model_invocations,
        }
    }

    fn slot_mut(&mut self, dimension: Dimension) -> &mut DimensionCounters {
        match dimension {
            Dimension::Requests => &mut self.requests,
            Dimension::ModelInvocations => &mut self.model_invocations,
        }
    }
}

/// Process-local capacity ledger.
///
/// Tracks a *reserved* and an *active* count for every dimension. Invariant:
/// `reserved + active <= limit` per dimension immediately after any
/// successful reservation. Reservations are all-or-nothing across the
/// requested bundle; partial reservations never occur.
#[derive(Debug)]
pub struct CapacityLedger {
    limits: RuntimeLimits,
    counters: Mutex<Counters>,
}

impl CapacityLedger {
    /// Create a ledger with all counters at zero.
    pub fn new(limits: RuntimeLimits) -> Self {
        Self {
            limits,
            counters: Mutex::new(Counters::default()),
        }
    }

    /// The configured ceilings.
    pub fn limits(&self) -> RuntimeLimits {
        self.limits
    }

    /// Atomically reserve a bundle across all dimensions.
    ///
    /// Under a single mutex section, checks `reserved + active + amount`
    /// against the limit for every dimension. Commits the increments only
    /// if all dimensions fit; otherwise returns the exceeded dimensions
    /// without mutating state.
    pub fn try_reserve(
        &self,
        bundle: &ResourceBundle,
    ) -> Result<ReservationToken, CapacityShortage> {
        let mut counters = self.counters.lock();

        let exceeded: Vec<Dimension> = Dimension::ALL
            .into_iter()
            .filter(|d| {
                let slot = counters.slot(*d);
                u64::from(slot.reserved) + u64::from(slot.active) + u64::from(bundle.amount(*d))
                    > u64::from(self.limits.limit(*d))
            })
            .collect();
        if !exceeded.is_empty() {
            return Err(CapacityShortage {
                dimensions: exceeded,
            });
        }

        for d in Dimension::ALL {
            // Cannot overflow: the sum was checked against the limit above.
            counters.slot_mut(d).reserved += bundle.amount(d);
        }
        record_gauges(&counters);
        Ok(ReservationToken { bundle: *bundle })
    }

    /// Move a token's amounts from *reserved* to *active*.
    pub fn commit(&self, token: &ReservationToken) {
        let mut counters = self.counters.lock();
        for d in Dimension::ALL {
            let amount = token.bundle.amount(d);
            let slot = counters.slot_mut(d);
            slot.reserved = slot.reserved.saturating_sub(amount);
            slot.active = slot.active.saturating_add(amount);
        }
        record_gauges(&counters);
    }

    /// Subtract a token's amounts from the counter named by `from`.
    ///
    /// Saturating: at-most-once semantics are the lease's responsibility,
    /// not the ledger's.
    pub fn free(&self, token: &ReservationToken, from: HeldState) {
        let mut counters = self.counters.lock();
        for d in Dimension::ALL {
            let amount = token.bundle.amount(d);
            let slot = counters.slot_mut(d);
            match from {
                HeldState::Reserved => slot.reserved = slot.reserved.saturating_sub(amount),
                HeldState::Active => slot.active = slot.active.saturating_sub(amount),
            }
        }
        record_gauges(&counters);
    }

    /// Consistent point-in-time read of all counters and limits.
    ///
    /// Computed fresh on each call — never cached.
    pub fn snapshot(&self) -> AdmissionSnapshot {
        let counters = self.counters.lock();
        AdmissionSnapshot {
            active_orchestrations: counters.requests.active,
            reserved_orchestrations: counters.requests.reserved,
            active_model_invocations: counters.model_invocations.active,
            reserved_model_invocations: counters.model_invocations.reserved,
            limits: self.limits,
        }
    }

    /// Zero all counters to re-establish a clean baseline between isolated
    /// test runs. Never called in normal operation.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) {
        let mut counters = self.counters.lock();
        *counters = Counters::default();
        record_gauges(&counters);
    }
}

fn record_gauges(counters: &Counters) {
    for d in Dimension::ALL {
        let slot = counters.slot(d);
        gauge!(ADMISSION_RESERVED_SLOTS, "dimension" => d.as_str()).set(f64::from(slot.reserved));
        gauge!(ADMISSION_ACTIVE_SLOTS, "dimension" => d.as_str()).set(f64::from(slot.active));
    }
}
