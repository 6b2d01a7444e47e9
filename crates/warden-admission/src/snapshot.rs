//! Read-only view of ledger state for diagnostics surfaces.

use serde::{Deserialize, Serialize};
use warden_core::Dimension;

use crate::ledger::RuntimeLimits;

/// Point-in-time totals per dimension plus the configured limits.
///
/// Produced by [`CapacityLedger::snapshot`](crate::CapacityLedger::snapshot);
/// computed fresh on each call, never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionSnapshot {
    /// Orchestrations confirmed in-use.
    pub active_orchestrations: u32,
    /// Orchestrations claimed but not yet confirmed.
    pub reserved_orchestrations: u32,
    /// Model-invocation slots confirmed in-use.
    pub active_model_invocations: u32,
    /// Model-invocation slots claimed but not yet confirmed.
    pub reserved_model_invocations: u32,
    /// The configured ceilings.
    pub limits: RuntimeLimits,
}

impl AdmissionSnapshot {
    /// Active count for a single dimension.
    pub fn active(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Requests => self.active_orchestrations,
            Dimension::ModelInvocations => self.active_model_invocations,
        }
    }

    /// Reserved count for a single dimension.
    pub fn reserved(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Requests => self.reserved_orchestrations,
            Dimension::ModelInvocations => self.reserved_model_invocations,
        }
    }

    /// Whether every counter is zero.
    pub fn is_idle(&self) -> bool {
        Dimension::ALL
            .iter()
            .all(|d| self.active(*d) == 0 && self.reserved(*d) == 0)
    }
}
