//! Resource dimensions and per-orchestration bundles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One tracked resource axis.
///
/// Every ledger counter, limit, and bundle amount is keyed by a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Total active orchestrations (outstanding request slots).
    Requests,
    /// Concurrent model-invocation slots.
    ModelInvocations,
}

impl Dimension {
    /// All dimensions, in ledger evaluation order.
    pub const ALL: [Dimension; 2] = [Dimension::Requests, Dimension::ModelInvocations];

    /// Stable name used in reasons, logs, and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::ModelInvocations => "model_invocations",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension amounts one orchestration requests or holds.
///
/// Amounts are `u32`, so negative requests are unrepresentable. A bundle
/// with all amounts zero is valid and trivially admissible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceBundle {
    /// Additional request slots needed.
    pub requests: u32,
    /// Additional model-invocation slots needed.
    pub model_invocations: u32,
}

impl ResourceBundle {
    /// Create a bundle with explicit per-dimension amounts.
    pub fn new(requests: u32, model_invocations: u32) -> Self {
        Self {
            requests,
            model_invocations,
        }
    }

    /// Amount requested for a single dimension.
    pub fn amount(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Requests => self.requests,
            Dimension::ModelInvocations => self.model_invocations,
        }
    }

    /// Whether every amount is zero.
    pub fn is_empty(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.amount(*d) == 0)
    }
}
