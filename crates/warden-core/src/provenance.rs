//! Dispatch provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a dispatch request was triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Triggered directly by a user action.
    Manual,
    /// Triggered by a scheduler or recurring job.
    Scheduled,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}
