//! # warden-admission
//!
//! Capacity-aware admission control for concurrent orchestrations.
//!
//! Callers request a bundle of scarce resources (request slots, concurrent
//! model-invocation slots) before starting a unit of work. The arbiter
//! atomically decides, reserves, and later releases capacity across many
//! concurrent callers, with bounded waiting for transient shortages and
//! immediate rejection of requests that can never fit.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `ledger` | Reserved/active counters per dimension behind one mutex |
//! | `lease` | Two-phase caller handle: reserved → consumed → released |
//! | `arbiter` | The acquire protocol: fast-reject, poll loop, deadline |
//! | `catalog` | Caller-populated tool → bundle registry |
//! | `snapshot` | Read-only diagnostics view |
//! | `errors` | Contract-violation errors |
//! | `metrics` | Metric name constants |
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: warden-core, warden-settings.

#![deny(unsafe_code)]

pub mod arbiter;
pub mod catalog;
pub mod errors;
pub mod lease;
pub mod ledger;
pub mod metrics;
pub mod snapshot;

// Re-export main public API
pub use arbiter::{AdmissionArbiter, DispatchRequest, Permit};
pub use catalog::ToolCatalog;
pub use errors::AdmissionError;
pub use lease::{Lease, LeaseState};
pub use ledger::{CapacityLedger, CapacityShortage, HeldState, ReservationToken, RuntimeLimits};
pub use snapshot::AdmissionSnapshot;
