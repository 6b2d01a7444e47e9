//! Lease — caller-held two-phase capacity handle.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use warden_core::{LeaseId, ResourceBundle};

use crate::ledger::{CapacityLedger, HeldState, ReservationToken};

/// Lease lifecycle states. There is no transition back to `Reserved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaseState {
    /// Capacity claimed but not yet confirmed as active.
    Reserved,
    /// Capacity confirmed in-use.
    Consumed,
    /// Capacity returned to the ledger.
    Released,
}

/// Caller-held handle over a granted reservation.
///
/// `consume()` moves the bundle from *reserved* to *active* accounting;
/// `release()` frees whichever counter currently holds it. Both are
/// idempotent and never fail: misuse (double-consume, consume after
/// release) degrades to a no-op.
///
/// There is no `Drop` finalizer: a lease abandoned without `release()` is a
/// caller bug. Acquire, use, and release on every exit path, including
/// error paths.
#[derive(Debug)]
pub struct Lease {
    id: LeaseId,
    token: ReservationToken,
    ledger: Arc<CapacityLedger>,
    state: Mutex<LeaseState>,
}

impl Lease {
    pub(crate) fn new(token: ReservationToken, ledger: Arc<CapacityLedger>) -> Self {
        Self {
            id: LeaseId::new(),
            token,
            ledger,
            state: Mutex::new(LeaseState::Reserved),
        }
    }

    /// Unique identifier for this lease.
    pub fn id(&self) -> &LeaseId {
        &self.id
    }

    /// The amounts this lease holds.
    pub fn bundle(&self) -> &ResourceBundle {
        self.token.bundle()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LeaseState {
        *self.state.lock()
    }

    /// Confirm the reserved capacity as active.
    ///
    /// Idempotent: calling twice, or after `release()`, has no additional
    /// effect.
    pub fn consume(&self) {
        let mut state = self.state.lock();
        match *state {
            LeaseState::Reserved => {
                self.ledger.commit(&self.token);
                *state = LeaseState::Consumed;
                debug!(lease_id = %self.id, "lease consumed");
            }
            LeaseState::Consumed | LeaseState::Released => {
                debug!(lease_id = %self.id, state = ?*state, "consume ignored");
            }
        }
    }

    /// Return this lease's capacity to the ledger.
    ///
    /// Frees *active* counts if consumed, *reserved* counts otherwise.
    /// Idempotent: a second call is a no-op, never a double-free.
    pub fn release(&self) {
        let mut state = self.state.lock();
        match *state {
            LeaseState::Reserved => {
                self.ledger.free(&self.token, HeldState::Reserved);
                *state = LeaseState::Released;
                debug!(lease_id = %self.id, "lease released from reserved");
            }
            LeaseState::Consumed => {
                self.ledger.free(&self.token, HeldState::Active);
                *state = LeaseState::Released;
                debug!(lease_id = %self.id, "lease released from active");
            }
            LeaseState::Released => {
                debug!(lease_id = %self.id, "release ignored, already released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RuntimeLimits;

    fn grant(ledger: &Arc<CapacityLedger>, bundle: ResourceBundle) -> Lease {
        let token = ledger.try_reserve(&bundle).unwrap();
        Lease::new(token, Arc::clone(ledger))
    }

    fn ledger() -> Arc<CapacityLedger> {
        Arc::new(CapacityLedger::new(RuntimeLimits::new(5, 3)))
    }

    #[test]
    fn new_lease_is_reserved() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(1, 1));
        assert_eq!(lease.state(), LeaseState::Reserved);
        assert_eq!(ledger.snapshot().reserved_orchestrations, 1);
        assert_eq!(ledger.snapshot().active_orchestrations, 0);
    }

    #[test]
    fn consume_moves_counts_to_active() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(2, 1));
        lease.consume();

        assert_eq!(lease.state(), LeaseState::Consumed);
        let snap = ledger.snapshot();
        assert_eq!(snap.reserved_orchestrations, 0);
        assert_eq!(snap.active_orchestrations, 2);
        assert_eq!(snap.active_model_invocations, 1);
    }

    #[test]
    fn consume_twice_is_a_no_op() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(2, 0));
        lease.consume();
        lease.consume();

        let snap = ledger.snapshot();
        assert_eq!(snap.active_orchestrations, 2);
        assert_eq!(snap.reserved_orchestrations, 0);
    }

    #[test]
    fn release_from_reserved_restores_baseline() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(2, 1));
        lease.release();

        assert_eq!(lease.state(), LeaseState::Released);
        assert!(ledger.snapshot().is_idle());
    }

    #[test]
    fn release_from_consumed_restores_baseline() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(2, 1));
        lease.consume();
        lease.release();

        assert_eq!(lease.state(), LeaseState::Released);
        assert!(ledger.snapshot().is_idle());
    }

    #[test]
    fn release_twice_never_double_frees() {
        let ledger = ledger();
        let other = grant(&ledger, ResourceBundle::new(1, 0));
        let lease = grant(&ledger, ResourceBundle::new(2, 0));
        lease.consume();
        lease.release();
        lease.release();

        // Only `other`'s reservation remains; double release must not have
        // subtracted it.
        let snap = ledger.snapshot();
        assert_eq!(snap.reserved_orchestrations, 1);
        assert_eq!(snap.active_orchestrations, 0);
        drop(other);
    }

    #[test]
    fn consume_after_release_is_ignored() {
        let ledger = ledger();
        let lease = grant(&ledger, ResourceBundle::new(1, 0));
        lease.release();
        lease.consume();

        assert_eq!(lease.state(), LeaseState::Released);
        assert!(ledger.snapshot().is_idle());
    }

    #[test]
    fn lease_ids_are_unique() {
        let ledger = ledger();
        let a = grant(&ledger, ResourceBundle::new(1, 0));
        let b = grant(&ledger, ResourceBundle::new(1, 0));
        assert_ne!(a.id(), b.id());
    }
}
