use alloy::primitives::TxHash;

use crate::error::FlowError;

/// Which slot of a flow a transaction belongs to.
///
/// A flow tracks at most two approvals (one per involved token) and one
/// action at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    ApproveA,
    ApproveB,
    Act,
}

/// Immutable record of a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: TxHash,
    pub kind: TxKind,
}

/// Lifecycle of one tracked transaction slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxState {
    #[default]
    NotSubmitted,
    /// Submission dispatched to the wallet, no hash yet
    Submitting,
    /// Submitted, receipt not yet observed
    Pending(TxHandle),
    Confirmed(TxHandle),
    Failed(TxHandle),
}

impl TxState {
    /// Whether the slot blocks a new submission of the same kind
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TxState::Submitting | TxState::Pending(_))
    }

    pub fn handle(&self) -> Option<TxHandle> {
        match self {
            TxState::Pending(h) | TxState::Confirmed(h) | TxState::Failed(h) => Some(*h),
            _ => None,
        }
    }
}

/// Aggregate phase shown to the presentation layer.
///
/// A confirmed approval reports `Idle` again: pending-state feedback is
/// only shown while a submission is unconfirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    /// An approval is waiting on the wallet
    Approving,
    /// An approval is submitted, receipt not yet observed
    ConfirmingApproval,
    /// The action is waiting on the wallet
    Acting,
    /// The action is submitted, receipt not yet observed
    ConfirmingAction,
}

/// Derived, UI-facing view of a flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStatus {
    pub phase: FlowPhase,
    pub error: Option<FlowError>,
}

impl FlowStatus {
    /// True while any submission or receipt wait is outstanding
    pub fn is_processing(&self) -> bool {
        self.phase != FlowPhase::Idle
    }
}

/// Derive the aggregate phase from the three slots. The action dominates:
/// approvals only show through when no action is outstanding.
pub fn derive_phase(approve_a: &TxState, approve_b: &TxState, act: &TxState) -> FlowPhase {
    match act {
        TxState::Submitting => return FlowPhase::Acting,
        TxState::Pending(_) => return FlowPhase::ConfirmingAction,
        _ => {}
    }
    if matches!(approve_a, TxState::Submitting) || matches!(approve_b, TxState::Submitting) {
        return FlowPhase::Approving;
    }
    if matches!(approve_a, TxState::Pending(_)) || matches!(approve_b, TxState::Pending(_)) {
        return FlowPhase::ConfirmingApproval;
    }
    FlowPhase::Idle
}

/// Result of driving one flow operation to its observable end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Receipt observed as confirmed
    Confirmed(TxHandle),
    /// Submitted, but the receipt did not land within the poll horizon;
    /// the transaction may still confirm later
    StillPending(TxHandle),
    /// A submission of the same kind was already outstanding; nothing was
    /// submitted
    AlreadyInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn handle(kind: TxKind) -> TxHandle {
        TxHandle {
            hash: B256::repeat_byte(7),
            kind,
        }
    }

    #[test]
    fn test_action_dominates_phase() {
        let phase = derive_phase(
            &TxState::Pending(handle(TxKind::ApproveA)),
            &TxState::NotSubmitted,
            &TxState::Pending(handle(TxKind::Act)),
        );
        assert_eq!(phase, FlowPhase::ConfirmingAction);
    }

    #[test]
    fn test_confirmed_approval_reads_idle() {
        let phase = derive_phase(
            &TxState::Confirmed(handle(TxKind::ApproveA)),
            &TxState::NotSubmitted,
            &TxState::NotSubmitted,
        );
        assert_eq!(phase, FlowPhase::Idle);
    }

    #[test]
    fn test_either_approval_slot_reports() {
        let phase = derive_phase(
            &TxState::NotSubmitted,
            &TxState::Submitting,
            &TxState::NotSubmitted,
        );
        assert_eq!(phase, FlowPhase::Approving);
    }
}
