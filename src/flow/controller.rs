//! Generic transaction flow controller
//!
//! One state machine drives every screen: it owns the balance and
//! allowance snapshots, decides whether an approval must precede an
//! action, sequences the submissions, and derives the aggregate status the
//! presentation layer renders. Screens parametrize it with their token set
//! and action call instead of re-implementing the sequencing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, U256};
use tracing::info;

use crate::amount;
use crate::chain::{BalanceSnapshot, ContractCall, TokenId, TxStatus, UNLIMITED_ALLOWANCE};
use crate::config::TokenDescriptor;
use crate::context::DexContext;
use crate::error::{Error, FlowError};
use crate::flow::status::{derive_phase, FlowOutcome, FlowStatus, TxHandle, TxKind, TxState};
use crate::flow::watcher::{ReceiptOutcome, ReceiptWatcher};

/// One token's part in an action, checked before submission.
#[derive(Debug, Clone)]
pub struct ActionRequirement {
    pub token: TokenDescriptor,
    pub amount: String,
    /// Whether the spender contract pulls this token (and so needs an
    /// allowance); false for tokens merely sent along or burned
    pub requires_allowance: bool,
}

impl ActionRequirement {
    /// The spender pulls this token from the owner
    pub fn spending(token: TokenDescriptor, amount: impl Into<String>) -> Self {
        Self {
            token,
            amount: amount.into(),
            requires_allowance: true,
        }
    }

    /// The owner only needs to hold this amount
    pub fn holding(token: TokenDescriptor, amount: impl Into<String>) -> Self {
        Self {
            token,
            amount: amount.into(),
            requires_allowance: false,
        }
    }
}

#[derive(Default)]
struct FlowState {
    balances: HashMap<TokenId, BalanceSnapshot>,
    allowances: HashMap<Address, U256>,
    approve_a: TxState,
    approve_b: TxState,
    act: TxState,
    last_error: Option<FlowError>,
}

pub struct FlowController {
    ctx: DexContext,
    /// Contract granted allowances and receiving the action calls
    spender: Address,
    watcher: ReceiptWatcher,
    state: Mutex<FlowState>,
}

impl FlowController {
    pub fn new(ctx: DexContext, spender: Address) -> Self {
        let watcher = ReceiptWatcher::new(
            ctx.writer.clone(),
            ctx.flow.clone(),
            ctx.cancellation_token(),
        );
        Self {
            ctx,
            spender,
            watcher,
            state: Mutex::new(FlowState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().expect("flow state lock poisoned")
    }

    fn slot_mut<'a>(state: &'a mut FlowState, kind: TxKind) -> &'a mut TxState {
        match kind {
            TxKind::ApproveA => &mut state.approve_a,
            TxKind::ApproveB => &mut state.approve_b,
            TxKind::Act => &mut state.act,
        }
    }

    fn record(&self, error: Error) -> Error {
        self.state().last_error = Some(error.to_flow_error());
        error
    }

    /// The context this controller was built over
    pub fn context(&self) -> &DexContext {
        &self.ctx
    }

    /// The connected account address
    pub fn owner(&self) -> Result<Address, Error> {
        self.ctx.account.address()
    }

    // --- snapshots -------------------------------------------------------

    /// Fetch and cache a balance snapshot
    pub async fn refresh_balance(&self, token: TokenId) -> Result<BalanceSnapshot, Error> {
        let owner = self.ctx.account.address()?;
        let snapshot = self.ctx.reader.balance_of(owner, token).await?;
        self.state().balances.insert(token, snapshot.clone());
        Ok(snapshot)
    }

    /// Fetch and cache the allowance granted to the spender
    pub async fn refresh_allowance(&self, token: Address) -> Result<U256, Error> {
        let owner = self.ctx.account.address()?;
        let allowance = self.ctx.reader.allowance(token, owner, self.spender).await?;
        self.state().allowances.insert(token, allowance);
        Ok(allowance)
    }

    /// Cached balance snapshot, if any
    pub fn balance(&self, token: TokenId) -> Option<BalanceSnapshot> {
        self.state().balances.get(&token).cloned()
    }

    /// Cached allowance snapshot, if any
    pub fn allowance(&self, token: Address) -> Option<U256> {
        self.state().allowances.get(&token).copied()
    }

    async fn balance_or_refresh(&self, token: TokenId) -> Result<BalanceSnapshot, Error> {
        if let Some(snapshot) = self.balance(token) {
            return Ok(snapshot);
        }
        self.refresh_balance(token).await
    }

    // --- predicates ------------------------------------------------------

    /// Whether an approval must precede spending `amount` of `token`.
    ///
    /// Unknown state (disconnected, unset or malformed amount, missing
    /// balance or allowance snapshot) reads as "no approval needed" so the
    /// UI is not blocked on data that has not loaded; the submission-time
    /// checks in [`perform_action`](Self::perform_action) remain the
    /// authority. An allowance exactly equal to the amount is sufficient.
    pub fn needs_approval(&self, token: &TokenDescriptor, amount: &str) -> bool {
        if !self.ctx.account.is_connected() || amount.is_empty() {
            return false;
        }
        let Ok(units) = amount::parse_units(amount, token.decimals) else {
            return false;
        };
        if units.is_zero() {
            return false;
        }
        let state = self.state();
        if !state.balances.contains_key(&TokenId::Erc20(token.address)) {
            return false;
        }
        match state.allowances.get(&token.address) {
            Some(allowance) => *allowance < units,
            None => false,
        }
    }

    // --- operations ------------------------------------------------------

    /// Submit an unbounded approval for `token` and drive it to its
    /// observable end.
    ///
    /// On confirmation the allowance snapshot is re-read on the settle
    /// schedule before this returns; until then the stale snapshot keeps
    /// the dependent action blocked. A second call for a slot already in
    /// flight is a no-op.
    pub async fn approve(
        &self,
        kind: TxKind,
        token: &TokenDescriptor,
    ) -> Result<FlowOutcome, Error> {
        if kind == TxKind::Act {
            return Err(Error::Other(
                "approve() requires an approval slot".to_string(),
            ));
        }
        if !self.ctx.account.is_connected() {
            return Err(self.record(Error::NotConnected));
        }
        let owner = self.ctx.account.address()?;

        let previous = {
            let mut state = self.state();
            let previous = state
                .allowances
                .get(&token.address)
                .copied()
                .unwrap_or(U256::ZERO);
            let slot = Self::slot_mut(&mut state, kind);
            if slot.is_in_flight() {
                return Ok(FlowOutcome::AlreadyInFlight);
            }
            *slot = TxState::Submitting;
            previous
        };

        let call = ContractCall::Approve {
            token: token.address,
            spender: self.spender,
            amount: UNLIMITED_ALLOWANCE,
        };
        let handle = match self.ctx.writer.submit(call).await {
            Ok(hash) => {
                let handle = TxHandle { hash, kind };
                *Self::slot_mut(&mut self.state(), kind) = TxState::Pending(handle);
                handle
            }
            Err(e) => {
                *Self::slot_mut(&mut self.state(), kind) = TxState::NotSubmitted;
                let error = match e {
                    Error::SubmissionRejected(message) => Error::ApprovalRejected(message),
                    other => Error::ApprovalFailed(other.user_message()),
                };
                return Err(self.record(error));
            }
        };
        info!(token = %token.symbol, hash = %handle.hash, "approval submitted");

        match self.watcher.wait(handle.hash).await? {
            ReceiptOutcome::Confirmed => {
                *Self::slot_mut(&mut self.state(), kind) = TxState::Confirmed(handle);
                let fresh = self
                    .watcher
                    .settle_allowance(&self.ctx.reader, token.address, owner, self.spender, previous)
                    .await
                    .map_err(|e| self.record(e))?;
                let mut state = self.state();
                state.allowances.insert(token.address, fresh);
                state.last_error = None;
                Ok(FlowOutcome::Confirmed(handle))
            }
            ReceiptOutcome::Failed => {
                *Self::slot_mut(&mut self.state(), kind) = TxState::Failed(handle);
                Err(self.record(Error::ApprovalFailed(
                    "approval reverted on-chain".to_string(),
                )))
            }
            ReceiptOutcome::StillPending => Ok(FlowOutcome::StillPending(handle)),
            ReceiptOutcome::Cancelled => {
                Err(Error::Other("operation cancelled at teardown".to_string()))
            }
        }
    }

    /// Check preconditions and submit the screen's action, then drive it to
    /// its observable end.
    ///
    /// Exactly one action submission may be outstanding per controller;
    /// re-invocation while one is in flight returns
    /// [`FlowOutcome::AlreadyInFlight`] without submitting.
    pub async fn perform_action(
        &self,
        call: ContractCall,
        requirements: &[ActionRequirement],
    ) -> Result<FlowOutcome, Error> {
        if self.state().act.is_in_flight() {
            return Ok(FlowOutcome::AlreadyInFlight);
        }
        if !self.ctx.account.is_connected() {
            return Err(self.record(Error::NotConnected));
        }

        for requirement in requirements {
            let token = &requirement.token;
            let units = amount::parse_units(&requirement.amount, token.decimals)
                .map_err(|e| self.record(e))?;
            if units.is_zero() {
                return Err(self.record(Error::Other(format!(
                    "{} amount must be greater than zero",
                    token.symbol
                ))));
            }
            if requirement.requires_allowance && self.needs_approval(token, &requirement.amount) {
                return Err(self.record(Error::Other(format!(
                    "approval outstanding for {}",
                    token.symbol
                ))));
            }
            let snapshot = self
                .balance_or_refresh(TokenId::Erc20(token.address))
                .await
                .map_err(|e| self.record(e))?;
            if units > snapshot.value {
                return Err(self.record(Error::InsufficientBalance {
                    symbol: token.symbol.clone(),
                    requested: requirement.amount.clone(),
                    available: snapshot.formatted.clone(),
                }));
            }
        }

        if !self.ctx.flow.gas_reserve.is_zero() {
            let native = self
                .balance_or_refresh(TokenId::Native)
                .await
                .map_err(|e| self.record(e))?;
            if native.value < self.ctx.flow.gas_reserve {
                return Err(self.record(Error::InsufficientBalance {
                    symbol: self.ctx.network.native_symbol.clone(),
                    requested: amount::format_units(
                        self.ctx.flow.gas_reserve,
                        self.ctx.network.native_decimals,
                    ),
                    available: native.formatted.clone(),
                }));
            }
        }

        // Claim the single action slot; a racing call lands here second and
        // becomes a no-op.
        {
            let mut state = self.state();
            if state.act.is_in_flight() {
                return Ok(FlowOutcome::AlreadyInFlight);
            }
            state.act = TxState::Submitting;
        }

        let kind_name = call.kind_name();
        let handle = match self.ctx.writer.submit(call).await {
            Ok(hash) => {
                let handle = TxHandle {
                    hash,
                    kind: TxKind::Act,
                };
                self.state().act = TxState::Pending(handle);
                handle
            }
            Err(e) => {
                self.state().act = TxState::NotSubmitted;
                let error = match e {
                    Error::SubmissionRejected(message) => Error::ActionRejected(message),
                    other => Error::ActionFailed(other.user_message()),
                };
                return Err(self.record(error));
            }
        };
        info!(kind = kind_name, hash = %handle.hash, "action submitted");

        match self.watcher.wait(handle.hash).await? {
            ReceiptOutcome::Confirmed => {
                let mut state = self.state();
                state.act = TxState::Confirmed(handle);
                state.last_error = None;
                Ok(FlowOutcome::Confirmed(handle))
            }
            ReceiptOutcome::Failed => {
                self.state().act = TxState::Failed(handle);
                Err(self.record(Error::ActionFailed(
                    "transaction reverted on-chain".to_string(),
                )))
            }
            ReceiptOutcome::StillPending => Ok(FlowOutcome::StillPending(handle)),
            ReceiptOutcome::Cancelled => {
                Err(Error::Other("operation cancelled at teardown".to_string()))
            }
        }
    }

    /// One extra receipt poll for an action left `StillPending`, updating
    /// the slot if the receipt has landed since.
    pub async fn check_action_receipt(&self) -> Result<Option<TxStatus>, Error> {
        let handle = match self.state().act {
            TxState::Pending(handle) => handle,
            _ => return Ok(None),
        };
        let status = self.ctx.writer.receipt_status(handle.hash).await?;
        match status {
            TxStatus::Confirmed => {
                let mut state = self.state();
                state.act = TxState::Confirmed(handle);
                state.last_error = None;
            }
            TxStatus::Failed => {
                self.state().act = TxState::Failed(handle);
                self.record(Error::ActionFailed(
                    "transaction reverted on-chain".to_string(),
                ));
            }
            TxStatus::Pending => {}
        }
        Ok(Some(status))
    }

    // --- derived state ---------------------------------------------------

    /// Derived, UI-facing status
    pub fn status(&self) -> FlowStatus {
        let state = self.state();
        FlowStatus {
            phase: derive_phase(&state.approve_a, &state.approve_b, &state.act),
            error: state.last_error.clone(),
        }
    }

    pub fn approval_state(&self, kind: TxKind) -> TxState {
        let mut state = self.state();
        *Self::slot_mut(&mut state, kind)
    }

    pub fn action_state(&self) -> TxState {
        self.state().act
    }

    pub fn last_error(&self) -> Option<FlowError> {
        self.state().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Clear a settled action slot so the user can start a fresh round.
    /// A pending action is left untouched.
    pub fn reset_action(&self) {
        let mut state = self.state();
        if !state.act.is_in_flight() {
            state.act = TxState::NotSubmitted;
        }
    }
}
