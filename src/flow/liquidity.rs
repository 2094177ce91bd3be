//! Liquidity screen flow
//!
//! Add mode deposits both pool tokens (each may need its own approval);
//! remove mode burns LP shares. The pool mints its own LP token, so
//! removal needs no approval.

use alloy::primitives::U256;
use futures::try_join;

use crate::amount;
use crate::chain::{ContractCall, TokenId};
use crate::config::TokenDescriptor;
use crate::context::DexContext;
use crate::error::Error;
use crate::flow::controller::{ActionRequirement, FlowController};
use crate::flow::status::{FlowOutcome, FlowStatus, TxKind};

/// Display symbol of the pool's LP share token
pub const LP_TOKEN_SYMBOL: &str = "LPTK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityMode {
    Add,
    Remove,
}

pub struct LiquidityFlow {
    controller: FlowController,
    token_a: TokenDescriptor,
    token_b: TokenDescriptor,
    lp_token: TokenDescriptor,
    mode: LiquidityMode,
    amount_a: String,
    amount_b: String,
    lp_amount: String,
}

impl LiquidityFlow {
    pub fn new(ctx: DexContext, token_a: TokenDescriptor, token_b: TokenDescriptor) -> Self {
        let pool = ctx.network.contracts.liquidity_pool;
        // The pool contract is the LP token; shares use 18 decimals
        let lp_token = TokenDescriptor::new(pool, LP_TOKEN_SYMBOL, 18);
        Self {
            controller: FlowController::new(ctx, pool),
            token_a,
            token_b,
            lp_token,
            mode: LiquidityMode::Add,
            amount_a: String::new(),
            amount_b: String::new(),
            lp_amount: String::new(),
        }
    }

    pub fn mode(&self) -> LiquidityMode {
        self.mode
    }

    /// Switch between add and remove views; field state is kept so the user
    /// can flip back without retyping.
    pub fn set_mode(&mut self, mode: LiquidityMode) {
        self.mode = mode;
    }

    pub fn lp_token(&self) -> &TokenDescriptor {
        &self.lp_token
    }

    pub fn amount_a(&self) -> &str {
        &self.amount_a
    }

    pub fn amount_b(&self) -> &str {
        &self.amount_b
    }

    pub fn lp_amount(&self) -> &str {
        &self.lp_amount
    }

    pub fn set_amount_a(&mut self, value: &str) -> Result<(), Error> {
        amount::apply_input(&mut self.amount_a, value)
    }

    pub fn set_amount_b(&mut self, value: &str) -> Result<(), Error> {
        amount::apply_input(&mut self.amount_b, value)
    }

    pub fn set_lp_amount(&mut self, value: &str) -> Result<(), Error> {
        amount::apply_input(&mut self.lp_amount, value)
    }

    /// Refresh both token balances, the LP balance, and both allowances.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.controller
            .refresh_balance(TokenId::Erc20(self.token_a.address))
            .await?;
        self.controller
            .refresh_balance(TokenId::Erc20(self.token_b.address))
            .await?;
        self.controller
            .refresh_balance(TokenId::Erc20(self.lp_token.address))
            .await?;
        self.controller.refresh_allowance(self.token_a.address).await?;
        self.controller.refresh_allowance(self.token_b.address).await?;
        Ok(())
    }

    pub fn needs_approval_a(&self) -> bool {
        self.controller.needs_approval(&self.token_a, &self.amount_a)
    }

    pub fn needs_approval_b(&self) -> bool {
        self.controller.needs_approval(&self.token_b, &self.amount_b)
    }

    pub async fn approve_a(&self) -> Result<FlowOutcome, Error> {
        self.controller.approve(TxKind::ApproveA, &self.token_a).await
    }

    pub async fn approve_b(&self) -> Result<FlowOutcome, Error> {
        self.controller.approve(TxKind::ApproveB, &self.token_b).await
    }

    /// Drive whichever approvals the entered amounts still need.
    ///
    /// The two approvals are independent and run concurrently; both must
    /// confirm (and their allowances settle) before this returns.
    pub async fn ensure_approvals(&self) -> Result<(), Error> {
        let approve_a = async {
            if self.needs_approval_a() {
                self.approve_a().await.map(Some)
            } else {
                Ok(None)
            }
        };
        let approve_b = async {
            if self.needs_approval_b() {
                self.approve_b().await.map(Some)
            } else {
                Ok(None)
            }
        };
        try_join!(approve_a, approve_b)?;
        Ok(())
    }

    /// Deposit both tokens into the pool.
    pub async fn add(&self) -> Result<FlowOutcome, Error> {
        let pool = self.controller.context().network.contracts.liquidity_pool;
        let amount_a = amount::parse_units(&self.amount_a, self.token_a.decimals)?;
        let amount_b = amount::parse_units(&self.amount_b, self.token_b.decimals)?;

        self.controller
            .perform_action(
                ContractCall::AddLiquidity {
                    pool,
                    amount_a,
                    amount_b,
                },
                &[
                    ActionRequirement::spending(self.token_a.clone(), self.amount_a.clone()),
                    ActionRequirement::spending(self.token_b.clone(), self.amount_b.clone()),
                ],
            )
            .await
    }

    /// Burn LP shares and withdraw the underlying tokens.
    pub async fn remove(&self) -> Result<FlowOutcome, Error> {
        let pool = self.controller.context().network.contracts.liquidity_pool;
        let lp_units = amount::parse_units(&self.lp_amount, self.lp_token.decimals)?;

        self.controller
            .perform_action(
                ContractCall::RemoveLiquidity {
                    pool,
                    lp_amount: lp_units,
                },
                &[ActionRequirement::holding(
                    self.lp_token.clone(),
                    self.lp_amount.clone(),
                )],
            )
            .await
    }

    /// The account's share of the pool in basis points, from the LP balance
    /// snapshot and the live total supply. `None` until the LP balance is
    /// loaded or while the pool is empty.
    pub async fn pool_share_bps(&self) -> Result<Option<u32>, Error> {
        let Some(balance) = self
            .controller
            .balance(TokenId::Erc20(self.lp_token.address))
        else {
            return Ok(None);
        };
        let supply = self
            .controller
            .context()
            .reader
            .total_supply(self.lp_token.address)
            .await?;
        if supply.is_zero() {
            return Ok(None);
        }
        let bps = balance
            .value
            .checked_mul(U256::from(10_000u64))
            .map(|scaled| scaled / supply)
            .unwrap_or(U256::ZERO);
        Ok(Some(bps.min(U256::from(10_000u64)).to::<u32>()))
    }

    pub fn status(&self) -> FlowStatus {
        self.controller.status()
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }
}
