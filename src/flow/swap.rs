//! Swap screen flow
//!
//! Two-token swap against the pool contract. The sell side may need an
//! approval first; direction reversal is a pure local mutation.

use std::sync::Arc;

use alloy::primitives::U256;

use crate::amount;
use crate::chain::{ChainReader, ContractCall, TokenId};
use crate::config::TokenDescriptor;
use crate::context::DexContext;
use crate::error::Error;
use crate::flow::controller::{ActionRequirement, FlowController};
use crate::flow::status::{FlowOutcome, FlowStatus, TxKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    AToB,
    BToA,
}

impl SwapDirection {
    fn flipped(self) -> Self {
        match self {
            SwapDirection::AToB => SwapDirection::BToA,
            SwapDirection::BToA => SwapDirection::AToB,
        }
    }
}

pub struct SwapFlow {
    controller: FlowController,
    reader: Arc<dyn ChainReader>,
    token_a: TokenDescriptor,
    token_b: TokenDescriptor,
    direction: SwapDirection,
    from_amount: String,
    to_amount: String,
    /// Quoted output for the current direction and sell amount; cleared on
    /// reversal because it belongs to the old direction
    quote: Option<U256>,
    reserves: Option<(U256, U256)>,
}

impl SwapFlow {
    pub fn new(ctx: DexContext, token_a: TokenDescriptor, token_b: TokenDescriptor) -> Self {
        let reader = ctx.reader.clone();
        let pool = ctx.network.contracts.liquidity_pool;
        Self {
            controller: FlowController::new(ctx, pool),
            reader,
            token_a,
            token_b,
            direction: SwapDirection::AToB,
            from_amount: String::new(),
            to_amount: String::new(),
            quote: None,
            reserves: None,
        }
    }

    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    pub fn from_token(&self) -> &TokenDescriptor {
        match self.direction {
            SwapDirection::AToB => &self.token_a,
            SwapDirection::BToA => &self.token_b,
        }
    }

    pub fn to_token(&self) -> &TokenDescriptor {
        match self.direction {
            SwapDirection::AToB => &self.token_b,
            SwapDirection::BToA => &self.token_a,
        }
    }

    pub fn from_amount(&self) -> &str {
        &self.from_amount
    }

    pub fn to_amount(&self) -> &str {
        &self.to_amount
    }

    /// Accept typed input into the sell-amount field; malformed input is
    /// dropped without touching the field.
    pub fn set_from_amount(&mut self, value: &str) -> Result<(), Error> {
        amount::apply_input(&mut self.from_amount, value)?;
        self.update_quote();
        Ok(())
    }

    /// Flip the swap direction. Pure local mutation: the amount fields swap
    /// sides and the now-stale output quote is cleared. Applying it twice
    /// restores the original fields.
    pub fn reverse(&mut self) {
        self.direction = self.direction.flipped();
        std::mem::swap(&mut self.from_amount, &mut self.to_amount);
        self.quote = None;
    }

    /// Refresh balances, the sell-side allowance, and the pool reserves.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.controller
            .refresh_balance(TokenId::Erc20(self.token_a.address))
            .await?;
        self.controller
            .refresh_balance(TokenId::Erc20(self.token_b.address))
            .await?;
        self.controller
            .refresh_allowance(self.from_token().address)
            .await?;
        let pool = self.controller.context().network.contracts.liquidity_pool;
        self.reserves = Some(self.reader.reserves(pool).await?);
        self.update_quote();
        Ok(())
    }

    /// Constant-product estimate of the buy amount for the current sell
    /// amount, from the reserves snapshot. Display-only; the contract
    /// remains the authority on execution price.
    pub fn estimate_out(&self) -> Option<U256> {
        let (reserve_a, reserve_b) = self.reserves?;
        let units = amount::parse_units(&self.from_amount, self.from_token().decimals).ok()?;
        if units.is_zero() {
            return None;
        }
        let (reserve_in, reserve_out) = match self.direction {
            SwapDirection::AToB => (reserve_a, reserve_b),
            SwapDirection::BToA => (reserve_b, reserve_a),
        };
        let denominator = reserve_in.checked_add(units)?;
        if denominator.is_zero() {
            return None;
        }
        units
            .checked_mul(reserve_out)
            .map(|numerator| numerator / denominator)
    }

    fn update_quote(&mut self) {
        self.quote = self.estimate_out();
        self.to_amount = match self.quote {
            Some(out) => amount::format_units(out, self.to_token().decimals),
            None => String::new(),
        };
    }

    /// Whether the sell side needs an approval before swapping
    pub fn needs_approval(&self) -> bool {
        self.controller
            .needs_approval(self.from_token(), &self.from_amount)
    }

    /// Approve the sell token for the pool
    pub async fn approve(&self) -> Result<FlowOutcome, Error> {
        let token = self.from_token().clone();
        self.controller.approve(TxKind::ApproveA, &token).await
    }

    /// Submit the swap. The sold amount rides in on the matching side of
    /// the pool call; the other side is zero.
    pub async fn swap(&self) -> Result<FlowOutcome, Error> {
        let from_token = self.from_token().clone();
        let units = amount::parse_units(&self.from_amount, from_token.decimals)?;
        let (amount_a_in, amount_b_in) = match self.direction {
            SwapDirection::AToB => (units, U256::ZERO),
            SwapDirection::BToA => (U256::ZERO, units),
        };
        let recipient = self.controller.owner()?;
        let pool = self.controller.context().network.contracts.liquidity_pool;

        self.controller
            .perform_action(
                ContractCall::Swap {
                    pool,
                    amount_a_in,
                    amount_b_in,
                    recipient,
                },
                &[ActionRequirement::spending(
                    from_token,
                    self.from_amount.clone(),
                )],
            )
            .await
    }

    pub fn status(&self) -> FlowStatus {
        self.controller.status()
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }
}
