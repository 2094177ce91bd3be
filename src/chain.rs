//! Collaborator interfaces for the chain layer
//!
//! The flow controller depends only on these traits. The crate ships an
//! RPC-backed implementation ([`crate::client::MiniDexClient`]), and tests
//! substitute mocks. Balance and allowance values read through
//! [`ChainReader`] are eventually-consistent snapshots owned by the read
//! layer; the controller never writes them back.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::Error;

/// Allowance granted by an approval: the maximum representable amount, so a
/// single approval covers every later action.
pub const UNLIMITED_ALLOWANCE: U256 = U256::MAX;

/// A token reference: the chain's native coin or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenId {
    Native,
    Erc20(Address),
}

/// Point-in-time balance as reported by the read layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Integer token units
    pub value: U256,
    /// Display form, trimmed
    pub formatted: String,
    /// Decimal count used for conversion
    pub decimals: u8,
}

/// Receipt-derived status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// The closed set of call shapes the flows submit.
///
/// Argument encoding and function selectors are owned by the write layer;
/// the controller only names the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Swap {
        pool: Address,
        amount_a_in: U256,
        amount_b_in: U256,
        recipient: Address,
    },
    AddLiquidity {
        pool: Address,
        amount_a: U256,
        amount_b: U256,
    },
    RemoveLiquidity {
        pool: Address,
        lp_amount: U256,
    },
    Transfer {
        token: Address,
        recipient: Address,
        amount: U256,
    },
}

impl ContractCall {
    /// Short name for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContractCall::Approve { .. } => "approve",
            ContractCall::Swap { .. } => "swap",
            ContractCall::AddLiquidity { .. } => "add_liquidity",
            ContractCall::RemoveLiquidity { .. } => "remove_liquidity",
            ContractCall::Transfer { .. } => "transfer",
        }
    }
}

/// Wallet/account provider
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Connect the account; `None` when no wallet is available
    async fn connect(&self) -> Result<Option<Address>, Error>;

    /// Whether an account is currently connected
    fn is_connected(&self) -> bool;

    /// The connected account address
    fn address(&self) -> Result<Address, Error>;
}

/// Chain read interface
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Read a balance for `owner`
    async fn balance_of(&self, owner: Address, token: TokenId) -> Result<BalanceSnapshot, Error>;

    /// Read the ERC-20 allowance granted by `owner` to `spender`
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, Error>;

    /// Read the pool reserves `(reserve_a, reserve_b)`
    async fn reserves(&self, pool: Address) -> Result<(U256, U256), Error>;

    /// Read the total supply of a token (LP share accounting)
    async fn total_supply(&self, token: Address) -> Result<U256, Error>;
}

/// Chain write interface
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Submit a contract call for signing and broadcast.
    ///
    /// Fails with [`Error::SubmissionRejected`] when the user declines to
    /// sign, or another variant for node/provider errors.
    async fn submit(&self, call: ContractCall) -> Result<TxHash, Error>;

    /// One receipt poll for `hash`
    async fn receipt_status(&self, hash: TxHash) -> Result<TxStatus, Error>;
}
