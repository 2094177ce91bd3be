use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::abi::{IERC20, ILiquidityPool};
use crate::amount;
use crate::chain::{
    AccountProvider, BalanceSnapshot, ChainReader, ChainWriter, ContractCall, TokenId, TxStatus,
};
use crate::config::MiniDexNetworkConfig;
use crate::error::Error;
use crate::wallet::DexWallet;

/// MiniDex client for interacting with the network
///
/// Implements the three collaborator interfaces over a single HTTP
/// provider. Without a wallet the client serves reads only; `submit`
/// requires [`with_wallet`](Self::with_wallet).
pub struct MiniDexClient {
    /// Provider for the configured network
    provider: DynProvider,
    /// Network configuration
    config: MiniDexNetworkConfig,
    /// Address of the signing wallet, if configured
    wallet_address: Option<Address>,
    /// Whether the account is treated as connected
    connected: AtomicBool,
}

impl MiniDexClient {
    /// Create a new read-only client with the given configuration
    pub fn new(config: MiniDexNetworkConfig) -> Result<Self, Error> {
        let url = config
            .rpc_url
            .parse()
            .map_err(|e| Error::Rpc(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            config,
            wallet_address: None,
            connected: AtomicBool::new(false),
        })
    }

    /// Attach a wallet for signing transactions
    pub fn with_wallet(self, wallet: DexWallet) -> Result<Self, Error> {
        let address = wallet.address();
        let url = self
            .config
            .rpc_url
            .parse()
            .map_err(|e| Error::Rpc(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.into_ethereum_wallet())
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            config: self.config,
            wallet_address: Some(address),
            connected: AtomicBool::new(false),
        })
    }

    /// Get the network configuration
    pub fn config(&self) -> &MiniDexNetworkConfig {
        &self.config
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, Error> {
        let height = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get block number: {}", e)))?;
        debug!(height, "fetched block number");
        Ok(height)
    }

    fn erc20(&self, token: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(token, self.provider.clone())
    }

    fn pool(&self, pool: Address) -> ILiquidityPool::ILiquidityPoolInstance<DynProvider> {
        ILiquidityPool::new(pool, self.provider.clone())
    }
}

/// Wallet rejections arrive as provider errors; they are told apart from
/// node failures by the error text the connector emits on decline.
fn is_user_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rejected") || lower.contains("denied") || lower.contains("cancelled by user")
}

fn map_submit_error(e: impl std::fmt::Display) -> Error {
    let message = e.to_string();
    if is_user_rejection(&message) {
        Error::SubmissionRejected(message)
    } else {
        Error::Contract(message)
    }
}

#[async_trait]
impl AccountProvider for MiniDexClient {
    async fn connect(&self) -> Result<Option<Address>, Error> {
        match self.wallet_address {
            Some(address) => {
                self.connected.store(true, Ordering::SeqCst);
                info!(%address, "wallet connected");
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    fn is_connected(&self) -> bool {
        self.wallet_address.is_some() && self.connected.load(Ordering::SeqCst)
    }

    fn address(&self) -> Result<Address, Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        self.wallet_address.ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl ChainReader for MiniDexClient {
    async fn balance_of(&self, owner: Address, token: TokenId) -> Result<BalanceSnapshot, Error> {
        let (value, decimals) = match token {
            TokenId::Native => {
                let value = self
                    .provider
                    .get_balance(owner)
                    .await
                    .map_err(|e| Error::Rpc(format!("Failed to get native balance: {}", e)))?;
                (value, self.config.native_decimals)
            }
            TokenId::Erc20(address) => {
                let contract = self.erc20(address);
                let decimals = contract
                    .decimals()
                    .call()
                    .await
                    .map_err(|e| Error::Contract(format!("decimals() failed: {}", e)))?;
                let value = contract
                    .balanceOf(owner)
                    .call()
                    .await
                    .map_err(|e| Error::Contract(format!("balanceOf() failed: {}", e)))?;
                (value, decimals)
            }
        };

        Ok(BalanceSnapshot {
            value,
            formatted: amount::format_units(value, decimals),
            decimals,
        })
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, Error> {
        self.erc20(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| Error::Contract(format!("allowance() failed: {}", e)))
    }

    async fn reserves(&self, pool: Address) -> Result<(U256, U256), Error> {
        let reserves = self
            .pool(pool)
            .getReserves()
            .call()
            .await
            .map_err(|e| Error::Contract(format!("getReserves() failed: {}", e)))?;
        Ok((reserves.reserveA, reserves.reserveB))
    }

    async fn total_supply(&self, token: Address) -> Result<U256, Error> {
        self.erc20(token)
            .totalSupply()
            .call()
            .await
            .map_err(|e| Error::Contract(format!("totalSupply() failed: {}", e)))
    }
}

#[async_trait]
impl ChainWriter for MiniDexClient {
    async fn submit(&self, call: ContractCall) -> Result<TxHash, Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        debug!(kind = call.kind_name(), "submitting contract call");
        let pending = match call {
            ContractCall::Approve {
                token,
                spender,
                amount,
            } => self
                .erc20(token)
                .approve(spender, amount)
                .send()
                .await
                .map_err(map_submit_error)?,
            ContractCall::Swap {
                pool,
                amount_a_in,
                amount_b_in,
                recipient,
            } => self
                .pool(pool)
                .swap(amount_a_in, amount_b_in, recipient)
                .send()
                .await
                .map_err(map_submit_error)?,
            ContractCall::AddLiquidity {
                pool,
                amount_a,
                amount_b,
            } => self
                .pool(pool)
                .addLiquidity(amount_a, amount_b)
                .send()
                .await
                .map_err(map_submit_error)?,
            ContractCall::RemoveLiquidity { pool, lp_amount } => self
                .pool(pool)
                .removeLiquidity(lp_amount)
                .send()
                .await
                .map_err(map_submit_error)?,
            ContractCall::Transfer {
                token,
                recipient,
                amount,
            } => self
                .erc20(token)
                .transfer(recipient, amount)
                .send()
                .await
                .map_err(map_submit_error)?,
        };

        let hash = *pending.tx_hash();
        info!(%hash, "transaction submitted");
        Ok(hash)
    }

    async fn receipt_status(&self, hash: TxHash) -> Result<TxStatus, Error> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(match receipt {
            None => TxStatus::Pending,
            Some(r) if r.status() => TxStatus::Confirmed,
            Some(_) => TxStatus::Failed,
        })
    }
}
