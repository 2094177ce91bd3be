pub mod abi;
pub mod amount;
pub mod chain;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod wallet;

pub use chain::{
    AccountProvider, BalanceSnapshot, ChainReader, ChainWriter, ContractCall, TokenId, TxStatus,
    UNLIMITED_ALLOWANCE,
};
pub use client::MiniDexClient;
pub use config::{
    Config, ContractAddresses, FlowConfig, MiniDexNetworkConfig, NetworkConstants, TokenDescriptor,
};
pub use context::DexContext;
pub use error::{Error, ErrorKind, FlowError};
pub use flow::{
    ActionRequirement, FlowController, FlowOutcome, FlowPhase, FlowStatus, LiquidityFlow,
    LiquidityMode, SendFlow, SwapDirection, SwapFlow, TxHandle, TxKind, TxState,
};
pub use wallet::{DexWallet, WalletInfo};

// Re-export the primitive types that appear throughout the public API
pub use alloy::primitives::{Address, TxHash, U256};
