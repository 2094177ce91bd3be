//! Application context
//!
//! The collaborators and configuration a screen flow needs, constructed
//! explicitly at startup and passed down by value instead of living in
//! ambient module state. `teardown` cancels every receipt wait started
//! under this context.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chain::{AccountProvider, ChainReader, ChainWriter};
use crate::client::MiniDexClient;
use crate::config::{Config, FlowConfig, MiniDexNetworkConfig, TokenDescriptor};
use crate::error::Error;
use crate::wallet::DexWallet;

/// Dependency-injected collaborator bundle shared by the screen flows.
#[derive(Clone)]
pub struct DexContext {
    /// Wallet/account provider
    pub account: Arc<dyn AccountProvider>,
    /// Chain read interface
    pub reader: Arc<dyn ChainReader>,
    /// Chain write interface
    pub writer: Arc<dyn ChainWriter>,
    /// Active network configuration
    pub network: MiniDexNetworkConfig,
    /// Known tokens, keyed by symbol
    pub tokens: HashMap<String, TokenDescriptor>,
    /// Transaction-flow tuning
    pub flow: FlowConfig,
    cancel: CancellationToken,
}

impl DexContext {
    /// Assemble a context from explicit collaborators
    pub fn new(
        account: Arc<dyn AccountProvider>,
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        network: MiniDexNetworkConfig,
        tokens: HashMap<String, TokenDescriptor>,
        flow: FlowConfig,
    ) -> Self {
        Self {
            account,
            reader,
            writer,
            network,
            tokens,
            flow,
            cancel: CancellationToken::new(),
        }
    }

    /// Build a context over the RPC client and connect the wallet, probing
    /// the network once so a dead endpoint is reported at startup instead of
    /// on the first user action.
    pub async fn init(config: Config, wallet: Option<DexWallet>) -> Result<Self, Error> {
        let client = match wallet {
            Some(wallet) => MiniDexClient::new(config.network.clone())?.with_wallet(wallet)?,
            None => MiniDexClient::new(config.network.clone())?,
        };

        match tokio::time::timeout(config.flow.network_timeout(), client.block_number()).await {
            Ok(Ok(height)) => info!(height, network = %config.network.network_name, "network reachable"),
            Ok(Err(e)) => return Err(Error::Rpc(format!("Network probe failed: {}", e))),
            Err(_) => {
                return Err(Error::Rpc(format!(
                    "Network probe timed out after {:?}",
                    config.flow.network_timeout()
                )))
            }
        }

        client.connect().await?;

        let client = Arc::new(client);
        Ok(Self::new(
            client.clone(),
            client.clone(),
            client,
            config.network,
            config.tokens,
            config.flow,
        ))
    }

    /// Token for cooperative cancellation of receipt waits
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Look up a token descriptor by symbol
    pub fn token(&self, symbol: &str) -> Result<TokenDescriptor, Error> {
        self.tokens
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Config(format!("Unknown token: {}", symbol)))
    }

    /// Cancel outstanding receipt waits and mark the context shut down
    pub fn teardown(&self) {
        warn!("context teardown requested");
        self.cancel.cancel();
    }
}
