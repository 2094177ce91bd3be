use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// HD Path prefix for Ethereum accounts (BIP-44)
const HD_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Local wallet for managing the signing key
pub struct DexWallet {
    /// The signing key
    signer: PrivateKeySigner,
}

/// Wallet info that can be serialized safely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    /// The wallet address (EIP-55 checksummed)
    pub address: String,
}

impl DexWallet {
    /// Create a new wallet from a mnemonic
    pub fn from_mnemonic(mnemonic: &str, account_index: u32) -> Result<Self, Error> {
        let path = format!("{}{}", HD_PATH_PREFIX, account_index);
        let signer = MnemonicBuilder::<English>::default()
            .phrase(mnemonic.to_string())
            .derivation_path(&path)
            .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?
            .build()
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        Ok(Self { signer })
    }

    /// Generate a new random wallet
    pub fn generate() -> Result<(Self, String), Error> {
        use alloy::signers::local::coins_bip39::Mnemonic;

        // 12-word mnemonic from fresh entropy
        let mnemonic = Mnemonic::<English>::new_with_count(&mut rand::thread_rng(), 12)
            .map_err(|e| Error::Wallet(format!("Failed to generate mnemonic: {}", e)))?;

        let phrase = mnemonic.to_phrase();
        let wallet = Self::from_mnemonic(&phrase, 0)?;

        Ok((wallet, phrase))
    }

    /// Get the wallet's address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get access to the signing key
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Get wallet info
    pub fn info(&self) -> WalletInfo {
        WalletInfo {
            address: self.address().to_checksum(None),
        }
    }

    /// Consume the wallet into a provider-attachable signer set
    pub fn into_ethereum_wallet(self) -> EthereumWallet {
        EthereumWallet::from(self.signer)
    }
}
