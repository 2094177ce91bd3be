//! Send screen flow
//!
//! Plain ERC-20 transfer to a typed recipient. The recipient field is
//! validated as the user types; the send action stays blocked while it is
//! invalid. Transfers spend the owner's own balance, so no approval step
//! exists on this screen.

use alloy::primitives::Address;

use crate::amount;
use crate::chain::{ContractCall, TokenId};
use crate::config::TokenDescriptor;
use crate::context::DexContext;
use crate::error::Error;
use crate::flow::controller::{ActionRequirement, FlowController};
use crate::flow::status::{FlowOutcome, FlowStatus};

/// Validate a typed recipient address.
///
/// Requires the `0x` prefix and 20 bytes of hex. Mixed-case input must
/// carry a valid EIP-55 checksum; uniform-case input carries no checksum
/// information and is accepted as-is. The zero address is never a valid
/// recipient.
pub fn validate_recipient(input: &str) -> Result<Address, Error> {
    let value = input.trim();
    let hex = value
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidRecipient("address must start with 0x".to_string()))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidRecipient(
            "address must be 20 bytes of hex".to_string(),
        ));
    }

    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let address = if has_upper && has_lower {
        Address::parse_checksummed(value, None)
            .map_err(|_| Error::InvalidRecipient("checksum mismatch".to_string()))?
    } else {
        value
            .parse::<Address>()
            .map_err(|e| Error::InvalidRecipient(e.to_string()))?
    };

    if address == Address::ZERO {
        return Err(Error::InvalidRecipient(
            "zero address is not a valid recipient".to_string(),
        ));
    }
    Ok(address)
}

pub struct SendFlow {
    controller: FlowController,
    token: TokenDescriptor,
    send_amount: String,
    recipient: String,
}

impl SendFlow {
    pub fn new(ctx: DexContext, token: TokenDescriptor) -> Self {
        let pool = ctx.network.contracts.liquidity_pool;
        Self {
            controller: FlowController::new(ctx, pool),
            token,
            send_amount: String::new(),
            recipient: String::new(),
        }
    }

    pub fn token(&self) -> &TokenDescriptor {
        &self.token
    }

    pub fn send_amount(&self) -> &str {
        &self.send_amount
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Switch the token to send; the amount field is cleared because it was
    /// entered against the previous token's balance.
    pub fn select_token(&mut self, token: TokenDescriptor) {
        if token != self.token {
            self.token = token;
            self.send_amount.clear();
        }
    }

    pub fn set_amount(&mut self, value: &str) -> Result<(), Error> {
        amount::apply_input(&mut self.send_amount, value)
    }

    /// Accept any typed recipient text; validity is derived, not enforced
    /// here, so the user can keep editing.
    pub fn set_recipient(&mut self, value: &str) {
        self.recipient = value.trim().to_string();
    }

    /// Validation result for the current recipient field, for inline display
    pub fn recipient_validation(&self) -> Result<Address, Error> {
        validate_recipient(&self.recipient)
    }

    pub fn is_recipient_valid(&self) -> bool {
        self.recipient_validation().is_ok()
    }

    pub async fn refresh(&self) -> Result<(), Error> {
        self.controller
            .refresh_balance(TokenId::Erc20(self.token.address))
            .await?;
        Ok(())
    }

    /// Submit the transfer. Blocked entirely while the recipient is invalid.
    pub async fn send(&self) -> Result<FlowOutcome, Error> {
        let recipient = self.recipient_validation()?;

        self.controller
            .perform_action(
                ContractCall::Transfer {
                    token: self.token.address,
                    recipient,
                    amount: amount::parse_units(&self.send_amount, self.token.decimals)?,
                },
                &[ActionRequirement::holding(
                    self.token.clone(),
                    self.send_amount.clone(),
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
