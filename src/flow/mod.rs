//! Transaction flow sequencing
//!
//! The screens of the original exchange UI each reimplemented the same
//! approve-then-act sequencing; here one [`FlowController`] owns it and the
//! per-screen types ([`SwapFlow`], [`LiquidityFlow`], [`SendFlow`])
//! parametrize it with their token set and action call.

mod controller;
mod liquidity;
mod send;
mod status;
mod swap;
mod watcher;

pub use controller::{ActionRequirement, FlowController};
pub use liquidity::{LiquidityFlow, LiquidityMode, LP_TOKEN_SYMBOL};
pub use send::{validate_recipient, SendFlow};
pub use status::{derive_phase, FlowOutcome, FlowPhase, FlowStatus, TxHandle, TxKind, TxState};
pub use swap::{SwapDirection, SwapFlow};
pub use watcher::{ReceiptOutcome, ReceiptWatcher};
