//! Receipt watching and allowance settling
//!
//! A submitted transaction is polled until its receipt lands, the poll
//! horizon expires, or the context is torn down. After a confirmed
//! approval, the allowance is re-read on a delay because providers serve
//! the updated value noticeably later than the receipt.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use tokio::time::{interval, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chain::{ChainReader, ChainWriter, TxStatus};
use crate::config::FlowConfig;
use crate::error::Error;

/// Terminal result of one bounded receipt wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Confirmed,
    Failed,
    /// The poll horizon expired with the receipt still absent
    StillPending,
    /// The context was torn down mid-wait
    Cancelled,
}

pub struct ReceiptWatcher {
    writer: Arc<dyn ChainWriter>,
    config: FlowConfig,
    cancel: CancellationToken,
}

impl ReceiptWatcher {
    pub fn new(writer: Arc<dyn ChainWriter>, config: FlowConfig, cancel: CancellationToken) -> Self {
        Self {
            writer,
            config,
            cancel,
        }
    }

    /// Poll the receipt for `hash` until it resolves or the horizon expires.
    ///
    /// Transient read errors are logged and retried within the horizon; they
    /// do not fail the wait.
    pub async fn wait(&self, hash: TxHash) -> Result<ReceiptOutcome, Error> {
        let deadline = Instant::now() + self.config.poll_horizon();
        let mut ticker = interval(self.config.poll_interval());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(%hash, "receipt wait cancelled");
                    return Ok(ReceiptOutcome::Cancelled);
                }
                _ = ticker.tick() => {
                    match self.writer.receipt_status(hash).await {
                        Ok(TxStatus::Confirmed) => {
                            debug!(%hash, "receipt confirmed");
                            return Ok(ReceiptOutcome::Confirmed);
                        }
                        Ok(TxStatus::Failed) => {
                            warn!(%hash, "transaction reverted");
                            return Ok(ReceiptOutcome::Failed);
                        }
                        Ok(TxStatus::Pending) => {}
                        Err(e) => warn!(%hash, error = %e, "receipt poll failed"),
                    }
                    if Instant::now() >= deadline {
                        warn!(%hash, horizon = ?self.config.poll_horizon(), "still pending past poll horizon");
                        return Ok(ReceiptOutcome::StillPending);
                    }
                }
            }
        }
    }

    /// Re-read an allowance after approval confirmation.
    ///
    /// Waits `settle_delay` before the first read, then retries while the
    /// value still equals the pre-approval `previous` snapshot, up to
    /// `settle_retries` times. Returns the last value read either way; the
    /// caller keeps its stale snapshot until this completes.
    pub async fn settle_allowance(
        &self,
        reader: &Arc<dyn ChainReader>,
        token: Address,
        owner: Address,
        spender: Address,
        previous: U256,
    ) -> Result<U256, Error> {
        let mut attempts = 0u32;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(previous),
                _ = tokio::time::sleep(self.config.settle_delay()) => {}
            }
            let current = reader.allowance(token, owner, spender).await?;
            if current != previous {
                debug!(%token, %current, "allowance settled");
                return Ok(current);
            }
            attempts += 1;
            if attempts > self.config.settle_retries {
                warn!(%token, attempts, "allowance unchanged after settle retries");
                return Ok(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use alloy::primitives::B256;
    use async_trait::async_trait;

    use crate::chain::ContractCall;

    struct ScriptedWriter {
        statuses: Mutex<VecDeque<TxStatus>>,
    }

    impl ScriptedWriter {
        fn new(statuses: Vec<TxStatus>) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.into_iter().collect()),
            })
        }
    }

    #[async_trait]
    impl ChainWriter for ScriptedWriter {
        async fn submit(&self, _call: ContractCall) -> Result<TxHash, Error> {
            Ok(B256::repeat_byte(1))
        }

        async fn receipt_status(&self, _hash: TxHash) -> Result<TxStatus, Error> {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.pop_front().unwrap())
            } else {
                Ok(*statuses.front().unwrap())
            }
        }
    }

    fn test_config() -> FlowConfig {
        FlowConfig {
            poll_interval_ms: 1,
            poll_horizon_ms: 25,
            settle_delay_ms: 1,
            settle_retries: 2,
            network_timeout_ms: 100,
            gas_reserve: alloy::primitives::U256::ZERO,
        }
    }

    #[test]
    fn test_wait_resolves_on_confirmation() {
        let writer = ScriptedWriter::new(vec![TxStatus::Pending, TxStatus::Confirmed]);
        let watcher = ReceiptWatcher::new(writer, test_config(), CancellationToken::new());
        let outcome = tokio_test::block_on(watcher.wait(B256::repeat_byte(1))).unwrap();
        assert_eq!(outcome, ReceiptOutcome::Confirmed);
    }

    #[test]
    fn test_wait_bounded_by_horizon() {
        let writer = ScriptedWriter::new(vec![TxStatus::Pending]);
        let watcher = ReceiptWatcher::new(writer, test_config(), CancellationToken::new());
        let outcome = tokio_test::block_on(watcher.wait(B256::repeat_byte(1))).unwrap();
        assert_eq!(outcome, ReceiptOutcome::StillPending);
    }

    #[test]
    fn test_wait_observes_cancellation() {
        let writer = ScriptedWriter::new(vec![TxStatus::Pending]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let watcher = ReceiptWatcher::new(writer, test_config(), cancel);
        let outcome = tokio_test::block_on(watcher.wait(B256::repeat_byte(1))).unwrap();
        assert_eq!(outcome, ReceiptOutcome::Cancelled);
    }
}
