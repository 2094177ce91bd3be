//! Shared test utilities: mock collaborators and test configuration.

#[allow(dead_code)]
pub mod test_utils {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use minidex_sdk::{
        AccountProvider, Address, BalanceSnapshot, ChainReader, ChainWriter, Config, ContractCall,
        ContractAddresses, DexContext, Error, FlowConfig, MiniDexNetworkConfig, TokenDescriptor,
        TokenId, TxHash, TxStatus, U256,
    };

    // The demo deployment addresses
    pub const TOKEN_A_ADDRESS: &str = "0x558f6e1BFfD83AD9F016865bF98D6763566d49c6";
    pub const TOKEN_B_ADDRESS: &str = "0x4DF4493209006683e678983E1Ec097680AB45e13";
    pub const POOL_ADDRESS: &str = "0xBAD4F032cC2Fd09b0C71B2D3336dD4A6beF724a7";
    pub const OWNER_ADDRESS: &str = "0x128dcb97c60033fC091440aA4EBB0F20A8034889";

    pub fn init_test_env() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    }

    pub fn addr(s: &str) -> Address {
        s.parse().expect("valid test address")
    }

    pub fn token_a() -> TokenDescriptor {
        TokenDescriptor::new(addr(TOKEN_A_ADDRESS), "mETH", 18)
    }

    pub fn token_b() -> TokenDescriptor {
        TokenDescriptor::new(addr(TOKEN_B_ADDRESS), "mSEI", 18)
    }

    pub fn units(s: &str) -> U256 {
        U256::from_str_radix(s, 10).expect("valid decimal literal")
    }

    /// Flow tuning shrunk so receipt polling and settling complete in
    /// milliseconds.
    pub fn test_flow_config() -> FlowConfig {
        FlowConfig {
            poll_interval_ms: 5,
            poll_horizon_ms: 200,
            settle_delay_ms: 2,
            settle_retries: 3,
            network_timeout_ms: 1_000,
            gas_reserve: U256::ZERO,
        }
    }

    pub fn test_network_config() -> MiniDexNetworkConfig {
        MiniDexNetworkConfig::new(
            "sepolia".to_string(),
            11155111,
            "http://localhost:8545".to_string(),
            "ETH".to_string(),
            18,
            ContractAddresses {
                liquidity_pool: addr(POOL_ADDRESS),
                token_a: addr(TOKEN_A_ADDRESS),
                token_b: addr(TOKEN_B_ADDRESS),
            },
        )
    }

    pub fn test_config() -> Config {
        let mut config = Config::with_network(test_network_config());
        config.flow = test_flow_config();
        config.add_token("mETH".to_string(), token_a());
        config.add_token("mSEI".to_string(), token_b());
        config
    }

    /// In-memory chain standing in for all three collaborators.
    ///
    /// Balances, allowance read sequences, reserves, receipt scripts, and
    /// submission rejection are all programmable per test.
    pub struct MockChain {
        owner: Address,
        connected: AtomicBool,
        balances: Mutex<HashMap<TokenId, (U256, u8)>>,
        /// Allowance reads consume the front of the sequence until one value
        /// remains; that value then repeats.
        allowances: Mutex<HashMap<Address, VecDeque<U256>>>,
        reserves: Mutex<(U256, U256)>,
        total_supplies: Mutex<HashMap<Address, U256>>,
        /// Receipt script applied to the next submission; defaults to an
        /// immediately confirmed receipt.
        next_receipts: Mutex<Option<VecDeque<TxStatus>>>,
        receipts: Mutex<HashMap<TxHash, VecDeque<TxStatus>>>,
        submissions: Mutex<Vec<ContractCall>>,
        reject_next: AtomicBool,
        fail_next: AtomicBool,
        hash_counter: AtomicU64,
    }

    impl MockChain {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                owner: addr(OWNER_ADDRESS),
                connected: AtomicBool::new(true),
                balances: Mutex::new(HashMap::new()),
                allowances: Mutex::new(HashMap::new()),
                reserves: Mutex::new((U256::ZERO, U256::ZERO)),
                total_supplies: Mutex::new(HashMap::new()),
                next_receipts: Mutex::new(None),
                receipts: Mutex::new(HashMap::new()),
                submissions: Mutex::new(Vec::new()),
                reject_next: AtomicBool::new(false),
                fail_next: AtomicBool::new(false),
                hash_counter: AtomicU64::new(1),
            })
        }

        pub fn owner(&self) -> Address {
            self.owner
        }

        pub fn set_connected(&self, connected: bool) {
            self.connected.store(connected, Ordering::SeqCst);
        }

        pub fn set_balance(&self, token: TokenId, value: U256, decimals: u8) {
            self.balances.lock().unwrap().insert(token, (value, decimals));
        }

        /// Program the sequence of values `allowance()` reads will return.
        pub fn set_allowance_sequence(&self, token: Address, values: Vec<U256>) {
            self.allowances
                .lock()
                .unwrap()
                .insert(token, values.into_iter().collect());
        }

        pub fn set_reserves(&self, reserve_a: U256, reserve_b: U256) {
            *self.reserves.lock().unwrap() = (reserve_a, reserve_b);
        }

        pub fn set_total_supply(&self, token: Address, supply: U256) {
            self.total_supplies.lock().unwrap().insert(token, supply);
        }

        /// Script the receipt polls for the next submitted transaction.
        pub fn script_next_receipts(&self, statuses: Vec<TxStatus>) {
            *self.next_receipts.lock().unwrap() = Some(statuses.into_iter().collect());
        }

        pub fn reject_next_submit(&self) {
            self.reject_next.store(true, Ordering::SeqCst);
        }

        pub fn fail_next_submit(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        pub fn submissions(&self) -> Vec<ContractCall> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountProvider for MockChain {
        async fn connect(&self) -> Result<Option<Address>, Error> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(Some(self.owner))
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn address(&self) -> Result<Address, Error> {
            if !self.is_connected() {
                return Err(Error::NotConnected);
            }
            Ok(self.owner)
        }
    }

    #[async_trait]
    impl ChainReader for MockChain {
        async fn balance_of(
            &self,
            _owner: Address,
            token: TokenId,
        ) -> Result<BalanceSnapshot, Error> {
            let (value, decimals) = self
                .balances
                .lock()
                .unwrap()
                .get(&token)
                .copied()
                .unwrap_or((U256::ZERO, 18));
            Ok(BalanceSnapshot {
                value,
                formatted: minidex_sdk::amount::format_units(value, decimals),
                decimals,
            })
        }

        async fn allowance(
            &self,
            token: Address,
            _owner: Address,
            _spender: Address,
        ) -> Result<U256, Error> {
            let mut allowances = self.allowances.lock().unwrap();
            match allowances.get_mut(&token) {
                Some(sequence) => {
                    if sequence.len() > 1 {
                        Ok(sequence.pop_front().expect("non-empty sequence"))
                    } else {
                        sequence
                            .front()
                            .copied()
                            .ok_or_else(|| Error::Rpc("allowance sequence exhausted".to_string()))
                    }
                }
                None => Ok(U256::ZERO),
            }
        }

        async fn reserves(&self, _pool: Address) -> Result<(U256, U256), Error> {
            Ok(*self.reserves.lock().unwrap())
        }

        async fn total_supply(&self, token: Address) -> Result<U256, Error> {
            Ok(self
                .total_supplies
                .lock()
                .unwrap()
                .get(&token)
                .copied()
                .unwrap_or(U256::ZERO))
        }
    }

    #[async_trait]
    impl ChainWriter for MockChain {
        async fn submit(&self, call: ContractCall) -> Result<TxHash, Error> {
            if self.reject_next.swap(false, Ordering::SeqCst) {
                return Err(Error::SubmissionRejected(
                    "User rejected the request".to_string(),
                ));
            }
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Error::Rpc("node unavailable".to_string()));
            }

            self.submissions.lock().unwrap().push(call);

            let n = self.hash_counter.fetch_add(1, Ordering::SeqCst);
            let hash = TxHash::from(U256::from(n).to_be_bytes::<32>());

            let script = self
                .next_receipts
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| VecDeque::from([TxStatus::Confirmed]));
            self.receipts.lock().unwrap().insert(hash, script);

            Ok(hash)
        }

        async fn receipt_status(&self, hash: TxHash) -> Result<TxStatus, Error> {
            let mut receipts = self.receipts.lock().unwrap();
            let script = receipts
                .get_mut(&hash)
                .ok_or_else(|| Error::Rpc(format!("unknown transaction: {}", hash)))?;
            if script.len() > 1 {
                Ok(script.pop_front().expect("non-empty script"))
            } else {
                script
                    .front()
                    .copied()
                    .ok_or_else(|| Error::Rpc("receipt script exhausted".to_string()))
            }
        }
    }

    /// Context wired to a shared mock chain with test flow tuning.
    pub fn mock_context(chain: &Arc<MockChain>) -> DexContext {
        let config = test_config();
        DexContext::new(
            chain.clone(),
            chain.clone(),
            chain.clone(),
            config.network,
            config.tokens,
            config.flow,
        )
    }
}
