mod utils;

use minidex_sdk::{Config, FlowConfig, MiniDexNetworkConfig, NetworkConstants, U256};
use utils::test_utils::{init_test_env, test_config, test_network_config};

#[test]
fn test_network_config_from_constants() {
    init_test_env();

    let constants = NetworkConstants::new(
        "sepolia".to_string(),
        11155111,
        "https://rpc.sepolia.org".to_string(),
        "ETH".to_string(),
        18,
    );

    let network = MiniDexNetworkConfig::from_constants(&constants);
    assert_eq!(network.network_name, "sepolia", "Network name should match");
    assert_eq!(network.chain_id, 11155111, "Chain id should match");
    assert_eq!(
        network.rpc_url, "https://rpc.sepolia.org",
        "RPC URL should come from the constants"
    );
    assert_eq!(network.native_symbol, "ETH");
    assert_eq!(network.native_decimals, 18);
    assert_eq!(
        network.contracts.liquidity_pool,
        minidex_sdk::Address::ZERO,
        "Contracts start unset"
    );
}

#[test]
fn test_network_constants_loading() {
    init_test_env();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("network.toml"),
        r#"
[sepolia]
network_name = "sepolia"
chain_id = 11155111
default_rpc = "https://rpc.sepolia.org"
native_symbol = "ETH"
native_decimals = 18
"#,
    )
    .expect("Failed to write network constants file");

    std::env::set_var("MINIDEX_CONFIG_DIR", dir.path());
    let constants = NetworkConstants::load("sepolia").expect("Failed to load network constants");
    std::env::remove_var("MINIDEX_CONFIG_DIR");

    assert_eq!(constants.network_name, "sepolia", "Network name should match");
    assert_eq!(constants.chain_id, 11155111, "Chain id should match");
    assert!(
        !constants.default_rpc.is_empty(),
        "RPC URL should not be empty"
    );
    assert_eq!(constants.native_decimals, 18);
}

#[test]
fn test_config_round_trip() {
    init_test_env();

    let config = test_config();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");

    config.save(&path).expect("Failed to save config");
    let loaded = Config::load(&path).expect("Failed to load config");

    assert_eq!(
        loaded.network.network_name, config.network.network_name,
        "Network name should survive the round trip"
    );
    assert_eq!(
        loaded.network.contracts.liquidity_pool, config.network.contracts.liquidity_pool,
        "Contract addresses should survive the round trip"
    );
    assert_eq!(
        loaded.tokens.len(),
        config.tokens.len(),
        "Token registry should survive the round trip"
    );
    let token = loaded.token("mETH").expect("mETH should be registered");
    assert_eq!(token.decimals, 18, "Token decimals should match");
    assert_eq!(
        loaded.flow.settle_delay_ms, config.flow.settle_delay_ms,
        "Flow tuning should survive the round trip"
    );
}

#[test]
fn test_flow_config_defaults() {
    let flow = FlowConfig::default();

    assert!(
        flow.poll_horizon_ms > flow.poll_interval_ms,
        "The horizon must span multiple polls"
    );
    assert!(flow.settle_retries > 0, "Settling retries at least once");
    assert_eq!(
        flow.gas_reserve,
        U256::from(1_000_000_000_000_000u64),
        "Default gas reserve is 0.001 native"
    );
}

#[test]
fn test_flow_config_is_optional_in_files() {
    init_test_env();

    // Older config files carry no [flow] table; defaults apply.
    let toml = r#"
        mnemonic = ""

        [network]
        network_name = "sepolia"
        chain_id = 11155111
        rpc_url = "https://rpc.sepolia.org"
        native_symbol = "ETH"
        native_decimals = 18

        [network.contracts]
        liquidity_pool = "0xBAD4F032cC2Fd09b0C71B2D3336dD4A6beF724a7"
        token_a = "0x558f6e1BFfD83AD9F016865bF98D6763566d49c6"
        token_b = "0x4DF4493209006683e678983E1Ec097680AB45e13"

        [tokens]
    "#;

    let config: Config = toml::from_str(toml).expect("config without [flow] should parse");
    assert_eq!(config.flow.poll_interval_ms, FlowConfig::default().poll_interval_ms);
}

#[test]
fn test_default_path_ends_with_config() {
    let path = Config::default_path();
    assert!(
        path.ends_with("minidex/config.toml"),
        "Default path should land under the minidex config dir"
    );
}

#[test]
fn test_builder_methods() {
    let network = test_network_config()
        .with_liquidity_pool(minidex_sdk::Address::ZERO)
        .with_pool_tokens(minidex_sdk::Address::ZERO, minidex_sdk::Address::ZERO);
    assert_eq!(network.contracts.liquidity_pool, minidex_sdk::Address::ZERO);
    assert_eq!(network.contracts.token_a, minidex_sdk::Address::ZERO);
}
