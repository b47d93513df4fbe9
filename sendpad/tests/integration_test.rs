//! Integration tests for sendpad.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256, U256, address, b256};
use async_trait::async_trait;
use sendpad::chain::erc20;
use sendpad::prelude::*;
use sendpad::session::{CONNECT_LABEL, DISCONNECT_LABEL};
use sendpad::wallet::{hex_chain_id, methods};
use serde_json::{Value, json};

const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
const DAI: Address = address!("FF34B3d4Aee8ddCd6F9AFFFB6Fe49bD371b8a357");
const TX: B256 = b256!("0d4c1e8f0a7bd3c4f6e2d1a0b9c8d7e6f5a4b3c2d1e0f9a8b7c6d5e4f3a2b1c0");

const CONFIG: &str = r#"
[network]
chain_id = 31337
rpc_url = "http://127.0.0.1:8545"

[wallet]
endpoint = "http://127.0.0.1:1248"
auto_switch_chain = false

[[tokens]]
symbol = "DAI"
address = "0xFF34B3d4Aee8ddCd6F9AFFFB6Fe49bD371b8a357"
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("sendpad=debug")
        .try_init();
}

/// A wallet that keeps its own account list, like an extension would.
#[derive(Debug)]
struct ExtensionWallet {
    accounts: Mutex<Vec<Address>>,
    sent: Mutex<Vec<Value>>,
}

impl ExtensionWallet {
    fn new(account: Address) -> Self {
        Self {
            accounts: Mutex::new(vec![account]),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Eip1193 for ExtensionWallet {
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, WalletError> {
        match method {
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => {
                Ok(json!(*self.accounts.lock().unwrap()))
            }
            methods::CHAIN_ID => Ok(json!(hex_chain_id(31_337))),
            methods::SEND_TRANSACTION => {
                self.sent.lock().unwrap().push(params[0].clone());
                Ok(json!(TX))
            }
            methods::REVOKE_PERMISSIONS => {
                self.accounts.lock().unwrap().clear();
                Ok(Value::Null)
            }
            other => Err(WalletError::from_rpc(4200, format!("{other} not supported"))),
        }
    }
}

fn local_chain() -> Arc<MockChain> {
    Arc::new(
        MockChain::new()
            .with_native(ALICE, U256::from(3_000_000_000_000_000_000u128))
            .with_token(DAI, "DAI", 18)
            .with_token_balance(DAI, ALICE, U256::from(10_000_000_000_000_000_000u128)),
    )
}

fn config() -> AppConfig {
    toml::from_str(CONFIG).unwrap()
}

#[tokio::test]
async fn config_drives_session() {
    init_tracing();
    let config = config();
    assert!(config.is_valid());
    assert_eq!(config.chain(), EvmChain::Local);

    let wallet = Arc::new(ExtensionWallet::new(ALICE));
    let session = WalletSession::from_config(&config, wallet, local_chain()).unwrap();

    let symbols: Vec<_> = session.tokens().iter().map(|t| t.symbol.clone()).collect();
    assert_eq!(symbols, ["ETH", "DAI"]);
    assert_eq!(session.network(), &EvmChain::Local);
    assert_eq!(session.state().selected, "ETH");
}

#[tokio::test]
async fn full_token_flow() {
    init_tracing();
    let wallet = Arc::new(ExtensionWallet::new(ALICE));
    let chain = local_chain();
    let notes = RecordingNotifier::new();
    let mut session = WalletSession::from_config(&config(), wallet.clone(), chain.clone())
        .unwrap()
        .with_notifier(notes.clone());

    session.toggle_connection().await.unwrap();
    assert_eq!(session.connect_label(), DISCONNECT_LABEL);
    assert_eq!(session.state().balance.unwrap().to_string(), "3 ETH");

    session.select_token("DAI").unwrap();
    assert_eq!(session.balance_query().unwrap().asset, Asset::Erc20(DAI));
    // DAI decimals are not configured and must be read from the contract.
    let balance = session.refresh_balance().await.unwrap().unwrap();
    assert_eq!(balance.to_string(), "10 DAI");

    session.set_recipient(BOB.to_string());
    session.set_amount("2.5");
    let hash = session.submit_transfer().await.unwrap();
    assert_eq!(hash, TX);

    let sent = wallet.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    let tx: WalletTransaction = serde_json::from_value(sent[0].clone()).unwrap();
    assert_eq!(tx.from, Some(ALICE));
    assert_eq!(tx.to, DAI);
    assert_eq!(
        tx.data.unwrap(),
        erc20::transfer_calldata(BOB, U256::from(2_500_000_000_000_000_000u128))
    );

    let titles: Vec<_> = notes.drain().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["Wallet connected", "Transfer sent"]);

    session.toggle_connection().await.unwrap();
    let state = session.state();
    assert_eq!(session.connect_label(), CONNECT_LABEL);
    assert_eq!(state.address, None);
    assert_eq!(state.balance, None);
    assert_eq!(state.selected, "DAI");
    assert!(wallet.accounts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_form_never_reaches_wallet() {
    let wallet = Arc::new(ExtensionWallet::new(ALICE));
    let chain = local_chain();
    let mut session = WalletSession::from_config(&config(), wallet.clone(), chain.clone()).unwrap();
    session.connect().await.unwrap();
    let reads = chain.reads();
    let bob = BOB.to_string();

    for (recipient, amount) in [("", ""), (bob.as_str(), ""), ("", "1")] {
        session.set_recipient(recipient);
        session.set_amount(amount);
        let err = session.submit_transfer().await.unwrap_err();
        assert!(err.is_validation(), "{recipient:?}/{amount:?}: {err}");
    }

    assert!(wallet.sent.lock().unwrap().is_empty());
    assert_eq!(chain.reads(), reads);
}

#[tokio::test]
async fn subscribers_see_each_step() {
    let wallet = Arc::new(ExtensionWallet::new(ALICE));
    let mut session = WalletSession::from_config(&config(), wallet, local_chain()).unwrap();
    let mut rx = session.subscribe();

    session.connect().await.unwrap();
    rx.changed().await.unwrap();
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.address, Some(ALICE));
    assert_eq!(seen.connect_label(), DISCONNECT_LABEL);

    session.disconnect().await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().connect_label(), CONNECT_LABEL);
}

#[test]
fn blocking_front_end_can_drive_session() {
    let wallet = Arc::new(ExtensionWallet::new(ALICE));
    let mut session = WalletSession::from_config(&config(), wallet, local_chain()).unwrap();

    let connection = tokio_test::block_on(session.connect()).unwrap();
    assert_eq!(connection.address, ALICE);
    assert_eq!(connection.chain_id, 31_337);
}
