//! The wallet session: UI state driven by wallet and chain calls.
//!
//! [`WalletSession`] is the view-model behind the connect button, the token
//! selector, the balance line and the transfer form. Each user action is one
//! awaited call chain; its outcome lands in [`SessionState`] (published on a
//! `watch` channel) and in a [`Notification`].
//!
//! ```rust,no_run
//! use sendpad::prelude::*;
//!
//! # async fn example() -> sendpad::Result<()> {
//! let config = AppConfig::default();
//! let reader = RpcChainReader::connect(&config.network.rpc_url).await?;
//! let transport = HttpTransport::new(&config.wallet.endpoint)?;
//! let mut session = WalletSession::from_config(&config, transport, reader)?
//!     .with_notifier(LoggingNotifier::new());
//!
//! session.toggle_connection().await?;
//! session.select_token("BUSD")?;
//! session.refresh_balance().await?;
//!
//! session.set_recipient("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
//! session.set_amount("1.5");
//! let tx = session.submit_transfer().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use alloy::primitives::{Address, B256, U256};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

mod state;

pub use state::{
    BalanceQuery, CONNECT_LABEL, DISCONNECT_LABEL, SessionState, TransferForm, short_address,
};

use crate::amount::{Balance, format_amount, parse_amount};
use crate::chain::{ChainReader, erc20};
use crate::config::AppConfig;
use crate::error::{Error, Result, ValidationError};
use crate::notify::{BoxedNotifier, Notification, NoopNotifier, Notifier};
use crate::token::{Asset, TokenInfo, TokenList};
use crate::wallet::{
    Connection, Eip1193, EvmChain, WalletConnector, WalletError, WalletEvent, WalletTransaction,
};

/// A transfer that passed client-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDraft {
    /// Selected token.
    pub token: TokenInfo,
    /// Parsed recipient.
    pub recipient: Address,
    /// Amount as typed (trimmed).
    pub amount: String,
}

/// View-model for a single wallet front end.
pub struct WalletSession<T, R> {
    connector: WalletConnector<T>,
    reader: R,
    tokens: TokenList,
    network: EvmChain,
    rpc_url: String,
    auto_switch_chain: bool,
    refresh_on_connect: bool,
    notifier: BoxedNotifier,
    state: watch::Sender<SessionState>,
}

impl<T, R> fmt::Debug for WalletSession<T, R>
where
    T: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("connector", &self.connector)
            .field("reader", &self.reader)
            .field("network", &self.network)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<T: Eip1193, R: ChainReader> WalletSession<T, R> {
    /// Create a session over `transport` and `reader` offering `tokens`.
    ///
    /// The network defaults to BSC testnet with chain switching off; use
    /// [`with_network`](Self::with_network) or [`from_config`](Self::from_config)
    /// to change it.
    #[must_use]
    pub fn new(transport: T, reader: R, tokens: TokenList) -> Self {
        let (state, _) = watch::channel(SessionState::new(tokens.native().symbol.clone()));
        Self {
            connector: WalletConnector::new(transport),
            reader,
            tokens,
            network: EvmChain::BscTestnet,
            rpc_url: String::new(),
            auto_switch_chain: false,
            refresh_on_connect: true,
            notifier: Box::new(NoopNotifier),
            state,
        }
    }

    /// Create a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token list is invalid.
    pub fn from_config(config: &AppConfig, transport: T, reader: R) -> Result<Self> {
        let tokens = TokenList::from_config(config)?;
        Ok(Self::new(transport, reader, tokens)
            .with_network(config.chain(), config.network.rpc_url.clone())
            .auto_switch_chain(config.wallet.auto_switch_chain))
    }

    /// Set the chain transfers must happen on, and the RPC URL offered to the
    /// wallet if it has to add that chain.
    #[must_use]
    pub fn with_network(mut self, network: EvmChain, rpc_url: impl Into<String>) -> Self {
        self.network = network;
        self.rpc_url = rpc_url.into();
        self
    }

    /// Ask the wallet to switch chains before sending when it is on another one.
    #[must_use]
    pub const fn auto_switch_chain(mut self, enabled: bool) -> Self {
        self.auto_switch_chain = enabled;
        self
    }

    /// Load the selected token's balance as part of [`connect`](Self::connect).
    ///
    /// On by default. Callers that read the balance themselves turn it off
    /// so a failing read is reported once.
    #[must_use]
    pub const fn refresh_on_connect(mut self, enabled: bool) -> Self {
        self.refresh_on_connect = enabled;
        self
    }

    /// Set the notification surface.
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive a new snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Text of the connect/disconnect button.
    #[must_use]
    pub fn connect_label(&self) -> &'static str {
        self.state.borrow().connect_label()
    }

    /// The tokens offered in the selector.
    #[must_use]
    pub const fn tokens(&self) -> &TokenList {
        &self.tokens
    }

    /// The chain transfers are sent on.
    #[must_use]
    pub const fn network(&self) -> &EvmChain {
        &self.network
    }

    /// The wallet connector.
    #[must_use]
    pub const fn connector(&self) -> &WalletConnector<T> {
        &self.connector
    }

    /// The chain reader.
    #[must_use]
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// The selected token.
    #[must_use]
    pub fn selected_token(&self) -> TokenInfo {
        let selected = self.state.borrow().selected.clone();
        self.tokens
            .get(&selected)
            .unwrap_or_else(|| self.tokens.native())
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(f);
    }

    fn notify(&self, notification: &Notification) {
        self.notifier.notify(notification);
    }
}

impl<T: Eip1193, R: ChainReader> WalletSession<T, R> {
    /// Connect if disconnected, disconnect if connected.
    ///
    /// # Errors
    ///
    /// Returns the connection error; it has already been notified.
    pub async fn toggle_connection(&mut self) -> Result<()> {
        if self.state.borrow().connected {
            self.disconnect().await;
            Ok(())
        } else {
            self.connect().await.map(|_| ())
        }
    }

    /// Connect the wallet and load the selected token's balance.
    ///
    /// A failed balance read is notified but does not fail the connection.
    /// See [`refresh_on_connect`](Self::refresh_on_connect).
    ///
    /// # Errors
    ///
    /// Returns the wallet error; it has already been notified.
    pub async fn connect(&mut self) -> Result<Connection> {
        let connection = match self.connector.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(error = %e, "wallet connection failed");
                self.notify(&Notification::error(
                    "Connection failed",
                    describe_wallet_error(&e),
                ));
                return Err(e.into());
            }
        };

        self.update(|s| {
            s.connected = true;
            s.address = Some(connection.address);
            s.chain_id = Some(connection.chain_id);
            s.balance = None;
        });
        self.notify(&Notification::success(
            "Wallet connected",
            format!(
                "{} on {}",
                short_address(&connection.address),
                EvmChain::from_id(connection.chain_id)
            ),
        ));
        self.warn_if_wrong_network(connection.chain_id);

        if self.refresh_on_connect {
            let _ = self.refresh_balance().await;
        }
        Ok(connection)
    }

    /// Disconnect the wallet and clear the address and balance.
    pub async fn disconnect(&mut self) {
        self.connector.disconnect().await;
        self.update(SessionState::clear_connection);
        self.notify(&Notification::info("Wallet disconnected", ""));
    }

    /// Select the token shown in the balance line and used for transfers.
    ///
    /// The previous balance is cleared; call
    /// [`refresh_balance`](Self::refresh_balance) to load the new one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownToken`] if no token has this symbol.
    pub fn select_token(&mut self, symbol: &str) -> std::result::Result<(), ValidationError> {
        let token = self
            .tokens
            .get(symbol)
            .ok_or_else(|| ValidationError::UnknownToken(symbol.to_owned()))?;
        let symbol = token.symbol.clone();
        debug!(token = %symbol, "token selected");

        self.update(|s| {
            if s.selected != symbol {
                s.selected = symbol;
                s.balance = None;
            }
        });
        Ok(())
    }

    /// Parameters of the balance read for the current account and selection.
    ///
    /// `None` while disconnected.
    #[must_use]
    pub fn balance_query(&self) -> Option<BalanceQuery> {
        let owner = self.state.borrow().address?;
        let token = self.selected_token();
        Some(BalanceQuery {
            owner,
            asset: token.asset,
            symbol: token.symbol,
        })
    }

    /// Read the balance of the selected token and publish it.
    ///
    /// Returns `Ok(None)` while disconnected.
    ///
    /// # Errors
    ///
    /// Returns the chain error; it has already been notified.
    pub async fn refresh_balance(&mut self) -> Result<Option<Balance>> {
        let Some(query) = self.balance_query() else {
            return Ok(None);
        };

        match self.read_balance(&query).await {
            Ok(balance) => {
                debug!(owner = %query.owner, balance = %balance, "balance updated");
                let published = balance.clone();
                self.update(|s| s.balance = Some(published));
                Ok(Some(balance))
            }
            Err(e) => {
                warn!(
                    owner = %query.owner,
                    asset = %query.asset,
                    error = %e,
                    "balance read failed",
                );
                self.notify(&Notification::error(
                    "Balance unavailable",
                    format!("{}: {e}", query.symbol),
                ));
                Err(e)
            }
        }
    }

    /// Re-read the balance each time `blocks` yields, until it ends.
    ///
    /// Pass [`RpcChainReader::watch_blocks`](crate::chain::RpcChainReader::watch_blocks)
    /// to keep the balance line current. Items are ignored while
    /// disconnected; failed reads are notified and the watch goes on.
    pub async fn refresh_on_new_blocks<S>(&mut self, mut blocks: S)
    where
        S: Stream + Unpin,
    {
        while blocks.next().await.is_some() {
            trace!("new block");
            let _ = self.refresh_balance().await;
        }
        debug!("block stream ended");
    }

    async fn read_balance(&mut self, query: &BalanceQuery) -> Result<Balance> {
        let decimals = self.decimals_of(&query.symbol, query.asset).await?;
        let raw = match query.asset {
            Asset::Native => self.reader.native_balance(query.owner).await?,
            Asset::Erc20(token) => self.reader.erc20_balance(token, query.owner).await?,
        };
        Ok(Balance::new(raw, decimals, query.symbol.clone()))
    }

    /// Decimals of a token, read from the contract once if not configured.
    async fn decimals_of(&mut self, symbol: &str, asset: Asset) -> Result<u8> {
        if let Some(decimals) = self.tokens.get(symbol).and_then(|t| t.decimals) {
            return Ok(decimals);
        }
        let Asset::Erc20(token) = asset else {
            return Ok(crate::token::NATIVE_DECIMALS);
        };
        let decimals = self.reader.erc20_decimals(token).await?;
        info!(symbol, decimals, "token decimals read from contract");
        self.tokens.set_decimals(symbol, decimals);
        Ok(decimals)
    }

    /// Set the recipient field.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        let recipient = recipient.into();
        self.update(|s| s.recipient = recipient);
    }

    /// Set the amount field.
    pub fn set_amount(&mut self, amount: impl Into<String>) {
        let amount = amount.into();
        self.update(|s| s.amount = amount);
    }

    /// The transfer form as currently filled in.
    #[must_use]
    pub fn form(&self) -> TransferForm {
        self.state.borrow().form()
    }

    /// Check the form without touching the wallet or the chain.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: empty amount, empty recipient,
    /// an invalid recipient address, or no connected wallet.
    pub fn prepare_transfer(&self) -> std::result::Result<TransferDraft, ValidationError> {
        let (amount, recipient, connected) = {
            let state = self.state.borrow();
            (
                state.amount.trim().to_owned(),
                state.recipient.trim().to_owned(),
                state.address.is_some(),
            )
        };

        if amount.is_empty() {
            return Err(ValidationError::EmptyAmount);
        }
        if recipient.is_empty() {
            return Err(ValidationError::EmptyRecipient);
        }
        let recipient: Address = recipient
            .parse()
            .map_err(|_| ValidationError::InvalidRecipient(recipient.clone()))?;
        if !connected {
            return Err(ValidationError::NotConnected);
        }

        Ok(TransferDraft {
            token: self.selected_token(),
            recipient,
            amount,
        })
    }

    /// Validate the form and send the transfer through the wallet.
    ///
    /// Empty or malformed input is rejected before any wallet or chain call.
    /// On success the amount and recipient fields are cleared and the
    /// balance re-read.
    /// The loading flag is set while the wallet call is pending and always
    /// reset afterwards.
    ///
    /// # Errors
    ///
    /// Returns the validation, wallet or chain error; it has already been
    /// notified.
    pub async fn submit_transfer(&mut self) -> Result<B256> {
        let draft = match self.prepare_transfer() {
            Ok(draft) => draft,
            Err(e) => return Err(self.reject(e)),
        };

        let decimals = match self.decimals_of(&draft.token.symbol, draft.token.asset).await {
            Ok(decimals) => decimals,
            Err(e) => {
                self.notify(&Notification::error("Transfer failed", e.to_string()));
                return Err(e);
            }
        };
        let value = match parse_amount(&draft.amount, decimals) {
            Ok(value) => value,
            Err(e) => return Err(self.reject(e)),
        };
        if let Some(e) = self.insufficient_balance(&draft.token.symbol, value) {
            return Err(self.reject(e));
        }

        self.update(|s| s.loading = true);
        let result = self.send(&draft, value).await;
        self.update(|s| s.loading = false);

        match result {
            Ok(hash) => {
                self.update(|s| {
                    s.last_tx = Some(hash);
                    s.amount.clear();
                    s.recipient.clear();
                });
                self.notify(&Notification::success(
                    "Transfer sent",
                    format!(
                        "{} {} to {} (tx {hash})",
                        format_amount(value, decimals),
                        draft.token.symbol,
                        short_address(&draft.recipient),
                    ),
                ));
                let _ = self.refresh_balance().await;
                Ok(hash)
            }
            Err(e) => {
                warn!(error = %e, token = %draft.token.symbol, "transfer failed");
                let message = match &e {
                    Error::Wallet(w) => describe_wallet_error(w),
                    other => other.to_string(),
                };
                self.notify(&Notification::error("Transfer failed", message));
                Err(e)
            }
        }
    }

    async fn send(&mut self, draft: &TransferDraft, value: U256) -> Result<B256> {
        self.ensure_network().await?;

        let tx = match draft.token.asset {
            Asset::Native => WalletTransaction::native(draft.recipient, value),
            Asset::Erc20(token) => {
                WalletTransaction::call(token, erc20::transfer_calldata(draft.recipient, value))
            }
        };
        info!(
            token = %draft.token.symbol,
            to = %draft.recipient,
            %value,
            "submitting transfer",
        );
        Ok(self.connector.send_transaction(tx).await?)
    }

    async fn ensure_network(&mut self) -> Result<()> {
        let current = self.connector.chain_id();
        if !self.auto_switch_chain || current == Some(self.network.id()) {
            return Ok(());
        }
        self.connector
            .switch_chain(&self.network, &self.rpc_url)
            .await?;
        let chain_id = self.network.id();
        self.update(|s| s.chain_id = Some(chain_id));
        Ok(())
    }

    fn insufficient_balance(&self, symbol: &str, value: U256) -> Option<ValidationError> {
        let state = self.state.borrow();
        let balance = state.balance.as_ref()?;
        (balance.symbol == symbol && !balance.covers(value)).then(|| {
            ValidationError::InsufficientBalance {
                available: balance.to_string(),
            }
        })
    }

    fn reject(&self, e: ValidationError) -> Error {
        debug!(error = %e, "transfer rejected client-side");
        self.notify(&Notification::error("Invalid transfer", e.to_string()));
        e.into()
    }

    /// Apply an event pushed by the wallet.
    pub async fn handle_event(&mut self, event: &WalletEvent) {
        if !self.connector.apply_event(event) {
            return;
        }

        match self.connector.connection() {
            None => {
                self.update(SessionState::clear_connection);
                self.notify(&Notification::info("Wallet disconnected", ""));
            }
            Some(connection) => {
                let account_changed = self.state.borrow().address != Some(connection.address);
                self.update(|s| {
                    s.address = Some(connection.address);
                    s.chain_id = Some(connection.chain_id);
                    s.balance = None;
                });
                if account_changed {
                    self.notify(&Notification::info(
                        "Account changed",
                        short_address(&connection.address),
                    ));
                } else {
                    self.warn_if_wrong_network(connection.chain_id);
                }
                let _ = self.refresh_balance().await;
            }
        }
    }

    fn warn_if_wrong_network(&self, chain_id: u64) {
        if chain_id != self.network.id() {
            self.notify(&Notification::info(
                "Wrong network",
                format!(
                    "wallet is on {}, transfers use {}",
                    EvmChain::from_id(chain_id),
                    self.network
                ),
            ));
        }
    }
}

/// User-facing wording for wallet failures.
fn describe_wallet_error(e: &WalletError) -> String {
    match e {
        WalletError::Unavailable(_) => "No wallet found. Install or unlock a wallet.".to_owned(),
        WalletError::Rejected(_) => "Request rejected in the wallet.".to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chain::MockChain;
    use crate::notify::{NotificationLevel, RecordingNotifier};
    use crate::wallet::{MockWallet, methods};
    use alloy::primitives::{address, b256};
    use serde_json::json;
    use std::sync::Arc;

    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const BUSD: Address = address!("337610d27c682E347C9cD60BD4b3b107C9d34dDd");
    const TX: B256 = b256!("5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060");
    const BSC_TESTNET: u64 = 97;

    type TestSession = WalletSession<Arc<MockWallet>, Arc<MockChain>>;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    type Fixture = (TestSession, Arc<MockWallet>, Arc<MockChain>, RecordingNotifier);

    fn fixture(wallet: MockWallet) -> Fixture {
        let wallet = Arc::new(wallet);
        let chain = Arc::new(
            MockChain::new()
                .with_native(ALICE, ether(2))
                .with_token(BUSD, "BUSD", 18)
                .with_token_balance(BUSD, ALICE, ether(5)),
        );
        let notes = RecordingNotifier::new();
        let session = WalletSession::from_config(
            &AppConfig::default(),
            Arc::clone(&wallet),
            Arc::clone(&chain),
        )
        .unwrap()
        .with_notifier(notes.clone());
        (session, wallet, chain, notes)
    }

    fn unlocked() -> MockWallet {
        MockWallet::unlocked(ALICE, BSC_TESTNET, TX)
    }

    #[tokio::test]
    async fn label_toggles_with_connection() {
        let (mut session, ..) = fixture(unlocked());
        assert_eq!(session.connect_label(), CONNECT_LABEL);

        session.toggle_connection().await.unwrap();
        assert_eq!(session.connect_label(), DISCONNECT_LABEL);

        session.toggle_connection().await.unwrap();
        assert_eq!(session.connect_label(), CONNECT_LABEL);
    }

    #[tokio::test]
    async fn connect_loads_native_balance() {
        let (mut session, _, _, notes) = fixture(unlocked());
        session.connect().await.unwrap();

        let state = session.state();
        assert!(state.connected);
        assert_eq!(state.address, Some(ALICE));
        assert_eq!(state.chain_id, Some(BSC_TESTNET));
        assert_eq!(state.balance.unwrap().to_string(), "2 tBNB");
        assert_eq!(notes.all()[0].level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn rejected_connection_is_notified() {
        let wallet = MockWallet::new().with_default(
            methods::REQUEST_ACCOUNTS,
            Err(WalletError::from_rpc(4001, "User rejected the request.")),
        );
        let (mut session, _, _, notes) = fixture(wallet);

        let err = session.toggle_connection().await.unwrap_err();
        assert!(matches!(err, Error::Wallet(WalletError::Rejected(_))));
        assert_eq!(session.connect_label(), CONNECT_LABEL);

        let note = notes.last().unwrap();
        assert!(note.is_error());
        assert_eq!(note.title, "Connection failed");
        assert!(note.message.contains("rejected"));
    }

    #[tokio::test]
    async fn missing_wallet_is_notified() {
        let wallet = MockWallet::new().with_default(
            methods::REQUEST_ACCOUNTS,
            Err(WalletError::unavailable("connection refused")),
        );
        let (mut session, _, _, notes) = fixture(wallet);

        assert!(session.connect().await.is_err());
        assert!(notes.last().unwrap().message.contains("No wallet found"));
    }

    #[tokio::test]
    async fn disconnect_clears_address_and_balance() {
        let (mut session, _, _, notes) = fixture(unlocked());
        session.connect().await.unwrap();
        assert!(session.state().balance.is_some());

        session.disconnect().await;
        let state = session.state();
        assert!(!state.connected);
        assert_eq!(state.address, None);
        assert_eq!(state.balance, None);
        assert_eq!(session.balance_query(), None);
        assert_eq!(notes.last().unwrap().title, "Wallet disconnected");
    }

    #[tokio::test]
    async fn selecting_token_updates_query() {
        let (mut session, ..) = fixture(unlocked());
        session.connect().await.unwrap();

        let query = session.balance_query().unwrap();
        assert_eq!(query.asset, Asset::Native);
        assert_eq!(query.symbol, "tBNB");

        session.select_token("busd").unwrap();
        let query = session.balance_query().unwrap();
        assert_eq!(query.owner, ALICE);
        assert_eq!(query.asset, Asset::Erc20(BUSD));
        assert_eq!(query.symbol, "BUSD");
        assert_eq!(session.state().balance, None);

        let balance = session.refresh_balance().await.unwrap().unwrap();
        assert_eq!(balance.to_string(), "5 BUSD");
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let (mut session, ..) = fixture(unlocked());
        assert_eq!(
            session.select_token("DAI"),
            Err(ValidationError::UnknownToken("DAI".into()))
        );
        assert_eq!(session.state().selected, "tBNB");
    }

    #[tokio::test]
    async fn empty_fields_rejected_without_calls() {
        let (mut session, wallet, chain, notes) = fixture(unlocked());
        session.connect().await.unwrap();
        let calls_before = wallet.calls().len();
        let reads_before = chain.reads();

        session.set_recipient(BOB.to_string());
        let err = session.submit_transfer().await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyAmount)));

        session.set_recipient("  ");
        session.set_amount("1");
        let err = session.submit_transfer().await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyRecipient)));

        assert_eq!(wallet.calls().len(), calls_before);
        assert_eq!(chain.reads(), reads_before);
        assert_eq!(notes.last().unwrap().title, "Invalid transfer");
        assert!(!session.state().loading);
    }

    #[tokio::test]
    async fn bad_recipient_and_amount_rejected() {
        let (mut session, wallet, ..) = fixture(unlocked());
        session.connect().await.unwrap();

        session.set_recipient("0x1234");
        session.set_amount("1");
        assert!(matches!(
            session.submit_transfer().await.unwrap_err(),
            Error::Validation(ValidationError::InvalidRecipient(_))
        ));

        session.set_recipient(BOB.to_string());
        session.set_amount("1.5.0");
        assert!(matches!(
            session.submit_transfer().await.unwrap_err(),
            Error::Validation(ValidationError::InvalidAmount(_))
        ));

        session.set_amount("3");
        assert!(matches!(
            session.submit_transfer().await.unwrap_err(),
            Error::Validation(ValidationError::InsufficientBalance { .. })
        ));
        assert_eq!(wallet.call_count(methods::SEND_TRANSACTION), 0);
    }

    #[tokio::test]
    async fn transfer_requires_connection() {
        let (mut session, wallet, ..) = fixture(unlocked());
        session.set_recipient(BOB.to_string());
        session.set_amount("1");

        let err = session.submit_transfer().await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NotConnected)));
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn bad_recipient_reported_before_connection() {
        let (mut session, wallet, chain, notes) = fixture(unlocked());
        session.set_recipient("not-an-address");
        session.set_amount("1");

        let err = session.submit_transfer().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidRecipient(ref r)) if r == "not-an-address"
        ));
        assert!(wallet.calls().is_empty());
        assert_eq!(chain.reads(), 0);
        assert_eq!(notes.last().unwrap().title, "Invalid transfer");
    }

    #[tokio::test]
    async fn native_transfer_goes_through_wallet() {
        let (mut session, wallet, _, notes) = fixture(unlocked());
        session.connect().await.unwrap();
        session.set_recipient(BOB.to_string());
        session.set_amount("0.5");
        assert_eq!(
            session.form(),
            TransferForm {
                token: "tBNB".into(),
                recipient: BOB.to_string(),
                amount: "0.5".into(),
            }
        );

        let hash = session.submit_transfer().await.unwrap();
        assert_eq!(hash, TX);

        let call = wallet.last_call(methods::SEND_TRANSACTION).unwrap();
        let tx: WalletTransaction = serde_json::from_value(call.params[0].clone()).unwrap();
        assert_eq!(tx.from, Some(ALICE));
        assert_eq!(tx.to, BOB);
        assert_eq!(tx.value, Some(ether(1) / U256::from(2u64)));
        assert_eq!(tx.data, None);

        let state = session.state();
        assert_eq!(state.last_tx, Some(TX));
        assert!(state.amount.is_empty());
        assert!(state.recipient.is_empty());
        assert!(!state.loading);

        let note = notes.last().unwrap();
        assert_eq!(note.level, NotificationLevel::Success);
        assert!(note.message.contains("0.5 tBNB"));
    }

    #[tokio::test]
    async fn token_transfer_calls_contract() {
        let (mut session, wallet, ..) = fixture(unlocked());
        session.connect().await.unwrap();
        session.select_token("BUSD").unwrap();
        session.set_recipient(BOB.to_string());
        session.set_amount("1.25");

        session.submit_transfer().await.unwrap();

        let call = wallet.last_call(methods::SEND_TRANSACTION).unwrap();
        let tx: WalletTransaction = serde_json::from_value(call.params[0].clone()).unwrap();
        assert_eq!(tx.to, BUSD);
        assert_eq!(tx.value, None);
        assert_eq!(
            tx.data.unwrap(),
            erc20::transfer_calldata(BOB, ether(5) / U256::from(4u64))
        );
        assert!(session.form().recipient.is_empty());
    }

    #[tokio::test]
    async fn rejected_transfer_resets_loading() {
        let wallet = unlocked().with_default(
            methods::SEND_TRANSACTION,
            Err(WalletError::from_rpc(4001, "User denied transaction signature.")),
        );
        let (mut session, _, _, notes) = fixture(wallet);
        let mut rx = session.subscribe();
        session.connect().await.unwrap();
        session.set_recipient(BOB.to_string());
        session.set_amount("1");

        let err = session.submit_transfer().await.unwrap_err();
        assert!(matches!(err, Error::Wallet(WalletError::Rejected(_))));

        let state = session.state();
        assert!(!state.loading);
        assert_eq!(state.amount, "1");
        assert_eq!(state.last_tx, None);
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().loading);

        let note = notes.last().unwrap();
        assert_eq!(note.title, "Transfer failed");
        assert!(note.message.contains("rejected"));
    }

    #[tokio::test]
    async fn switches_chain_before_sending() {
        let wallet = MockWallet::unlocked(ALICE, 1, TX);
        let (mut session, wallet_handle, _, notes) = fixture(wallet);
        session.connect().await.unwrap();
        assert!(notes.all().iter().any(|n| n.title == "Wrong network"));

        session.set_recipient(BOB.to_string());
        session.set_amount("1");
        session.submit_transfer().await.unwrap();

        let switch = wallet_handle.last_call(methods::SWITCH_CHAIN).unwrap();
        assert_eq!(switch.params[0]["chainId"], json!("0x61"));
        assert_eq!(session.state().chain_id, Some(BSC_TESTNET));
    }

    #[tokio::test]
    async fn undeclared_decimals_are_read_once() {
        let mut config = AppConfig::default();
        config.tokens[0].decimals = None;
        let wallet = Arc::new(unlocked());
        let chain = Arc::new(
            MockChain::new()
                .with_token(BUSD, "BUSD", 18)
                .with_token_balance(BUSD, ALICE, ether(1)),
        );
        let mut session =
            WalletSession::from_config(&config, Arc::clone(&wallet), Arc::clone(&chain)).unwrap();
        session.select_token("BUSD").unwrap();
        session.connect().await.unwrap();

        assert_eq!(session.state().balance.unwrap().to_string(), "1 BUSD");
        assert_eq!(session.tokens().get("BUSD").unwrap().decimals, Some(18));

        let reads = chain.reads();
        session.refresh_balance().await.unwrap();
        assert_eq!(chain.reads(), reads + 1);
    }

    #[tokio::test]
    async fn balance_failure_is_notified_but_connect_succeeds() {
        let (mut session, _, chain, notes) = fixture(unlocked());
        chain.set_failing(true);

        session.connect().await.unwrap();
        assert!(session.state().connected);
        assert_eq!(session.state().balance, None);
        assert_eq!(notes.last().unwrap().title, "Balance unavailable");
    }

    #[tokio::test]
    async fn account_change_event_reloads_balance() {
        let (mut session, _, chain, notes) = fixture(unlocked());
        chain.set_native(BOB, ether(7));
        session.connect().await.unwrap();

        session
            .handle_event(&WalletEvent::AccountsChanged(vec![BOB]))
            .await;
        let state = session.state();
        assert_eq!(state.address, Some(BOB));
        assert_eq!(state.balance.unwrap().to_string(), "7 tBNB");
        assert!(notes.all().iter().any(|n| n.title == "Account changed"));

        session.handle_event(&WalletEvent::AccountsChanged(vec![])).await;
        assert_eq!(session.connect_label(), CONNECT_LABEL);
        assert_eq!(session.state().balance, None);
    }

    #[tokio::test]
    async fn events_ignored_while_disconnected() {
        let (mut session, _, _, notes) = fixture(unlocked());
        session.handle_event(&WalletEvent::ChainChanged(1)).await;
        assert!(notes.is_empty());
        assert_eq!(session.state().chain_id, None);
    }

    #[tokio::test]
    async fn wallet_disconnect_event_clears_session() {
        let (mut session, _, _, notes) = fixture(unlocked());
        session.connect().await.unwrap();
        assert!(session.state().balance.is_some());

        session.handle_event(&WalletEvent::Disconnect).await;
        let state = session.state();
        assert!(!state.connected);
        assert_eq!(state.address, None);
        assert_eq!(state.balance, None);
        assert_eq!(session.connect_label(), CONNECT_LABEL);
        assert_eq!(notes.last().unwrap().title, "Wallet disconnected");
    }

    #[tokio::test]
    async fn chain_change_event_warns_about_network() {
        let (mut session, _, _, notes) = fixture(unlocked());
        session.connect().await.unwrap();
        notes.drain();

        session.handle_event(&WalletEvent::ChainChanged(1)).await;
        let state = session.state();
        assert_eq!(state.chain_id, Some(1));
        assert_eq!(state.address, Some(ALICE));
        assert_eq!(state.balance.unwrap().to_string(), "2 tBNB");
        let note = notes.all().into_iter().find(|n| n.title == "Wrong network").unwrap();
        assert!(note.message.contains("ethereum (1)"));
        assert!(note.message.contains("bsc-testnet (97)"));
    }

    #[tokio::test]
    async fn balance_follows_new_blocks() {
        let (mut session, _, chain, _) = fixture(unlocked());
        session.connect().await.unwrap();
        assert_eq!(session.state().balance.unwrap().to_string(), "2 tBNB");

        chain.set_native(ALICE, ether(3));
        let reads = chain.reads();
        session
            .refresh_on_new_blocks(futures::stream::iter([B256::ZERO, B256::ZERO]))
            .await;
        assert_eq!(chain.reads(), reads + 2);
        assert_eq!(session.state().balance.unwrap().to_string(), "3 tBNB");
    }

    #[tokio::test]
    async fn new_blocks_ignored_while_disconnected() {
        let (mut session, _, chain, notes) = fixture(unlocked());
        session
            .refresh_on_new_blocks(futures::stream::iter([B256::ZERO]))
            .await;
        assert_eq!(chain.reads(), 0);
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn connect_can_leave_balance_to_caller() {
        let (session, _, chain, notes) = fixture(unlocked());
        let mut session = session.refresh_on_connect(false);
        chain.set_failing(true);

        session.connect().await.unwrap();
        assert_eq!(chain.reads(), 0);
        assert_eq!(session.state().balance, None);

        assert!(session.refresh_balance().await.is_err());
        let unavailable = notes
            .all()
            .iter()
            .filter(|n| n.title == "Balance unavailable")
            .count();
        assert_eq!(unavailable, 1);
    }
}
