//! Snapshot of what the front end renders.

use alloy::primitives::{Address, B256};

use crate::amount::Balance;
use crate::token::Asset;

/// Label of the connect button while disconnected.
pub const CONNECT_LABEL: &str = "Connect Wallet";
/// Label of the connect button once an address is present.
pub const DISCONNECT_LABEL: &str = "Disconnect";

/// Everything a renderer needs, published after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Whether a wallet account is connected.
    pub connected: bool,
    /// The connected account; `None` whenever `connected` is false.
    pub address: Option<Address>,
    /// Chain the wallet reports.
    pub chain_id: Option<u64>,
    /// Symbol of the selected token.
    pub selected: String,
    /// Recipient field, as typed.
    pub recipient: String,
    /// Amount field, as typed.
    pub amount: String,
    /// Balance of the selected token for the connected account.
    pub balance: Option<Balance>,
    /// A transfer is in flight.
    pub loading: bool,
    /// Hash of the last transfer sent from this session.
    pub last_tx: Option<B256>,
}

impl SessionState {
    /// Initial state with `selected` preselected.
    #[must_use]
    pub fn new(selected: impl Into<String>) -> Self {
        Self {
            connected: false,
            address: None,
            chain_id: None,
            selected: selected.into(),
            recipient: String::new(),
            amount: String::new(),
            balance: None,
            loading: false,
            last_tx: None,
        }
    }

    /// Text of the connect/disconnect button.
    #[must_use]
    pub const fn connect_label(&self) -> &'static str {
        if self.address.is_some() {
            DISCONNECT_LABEL
        } else {
            CONNECT_LABEL
        }
    }

    /// The transfer form as currently filled in.
    #[must_use]
    pub fn form(&self) -> TransferForm {
        TransferForm {
            token: self.selected.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount.clone(),
        }
    }

    /// Drop everything tied to the connected account.
    pub(crate) fn clear_connection(&mut self) {
        self.connected = false;
        self.address = None;
        self.chain_id = None;
        self.balance = None;
        self.loading = false;
    }
}

/// Transfer form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Selected token symbol.
    pub token: String,
    /// Recipient field.
    pub recipient: String,
    /// Amount field.
    pub amount: String,
}

/// Parameters of the balance read for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceQuery {
    /// Account whose balance is read.
    pub owner: Address,
    /// Native coin or token contract.
    pub asset: Asset,
    /// Symbol shown next to the amount.
    pub symbol: String,
}

/// Abbreviate an address for display: `0xf39F…2266`.
#[must_use]
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{U256, address};

    #[test]
    fn label_follows_address() {
        let mut state = SessionState::new("ETH");
        assert_eq!(state.connect_label(), CONNECT_LABEL);

        state.connected = true;
        state.address = Some(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert_eq!(state.connect_label(), DISCONNECT_LABEL);
    }

    #[test]
    fn clearing_keeps_form_fields() {
        let mut state = SessionState::new("USDC");
        state.connected = true;
        state.address = Some(Address::ZERO);
        state.chain_id = Some(1);
        state.balance = Some(Balance::new(U256::from(1u64), 6, "USDC"));
        state.recipient = "0xabc".into();

        state.clear_connection();
        assert!(!state.connected);
        assert_eq!(state.address, None);
        assert_eq!(state.balance, None);
        assert_eq!(state.recipient, "0xabc");
        assert_eq!(state.selected, "USDC");
    }

    #[test]
    fn short_address_format() {
        let addr = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(short_address(&addr), "0xf39F…2266");
    }
}
