use alloy_primitives::{TxHash, U256};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;

/// Errors surfaced by bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// `connect` was pressed without a wallet provider.
    #[error("MetaMask wallet is required to connect")]
    WalletRequired,
    /// The wallet authorized no accounts.
    #[error("No account found")]
    NoAccounts,
    #[error("invalid wallet provider URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The loaded contract interface lacks a function the ATM calls.
    #[error("contract interface does not declare `{signature}`")]
    InterfaceMismatch { signature: &'static str },
    #[error("insufficient balance: requested {requested}, available {balance}")]
    InsufficientBalance { balance: U256, requested: U256 },
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Contract(#[from] alloy_contract::Error),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
}

impl BridgeError {
    /// Whether the error is shown to the user as an alert rather than ending the interaction.
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::WalletRequired | Self::NoAccounts | Self::InsufficientBalance { .. })
    }
}
