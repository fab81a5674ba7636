use crate::{contract::AtmContract, error::BridgeError};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::fmt;

/// The environment the session runs in, which may or may not expose a wallet.
#[async_trait]
pub trait Environment: Send + Sync {
    type Wallet: WalletProvider;

    /// Looks for a wallet provider. Absence is not an error.
    async fn detect_wallet(&self) -> Option<Self::Wallet>;
}

/// An EIP-1193 style wallet: hands out accounts and signs on their behalf.
#[async_trait]
pub trait WalletProvider: Clone + fmt::Debug + Send + Sync {
    type Contract: AtmContract;

    /// Accounts the user already authorized (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<Address>, BridgeError>;

    /// Asks the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, BridgeError>;

    /// Binds the contract at `address` to a signer for `account`.
    fn contract(&self, address: Address, account: Address) -> Self::Contract;
}
