use crate::error::BridgeError;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use std::fmt;

sol! {
    #[sol(rpc)]
    interface Assessment {
        error InsufficientBalance(uint256 balance, uint256 withdrawAmount);

        function getBalance() external view returns (uint256);
        function deposit(uint256 _amount) external payable;
        function withdraw(uint256 _withdrawAmount) external;
    }
}

/// A submitted transaction that reached the required number of confirmations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// A client-side binding to the deployed ATM contract, scoped to a signer.
#[async_trait]
pub trait AtmContract: fmt::Debug + Send + Sync {
    /// The contract address.
    fn address(&self) -> Address;

    /// Queries the balance held by the contract.
    async fn get_balance(&self) -> Result<U256, BridgeError>;

    /// Submits `deposit(amount)` and waits until it is confirmed.
    async fn deposit(&self, amount: U256) -> Result<Confirmation, BridgeError>;

    /// Submits `withdraw(amount)` and waits until it is confirmed.
    async fn withdraw(&self, amount: U256) -> Result<Confirmation, BridgeError>;
}

/// Checks that `abi` declares every function the bridge calls, with matching selectors.
pub fn verify_interface(abi: &JsonAbi) -> Result<(), BridgeError> {
    let required = [
        ("getBalance", Assessment::getBalanceCall::SIGNATURE, Assessment::getBalanceCall::SELECTOR),
        ("deposit", Assessment::depositCall::SIGNATURE, Assessment::depositCall::SELECTOR),
        ("withdraw", Assessment::withdrawCall::SIGNATURE, Assessment::withdrawCall::SELECTOR),
    ];
    for (name, signature, selector) in required {
        let declared = abi
            .function(name)
            .is_some_and(|overloads| overloads.iter().any(|f| f.selector().0 == selector));
        if !declared {
            return Err(BridgeError::InterfaceMismatch { signature });
        }
    }
    Ok(())
}
