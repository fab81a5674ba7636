//! Wallet and contract backed by a JSON-RPC endpoint whose accounts sign via
//! `eth_sendTransaction`.

use crate::{
    contract::{Assessment, AtmContract, Confirmation},
    error::BridgeError,
    wallet::{Environment, WalletProvider},
};
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use async_trait::async_trait;
use atm_config::Config;
use std::{fmt, time::Duration};
use url::Url;

/// JSON-RPC error code for an unsupported method.
const METHOD_NOT_FOUND: i64 = -32601;

/// Finds the wallet at the configured `eth_rpc_url`.
#[derive(Clone, Debug)]
pub struct RpcEnvironment {
    url: Option<Url>,
    confirmations: u64,
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
}

impl RpcEnvironment {
    pub fn new(config: &Config) -> Result<Self, BridgeError> {
        let url = config
            .eth_rpc_url
            .as_deref()
            .map(|url| {
                Url::parse(url)
                    .map_err(|source| BridgeError::InvalidUrl { url: url.to_string(), source })
            })
            .transpose()?;
        Ok(Self {
            url,
            confirmations: config.confirmations,
            timeout: config.transaction_timeout(),
            poll_interval: config.poll_interval(),
        })
    }
}

#[async_trait]
impl Environment for RpcEnvironment {
    type Wallet = RpcWallet;

    async fn detect_wallet(&self) -> Option<RpcWallet> {
        let url = self.url.as_ref()?;
        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        if let Some(interval) = self.poll_interval {
            provider.client().set_poll_interval(interval);
        }
        self.wallet_at(provider).await
    }
}

impl RpcEnvironment {
    /// Returns the wallet behind `provider` if it answers `eth_chainId`.
    async fn wallet_at(&self, provider: DynProvider) -> Option<RpcWallet> {
        match provider.get_chain_id().await {
            Ok(chain_id) => {
                info!(chain_id, "wallet provider detected");
                Some(RpcWallet {
                    provider,
                    confirmations: self.confirmations,
                    timeout: self.timeout,
                })
            }
            Err(err) => {
                warn!(%err, "wallet provider unreachable");
                None
            }
        }
    }
}

/// A wallet reached over JSON-RPC.
#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcWallet")
            .field("confirmations", &self.confirmations)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    type Contract = RpcAtmContract;

    async fn accounts(&self) -> Result<Vec<Address>, BridgeError> {
        Ok(self.provider.get_accounts().await?)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, BridgeError> {
        let no_params: [(); 0] = [];
        match self
            .provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), no_params)
            .await
        {
            Ok(accounts) => Ok(accounts),
            // plain nodes only know `eth_accounts`
            Err(err) if err.as_error_resp().is_some_and(|resp| resp.code == METHOD_NOT_FOUND) => {
                debug!("eth_requestAccounts not supported, falling back to eth_accounts");
                self.accounts().await
            }
            Err(err) => Err(err.into()),
        }
    }

    fn contract(&self, address: Address, account: Address) -> RpcAtmContract {
        RpcAtmContract {
            instance: Assessment::new(address, self.provider.clone()),
            signer: account,
            confirmations: self.confirmations,
            timeout: self.timeout,
        }
    }
}

/// The ATM contract, with transactions sent from the connected account.
#[derive(Clone)]
pub struct RpcAtmContract {
    instance: Assessment::AssessmentInstance<DynProvider>,
    signer: Address,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl RpcAtmContract {
    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<Confirmation, BridgeError> {
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, confirmations = self.confirmations, "waiting for confirmation");
        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.timeout)
            .get_receipt()
            .await?;
        confirmation(tx_hash, &receipt)
    }
}

impl fmt::Debug for RpcAtmContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcAtmContract")
            .field("address", self.instance.address())
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AtmContract for RpcAtmContract {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    async fn get_balance(&self) -> Result<U256, BridgeError> {
        Ok(self.instance.getBalance().from(self.signer).call().await?)
    }

    async fn deposit(&self, amount: U256) -> Result<Confirmation, BridgeError> {
        let pending =
            self.instance.deposit(amount).from(self.signer).send().await.map_err(revert_reason)?;
        self.confirm(pending).await
    }

    async fn withdraw(&self, amount: U256) -> Result<Confirmation, BridgeError> {
        let pending = self
            .instance
            .withdraw(amount)
            .from(self.signer)
            .send()
            .await
            .map_err(revert_reason)?;
        self.confirm(pending).await
    }
}

/// Checks the receipt of `tx_hash` succeeded.
fn confirmation<R: ReceiptResponse>(
    tx_hash: TxHash,
    receipt: &R,
) -> Result<Confirmation, BridgeError> {
    if !receipt.status() {
        return Err(BridgeError::Reverted { tx_hash });
    }
    Ok(Confirmation { tx_hash, block_number: receipt.block_number(), gas_used: receipt.gas_used() })
}

/// Surfaces the contract's own revert error when the node reports one.
fn revert_reason(err: alloy_contract::Error) -> BridgeError {
    match err.as_decoded_error::<Assessment::InsufficientBalance>() {
        Some(Assessment::InsufficientBalance { balance, withdrawAmount }) => {
            BridgeError::InsufficientBalance { balance, requested: withdrawAmount }
        }
        None => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_rpc::{ErrorPayload, RpcError};
    use alloy_network::Network;
    use alloy_primitives::{address, b256, hex};
    use alloy_sol_types::SolError;
    use alloy_transport::{TransportError, mock::Asserter};
    use similar_asserts::assert_eq;

    const ATM: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn mocked(asserter: &Asserter) -> DynProvider {
        ProviderBuilder::new().connect_mocked_client(asserter.clone()).erased()
    }

    fn wallet(asserter: &Asserter) -> RpcWallet {
        RpcWallet { provider: mocked(asserter), confirmations: 1, timeout: None }
    }

    fn error_payload(code: i64, message: &'static str) -> ErrorPayload {
        ErrorPayload { code, message: message.into(), data: None }
    }

    #[test]
    fn rejects_invalid_url() {
        let config = Config { eth_rpc_url: Some("not a url".to_string()), ..Default::default() };
        let err = RpcEnvironment::new(&config).unwrap_err();
        assert!(
            matches!(&err, BridgeError::InvalidUrl { url, .. } if url == "not a url"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn no_url_means_no_wallet() {
        let env = RpcEnvironment::new(&Config::default()).unwrap();
        assert!(env.detect_wallet().await.is_none());
    }

    #[tokio::test]
    async fn wallet_requires_chain_id_answer() {
        let config = Config { confirmations: 3, ..Default::default() };
        let env = RpcEnvironment::new(&config).unwrap();

        let asserter = Asserter::new();
        asserter.push_success(&"0x7a69");
        let wallet = env.wallet_at(mocked(&asserter)).await.unwrap();
        assert_eq!(wallet.confirmations, 3);
        assert_eq!(wallet.timeout, config.transaction_timeout());

        asserter.push_failure(error_payload(-32603, "Internal error"));
        assert!(env.wallet_at(mocked(&asserter)).await.is_none());
    }

    #[tokio::test]
    async fn request_accounts_falls_back_to_eth_accounts() {
        let asserter = Asserter::new();
        let wallet = wallet(&asserter);

        asserter.push_success(&vec![BOB]);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![BOB]);

        asserter.push_failure(error_payload(METHOD_NOT_FOUND, "Method not found"));
        asserter.push_success(&vec![ALICE]);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![ALICE]);

        asserter.push_failure(error_payload(-32603, "Internal error"));
        let err = wallet.request_accounts().await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn balance_is_read_with_eth_call() {
        let asserter = Asserter::new();
        let contract = wallet(&asserter).contract(ATM, ALICE);
        assert_eq!(contract.address(), ATM);

        asserter.push_success(&hex::encode_prefixed(U256::from(42).to_be_bytes::<32>()));
        assert_eq!(contract.get_balance().await.unwrap(), U256::from(42));
    }

    #[test]
    fn decodes_insufficient_balance_revert() {
        let data = Assessment::InsufficientBalance {
            balance: U256::from(1),
            withdrawAmount: U256::from(2),
        }
        .abi_encode();
        let payload = ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: Some(serde_json::value::to_raw_value(&hex::encode_prefixed(data)).unwrap()),
        };
        let err: TransportError = RpcError::ErrorResp(payload);

        let err = revert_reason(err.into());
        assert!(
            matches!(err, BridgeError::InsufficientBalance { balance, requested }
                if balance == U256::from(1) && requested == U256::from(2)),
            "{err:?}"
        );
        assert!(err.is_alert());

        let err: TransportError = RpcError::ErrorResp(error_payload(-32000, "nonce too low"));
        let err = revert_reason(err.into());
        assert!(matches!(err, BridgeError::Contract(_)), "{err:?}");
        assert!(!err.is_alert());
    }

    fn receipt(status: &str) -> <Ethereum as Network>::ReceiptResponse {
        serde_json::from_value(serde_json::json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": "0x6c1e4a5b1b8e4d1f0e6f5b1a4d2c3b4a5e6f708192a3b4c5d6e7f8091a2b3c4d",
            "transactionIndex": "0x0",
            "blockHash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
            "blockNumber": "0x5",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": ALICE,
            "to": ATM,
            "contractAddress": null
        }))
        .unwrap()
    }

    #[test]
    fn failed_receipt_is_reverted() {
        let tx_hash = b256!("0x6c1e4a5b1b8e4d1f0e6f5b1a4d2c3b4a5e6f708192a3b4c5d6e7f8091a2b3c4d");

        let confirmed = confirmation(tx_hash, &receipt("0x1")).unwrap();
        assert_eq!(confirmed, Confirmation { tx_hash, block_number: Some(5), gas_used: 21_000 });

        let err = confirmation(tx_hash, &receipt("0x0")).unwrap_err();
        assert!(matches!(err, BridgeError::Reverted { tx_hash: hash } if hash == tx_hash));
    }
}
