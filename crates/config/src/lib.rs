//! # atm-config
//!
//! Layered configuration for the ATM: built-in defaults, the `[profile.<name>]` tables of
//! `atm.toml`, `ATM_*` environment variables and `ETH_RPC_URL`, in increasing order of precedence.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, address};
use figment::{
    Error, Figment, Metadata, Profile, Provider,
    providers::{Env, Serialized},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

mod descriptor;
pub use descriptor::ContractDescriptor;

pub mod error;
pub use error::ConfigError;

mod providers;
use providers::TomlFileProvider;

pub use figment;

/// ATM configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The selected profile. **(default)** `default`
    #[serde(skip)]
    pub profile: Profile,
    /// The directory relative paths are resolved against.
    #[serde(skip)]
    pub root: PathBuf,

    /// The wallet provider endpoint. `None` means no wallet is available.
    pub eth_rpc_url: Option<String>,
    /// Address of the deployed ATM contract.
    pub contract_address: Address,
    /// The contract artifact emitted by the contract build.
    pub artifact: PathBuf,
    /// Number of confirmations to wait for after submitting a transaction.
    pub confirmations: u64,
    /// Seconds to wait for a transaction to confirm, `0` waits forever.
    pub transaction_timeout: u64,
    /// Seconds between receipt polls.
    pub poll_interval: Option<u64>,
    /// The amount deposited or withdrawn per button press.
    pub amount: u64,
    /// Decimals to scale the displayed balance by. `None` shows the raw contract value.
    pub balance_decimals: Option<u8>,
}

impl Config {
    /// The default profile: "default"
    pub const DEFAULT_PROFILE: Profile = Profile::const_new("default");

    /// File name of config toml file
    pub const FILE_NAME: &'static str = "atm.toml";

    /// Env var selecting the active profile.
    pub const PROFILE_ENV: &'static str = "ATM_PROFILE";

    /// Env var overriding the location of the config file.
    pub const CONFIG_ENV: &'static str = "ATM_CONFIG";

    /// The address the contract lands at when deployed first on a fresh dev node.
    ///
    /// `0x5FbDB2315678afecb367f032d93F642f64180aa3`
    pub const DEFAULT_CONTRACT_ADDRESS: Address =
        address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    /// Where the contract build writes the ATM artifact.
    pub const DEFAULT_ARTIFACT: &'static str = "artifacts/contracts/Assessment.sol/Assessment.json";

    /// The largest number of decimals a balance can be scaled by.
    pub const MAX_BALANCE_DECIMALS: u8 = 77;

    /// Returns the selected profile.
    ///
    /// If the `ATM_PROFILE` env variable is not set, this returns the `DEFAULT_PROFILE`.
    pub fn selected_profile() -> Profile {
        Profile::from_env_or(Self::PROFILE_ENV, Self::DEFAULT_PROFILE)
    }

    /// Returns the current `Config` for the current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_root(".")
    }

    /// Returns the `Config` for the project at `root`.
    pub fn load_with_root(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        let mut config = Self::try_from(Self::figment_with_root(root))?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Attempts to extract a `Config` from `provider`, returning the result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use atm_config::{Config, figment::providers::Serialized};
    ///
    /// let figment = Config::figment().merge(Serialized::default("confirmations", 3));
    /// let config = Config::try_from(figment).unwrap();
    /// assert_eq!(config.confirmations, 3);
    /// ```
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        let figment = Figment::from(provider);
        trace!("load config with provider: {:?}", figment.metadata().collect::<Vec<_>>());
        let mut config = figment.extract::<Self>().map_err(ConfigError::Extract)?;
        config.profile = figment.profile().clone();
        if let Some(decimals) = config.balance_decimals
            && decimals > Self::MAX_BALANCE_DECIMALS
        {
            return Err(ConfigError::BalanceDecimals { decimals, max: Self::MAX_BALANCE_DECIMALS });
        }
        Ok(config)
    }

    /// The default figment for the current working directory.
    ///
    /// See [`figment_with_root`](Self::figment_with_root).
    pub fn figment() -> Figment {
        Self::figment_with_root(".")
    }

    /// Returns the default figment for the project at `root`.
    ///
    /// Merges, in order: [`Config::default`], `<root>/atm.toml` (or the file named by
    /// `ATM_CONFIG`), `ATM_*` env vars, and `ETH_RPC_URL`.
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        Figment::from(Self::default())
            .merge(TomlFileProvider::new(
                Some(Self::CONFIG_ENV),
                root.as_ref().join(Self::FILE_NAME),
            ))
            .merge(Env::prefixed("ATM_").ignore(&["PROFILE", "CONFIG", "DEBUG"]).global())
            .merge(Env::raw().only(&["ETH_RPC_URL"]).global())
            .select(Self::selected_profile())
    }

    /// Returns the artifact path, resolved against the config root.
    pub fn artifact_path(&self) -> PathBuf {
        if self.artifact.is_absolute() {
            self.artifact.clone()
        } else {
            self.root.join(&self.artifact)
        }
    }

    /// Loads the contract interface descriptor from [`artifact_path`](Self::artifact_path).
    pub fn contract_descriptor(&self) -> Result<ContractDescriptor, ConfigError> {
        ContractDescriptor::load(self.artifact_path(), self.contract_address)
    }

    /// Returns how long to wait for a transaction to confirm, if bounded.
    pub fn transaction_timeout(&self) -> Option<Duration> {
        (self.transaction_timeout > 0).then(|| Duration::from_secs(self.transaction_timeout))
    }

    /// Returns the receipt polling interval, if configured.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval.map(Duration::from_secs)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("ATM Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Serialized::defaults(self).data()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Self::DEFAULT_PROFILE,
            root: PathBuf::from("."),
            eth_rpc_url: None,
            contract_address: Self::DEFAULT_CONTRACT_ADDRESS,
            artifact: PathBuf::from(Self::DEFAULT_ARTIFACT),
            confirmations: 1,
            transaction_timeout: 120,
            poll_interval: None,
            amount: 1,
            balance_decimals: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_figment_is_default() {
        figment::Jail::expect_with(|jail| {
            let config = Config::load_with_root(jail.directory()).unwrap();
            assert_eq!(config, Config { root: jail.directory().to_path_buf(), ..Config::default() });
            Ok(())
        });
    }

    #[test]
    fn test_toml_profile() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "atm.toml",
                r#"
                [profile.default]
                eth_rpc_url = "http://localhost:8545"
                confirmations = 3
                balance_decimals = 18

                [profile.ci]
                confirmations = 6
            "#,
            )?;

            let config = Config::load().unwrap();
            assert_eq!(config.eth_rpc_url.as_deref(), Some("http://localhost:8545"));
            assert_eq!(config.confirmations, 3);
            assert_eq!(config.balance_decimals, Some(18));
            assert_eq!(config.profile, Config::DEFAULT_PROFILE);

            jail.set_env("ATM_PROFILE", "ci");
            let config = Config::load().unwrap();
            assert_eq!(config.profile, Profile::new("ci"));
            assert_eq!(config.confirmations, 6);
            // inherited from the default profile
            assert_eq!(config.eth_rpc_url.as_deref(), Some("http://localhost:8545"));

            Ok(())
        });
    }

    #[test]
    fn test_env_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "atm.toml",
                r#"
                [profile.default]
                eth_rpc_url = "http://localhost:8545"
                amount = 2
            "#,
            )?;
            jail.set_env("ATM_AMOUNT", "5");
            jail.set_env("ATM_CONTRACT_ADDRESS", "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
            jail.set_env("ETH_RPC_URL", "http://127.0.0.1:9545");

            let config = Config::load().unwrap();
            assert_eq!(config.amount, 5);
            assert_eq!(
                config.contract_address,
                address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
            );
            assert_eq!(config.eth_rpc_url.as_deref(), Some("http://127.0.0.1:9545"));
            Ok(())
        });
    }

    #[test]
    fn test_custom_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("other.toml", "[profile.default]\ntransaction_timeout = 0\n")?;
            jail.set_env("ATM_CONFIG", "other.toml");
            let config = Config::load().unwrap();
            assert_eq!(config.transaction_timeout(), None);

            jail.set_env("ATM_CONFIG", "missing.toml");
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("missing.toml"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ATM_CONFIRMATIONS", "many");
            let err = Config::load().unwrap_err();
            let msg = err.to_string();
            assert!(msg.starts_with("invalid atm config:"), "{msg}");
            assert!(msg.contains("confirmations"), "{msg}");
            Ok(())
        });
    }

    #[test]
    fn test_balance_decimals_bounds() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ATM_BALANCE_DECIMALS", "77");
            assert_eq!(Config::load().unwrap().balance_decimals, Some(77));

            jail.set_env("ATM_BALANCE_DECIMALS", "78");
            let err = Config::load().unwrap_err();
            assert!(
                matches!(err, ConfigError::BalanceDecimals { decimals: 78, max: 77 }),
                "{err:?}"
            );
            assert_eq!(err.to_string(), "`balance_decimals` must be at most 77, got 78");
            Ok(())
        });
    }

    #[test]
    fn test_paths_and_durations() {
        let config = Config { root: PathBuf::from("/srv/atm"), ..Default::default() };
        assert_eq!(
            config.artifact_path(),
            PathBuf::from("/srv/atm/artifacts/contracts/Assessment.sol/Assessment.json")
        );
        assert_eq!(config.transaction_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.poll_interval(), None);

        let config = Config {
            artifact: PathBuf::from("/abs/Assessment.json"),
            poll_interval: Some(2),
            ..Default::default()
        };
        assert_eq!(config.artifact_path(), PathBuf::from("/abs/Assessment.json"));
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(2)));
    }
}
