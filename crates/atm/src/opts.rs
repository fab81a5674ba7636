use alloy_primitives::Address;
use atm_config::{
    Config,
    figment::{
        self, Metadata, Profile,
        value::{Dict, Map},
    },
};
use clap::{Parser, ValueHint};
use eyre::Result;
use std::path::PathBuf;

/// Options overriding the configuration files and environment.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "ATM options")]
pub struct AtmOpts {
    /// The wallet provider endpoint.
    #[arg(short, long = "rpc-url", env = "ETH_RPC_URL", value_name = "URL", global = true)]
    pub rpc_url: Option<String>,

    /// Address of the deployed ATM contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    pub contract: Option<Address>,

    /// Path to the compiled contract artifact.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub artifact: Option<PathBuf>,

    /// Number of confirmations to wait for.
    #[arg(long, global = true)]
    pub confirmations: Option<u64>,

    /// Seconds to wait for a transaction to confirm, 0 waits forever.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Display balances scaled down by 10^DECIMALS.
    #[arg(long, global = true)]
    pub decimals: Option<u8>,

    /// The directory containing `atm.toml`.
    ///
    /// Defaults to the current working directory.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    pub root: Option<PathBuf>,
}

impl AtmOpts {
    /// Loads the config for the selected root with these options merged on top.
    pub fn load_config(&self) -> Result<Config> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let figment = Config::figment_with_root(&root).merge(self.clone());
        let mut config = Config::try_from(figment)?;
        config.root = root;
        Ok(config)
    }

    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.rpc_url {
            dict.insert("eth_rpc_url".to_string(), url.clone().into());
        }
        if let Some(contract) = self.contract {
            dict.insert("contract_address".to_string(), contract.to_string().into());
        }
        if let Some(artifact) = &self.artifact {
            dict.insert("artifact".to_string(), artifact.display().to_string().into());
        }
        if let Some(confirmations) = self.confirmations {
            dict.insert("confirmations".to_string(), confirmations.into());
        }
        if let Some(timeout) = self.timeout {
            dict.insert("transaction_timeout".to_string(), timeout.into());
        }
        if let Some(decimals) = self.decimals {
            dict.insert("balance_decimals".to_string(), decimals.into());
        }
        dict
    }
}

// Make these args a `Figment` so that they can be merged into the `Config`
impl figment::Provider for AtmOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("ATM Opts Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Config::selected_profile(), self.dict())]))
    }
}
