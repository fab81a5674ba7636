use crate::opts::AtmOpts;
use alloy_primitives::U256;
use clap::{Parser, Subcommand};

/// Deposit to and withdraw from the Metacrafters ATM contract with your wallet.
#[derive(Parser)]
#[command(name = "atm", version, next_display_order = None)]
pub struct Atm {
    #[command(flatten)]
    pub opts: AtmOpts,

    #[command(subcommand)]
    pub cmd: Option<AtmSubcommand>,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum AtmSubcommand {
    /// Opens the interactive ATM page. This is the default.
    Ui,

    /// Prints the page for the current wallet state without requesting account access.
    Status,

    /// Requests account access and prints the account panel.
    Connect,

    /// Prints the balance of the connected account.
    #[command(visible_alias = "bal")]
    Balance,

    /// Deposits into the ATM and prints the updated panel.
    Deposit {
        /// The amount to deposit. Defaults to the configured amount.
        amount: Option<U256>,
    },

    /// Withdraws from the ATM and prints the updated panel.
    Withdraw {
        /// The amount to withdraw. Defaults to the configured amount.
        amount: Option<U256>,
    },
}
