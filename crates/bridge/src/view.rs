//! Text rendering of the session.
//!
//! Views are plain values derived from the session state; building one never talks to the wallet
//! or the contract.

use alloy_primitives::{Address, U256, utils::format_units};
use std::fmt;

pub const TITLE: &str = "Welcome to the Beautiful Metacrafters ATM!";
pub const SUBTITLE: &str = "Empowering Your Digital Banking Experience";

/// One of the three mutually exclusive views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// No wallet provider in the environment.
    InstallWallet,
    /// A wallet is present but no account is connected.
    ConnectWallet,
    /// Account, balance and actions of the connected account.
    Account(AccountPanel),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountPanel {
    pub account: Address,
    /// `None` until the first balance read completes.
    pub balance: Option<U256>,
    /// The amount moved per deposit/withdraw press.
    pub amount: U256,
    pub units: BalanceUnits,
}

/// A button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Connect,
    Deposit,
    Withdraw,
    /// Placeholder, does nothing.
    History,
}

/// How contract amounts are displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceUnits {
    decimals: Option<u8>,
}

impl BalanceUnits {
    /// Shows the raw integer returned by the contract.
    pub const RAW: Self = Self { decimals: None };

    /// Scales amounts down by `10^decimals`.
    pub fn decimals(decimals: u8) -> Self {
        Self { decimals: Some(decimals) }
    }

    pub fn format(&self, value: U256) -> String {
        match self.decimals {
            Some(decimals) => format_units(value, decimals).unwrap_or_else(|err| {
                warn!(decimals, %err, "cannot scale amount, showing the raw value");
                value.to_string()
            }),
            None => value.to_string(),
        }
    }
}

impl From<Option<u8>> for BalanceUnits {
    fn from(decimals: Option<u8>) -> Self {
        Self { decimals }
    }
}

impl View {
    /// The buttons of this view, in display order.
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Self::InstallWallet => &[],
            Self::ConnectWallet => &[Action::Connect],
            Self::Account(_) => &[Action::Deposit, Action::Withdraw, Action::History],
        }
    }

    /// The label of `action`'s button.
    pub fn label(&self, action: Action) -> String {
        let amount = match self {
            Self::Account(panel) => panel.units.format(panel.amount),
            Self::InstallWallet | Self::ConnectWallet => String::new(),
        };
        match action {
            Action::Connect => "Please connect your MetaMask wallet".to_string(),
            Action::Deposit => format!("Deposit {amount} ETH"),
            Action::Withdraw => format!("Withdraw {amount} ETH"),
            Action::History => "View Transaction History".to_string(),
        }
    }

    /// `(action, label)` for every button of this view.
    pub fn buttons(&self) -> Vec<(Action, String)> {
        self.actions().iter().map(|&action| (action, self.label(action))).collect()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallWallet => f.write_str("Please install MetaMask to use this ATM."),
            Self::ConnectWallet => f.write_str("Please connect your MetaMask wallet"),
            Self::Account(panel) => panel.fmt(f),
        }
    }
}

impl fmt::Display for AccountPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Account: {}", self.account)?;
        match self.balance {
            Some(balance) => write!(f, "Your Balance: {} ETH", self.units.format(balance)),
            None => write!(f, "Your Balance: loading... ETH"),
        }
    }
}

/// The whole page: header, the current view and its buttons.
#[derive(Clone, Copy, Debug)]
pub struct Page<'a>(pub &'a View);

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "{SUBTITLE}")?;
        writeln!(f)?;
        match self.0 {
            // the connect prompt is the button itself
            View::ConnectWallet => {}
            view => writeln!(f, "{view}")?,
        }
        for (_, label) in self.0.buttons() {
            writeln!(f, "[ {label} ]")?;
        }
        Ok(())
    }
}
