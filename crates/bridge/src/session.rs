use crate::{
    contract::{AtmContract, Confirmation},
    error::BridgeError,
    view::{AccountPanel, Action, BalanceUnits, View},
    wallet::{Environment, WalletProvider},
};
use alloy_primitives::{Address, U256};

/// Where the session stands with respect to the wallet and the contract.
#[derive(Debug)]
pub enum SessionState<W: WalletProvider> {
    /// The environment has not been probed yet.
    Unprobed,
    /// The environment exposes no wallet provider.
    NoProvider,
    /// A wallet is available but no account is connected.
    Disconnected { wallet: W },
    /// An account is connected and the contract is bound to it.
    Connected {
        wallet: W,
        account: Address,
        contract: W::Contract,
        /// Last balance read, `None` until the first read completes.
        balance: Option<U256>,
    },
}

impl<W: WalletProvider> SessionState<W> {
    fn wallet(&self) -> Option<&W> {
        match self {
            Self::Unprobed | Self::NoProvider => None,
            Self::Disconnected { wallet } | Self::Connected { wallet, .. } => Some(wallet),
        }
    }
}

/// A single user's session with the ATM.
///
/// All operations take `&mut self`, so at most one of them is in flight at a time.
#[derive(Debug)]
pub struct Session<E: Environment> {
    env: E,
    contract_address: Address,
    amount: U256,
    units: BalanceUnits,
    state: SessionState<E::Wallet>,
}

impl<E: Environment> Session<E> {
    /// Creates an unprobed session for the contract deployed at `contract_address`.
    pub fn new(env: E, contract_address: Address) -> Self {
        Self {
            env,
            contract_address,
            amount: U256::from(1),
            units: BalanceUnits::RAW,
            state: SessionState::Unprobed,
        }
    }

    /// Sets the amount moved by the deposit and withdraw buttons.
    pub fn with_amount(mut self, amount: U256) -> Self {
        self.amount = amount;
        self
    }

    /// Sets how balances are displayed.
    pub fn with_units(mut self, units: BalanceUnits) -> Self {
        self.units = units;
        self
    }

    pub fn state(&self) -> &SessionState<E::Wallet> {
        &self.state
    }

    /// The connected account, if any.
    pub fn account(&self) -> Option<Address> {
        match &self.state {
            SessionState::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }

    /// The contract handle, present only once an account is connected.
    pub fn contract(&self) -> Option<&<E::Wallet as WalletProvider>::Contract> {
        match &self.state {
            SessionState::Connected { contract, .. } => Some(contract),
            _ => None,
        }
    }

    /// The cached balance.
    pub fn balance(&self) -> Option<U256> {
        match &self.state {
            SessionState::Connected { balance, .. } => *balance,
            _ => None,
        }
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// How balances and amounts are displayed.
    pub fn units(&self) -> BalanceUnits {
        self.units
    }

    /// Looks for a wallet provider, or re-syncs with the one already found.
    ///
    /// The first successful probe only records the wallet. Later probes re-query the already
    /// authorized accounts and follow the wallet's first account: a new account rebinds the
    /// contract, no account at all disconnects.
    pub async fn probe(&mut self) -> Result<(), BridgeError> {
        let Some(wallet) = self.state.wallet().cloned() else {
            self.state = match self.env.detect_wallet().await {
                Some(wallet) => SessionState::Disconnected { wallet },
                None => {
                    debug!("no wallet provider found");
                    SessionState::NoProvider
                }
            };
            return Ok(());
        };

        let accounts = wallet.accounts().await?;
        match accounts.first() {
            Some(&account) => self.adopt(wallet, account),
            None => {
                debug!("No account found");
                if self.account().is_some() {
                    info!("wallet no longer exposes the connected account");
                    self.state = SessionState::Disconnected { wallet };
                }
            }
        }
        self.ensure_balance().await
    }

    /// Requests account access from the wallet and binds the contract to the first account.
    pub async fn connect(&mut self) -> Result<(), BridgeError> {
        let Some(wallet) = self.state.wallet().cloned() else {
            return Err(BridgeError::WalletRequired);
        };
        let accounts = wallet.request_accounts().await?;
        let Some(&account) = accounts.first() else {
            debug!("No account found");
            return Err(BridgeError::NoAccounts);
        };
        self.adopt(wallet, account);
        self.ensure_balance().await
    }

    /// Reads the balance from the contract, if one is bound, and caches it.
    pub async fn read_balance(&mut self) -> Result<Option<U256>, BridgeError> {
        let SessionState::Connected { contract, balance, .. } = &mut self.state else {
            trace!("no contract bound, skipping balance read");
            return Ok(None);
        };
        let value = contract.get_balance().await?;
        debug!(%value, "balance read");
        *balance = Some(value);
        Ok(Some(value))
    }

    /// Reads the balance if connected and none is cached yet.
    pub async fn ensure_balance(&mut self) -> Result<(), BridgeError> {
        if matches!(self.state, SessionState::Connected { balance: None, .. }) {
            self.read_balance().await?;
        }
        Ok(())
    }

    /// Deposits `amount`, waits for confirmation, then refreshes the balance.
    ///
    /// Returns `None` without doing anything if no contract is bound.
    pub async fn deposit(&mut self, amount: U256) -> Result<Option<Confirmation>, BridgeError> {
        let Some(contract) = self.contract() else {
            trace!("no contract bound, skipping deposit");
            return Ok(None);
        };
        let confirmation = contract.deposit(amount).await?;
        info!(tx_hash = %confirmation.tx_hash, %amount, "deposit confirmed");
        self.read_balance().await?;
        Ok(Some(confirmation))
    }

    /// Withdraws `amount`, waits for confirmation, then refreshes the balance.
    ///
    /// Returns `None` without doing anything if no contract is bound.
    pub async fn withdraw(&mut self, amount: U256) -> Result<Option<Confirmation>, BridgeError> {
        let Some(contract) = self.contract() else {
            trace!("no contract bound, skipping withdrawal");
            return Ok(None);
        };
        let confirmation = contract.withdraw(amount).await?;
        info!(tx_hash = %confirmation.tx_hash, %amount, "withdrawal confirmed");
        self.read_balance().await?;
        Ok(Some(confirmation))
    }

    /// Runs the operation behind a button.
    pub async fn trigger(&mut self, action: Action) -> Result<Option<Confirmation>, BridgeError> {
        match action {
            Action::Connect => self.connect().await.map(|()| None),
            Action::Deposit => self.deposit(self.amount).await,
            Action::Withdraw => self.withdraw(self.amount).await,
            Action::History => {
                debug!("transaction history is not available");
                Ok(None)
            }
        }
    }

    /// Renders the current state.
    pub fn render(&self) -> View {
        match &self.state {
            SessionState::Unprobed | SessionState::NoProvider => View::InstallWallet,
            SessionState::Disconnected { .. } => View::ConnectWallet,
            SessionState::Connected { account, balance, .. } => View::Account(AccountPanel {
                account: *account,
                balance: *balance,
                amount: self.amount,
                units: self.units,
            }),
        }
    }

    /// Switches to `account`, rebinding the contract unless it is already the connected one.
    fn adopt(&mut self, wallet: E::Wallet, account: Address) {
        if self.account() == Some(account) {
            return;
        }
        info!(%account, "Account connected");
        let contract = wallet.contract(self.contract_address, account);
        self.state = SessionState::Connected { wallet, account, contract, balance: None };
    }
}
