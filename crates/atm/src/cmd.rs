use crate::{
    args::AtmSubcommand,
    ui,
    utils::{format_confirmation, print_page},
};
use alloy_primitives::U256;
use atm_bridge::{BalanceUnits, RpcEnvironment, Session, verify_interface};
use atm_config::Config;
use eyre::{Result, WrapErr};

/// Loads and checks the contract interface, then probes for the wallet.
pub async fn open_session(config: &Config) -> Result<Session<RpcEnvironment>> {
    let descriptor =
        config.contract_descriptor().wrap_err("failed to load the ATM contract interface")?;
    verify_interface(&descriptor.abi)?;
    debug!(contract = %descriptor.name, address = %descriptor.address, "contract interface verified");

    let env = RpcEnvironment::new(config)?;
    let mut session = Session::new(env, descriptor.address)
        .with_amount(U256::from(config.amount))
        .with_units(BalanceUnits::from(config.balance_decimals));
    session.probe().await?;
    Ok(session)
}

pub async fn run(cmd: AtmSubcommand, config: Config) -> Result<()> {
    let mut session = open_session(&config).await?;
    let units = session.units();

    match cmd {
        AtmSubcommand::Ui => return ui::run(session).await,
        AtmSubcommand::Status => {
            // picks up accounts the wallet already authorized
            session.probe().await?;
        }
        AtmSubcommand::Connect => session.connect().await?,
        AtmSubcommand::Balance => {
            session.connect().await?;
            let Some(balance) = session.balance() else {
                eyre::bail!("no balance available for the connected account");
            };
            println!("{}", units.format(balance));
            return Ok(());
        }
        AtmSubcommand::Deposit { amount } => {
            session.connect().await?;
            let amount = amount.unwrap_or_else(|| session.amount());
            if let Some(tx) = session.deposit(amount).await? {
                println!("{}", format_confirmation("Deposit", amount, units, &tx));
            }
        }
        AtmSubcommand::Withdraw { amount } => {
            session.connect().await?;
            let amount = amount.unwrap_or_else(|| session.amount());
            if let Some(tx) = session.withdraw(amount).await? {
                println!("{}", format_confirmation("Withdrawal", amount, units, &tx));
            }
        }
    }

    print_page(&session.render());
    Ok(())
}
