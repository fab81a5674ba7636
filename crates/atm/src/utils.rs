use alloy_primitives::U256;
use atm_bridge::{BalanceUnits, Confirmation, Page, View};
use yansi::Paint;

/// Initializes a tracing Subscriber for logging
pub fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Enables colored output when writing to a color-capable terminal.
pub fn enable_paint() {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
}

/// Prints the whole page for `view`.
pub fn print_page(view: &View) {
    print!("{}", Page(view));
}

/// Prints an alert raised by a button.
pub fn print_alert(alert: &dyn std::fmt::Display) {
    eprintln!("{} {alert}", "Alert:".red().bold());
}

/// One-line summary of a confirmed transaction.
pub fn format_confirmation(
    action: &str,
    amount: U256,
    units: BalanceUnits,
    tx: &Confirmation,
) -> String {
    let block = tx.block_number.map(|n| format!(" in block {n}")).unwrap_or_default();
    format!(
        "{action} of {} ETH confirmed{block} (tx {}, gas used {})",
        units.format(amount),
        tx.tx_hash,
        tx.gas_used
    )
}
