//! Error reports for the `atm` binary.
//!
//! Alerts raised by a button (no wallet, no account, insufficient balance) are reported as the
//! single line the page would have shown. Everything else gets its cause chain, one cause per line.

use atm_bridge::BridgeError;
use eyre::EyreHandler;
use itertools::Itertools;
use std::{error::Error, fmt};

/// Env var switching to the verbose `color-eyre` report.
const DEBUG_ENV: &str = "ATM_DEBUG";

pub struct Handler {
    /// The `color-eyre` handler, set when [`DEBUG_ENV`] is.
    verbose: Option<Box<dyn EyreHandler>>,
}

impl Handler {
    pub fn new(verbose: Option<Box<dyn EyreHandler>>) -> Self {
        Self { verbose }
    }

    fn report(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alert) = alert(error) {
            return write!(f, "{alert}");
        }

        let causes = dedup_chain(error);
        let mut causes = causes.iter();
        if let Some(head) = causes.next() {
            write!(f, "{head}")?;
        }
        for cause in causes {
            write!(f, "\n  caused by: {cause}")?;
        }
        Ok(())
    }
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Display;
        dedup_chain(error).into_iter().format("; ").fmt(f)
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verbose {
            Some(verbose) => verbose.debug(error, f),
            None if f.alternate() => fmt::Debug::fmt(error, f),
            None => self.report(error, f),
        }
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(verbose) = &mut self.verbose {
            verbose.track_caller(location);
        }
    }
}

/// The first alert-class [`BridgeError`] in the chain of `error`.
fn alert<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a BridgeError> {
    eyre::Chain::new(error)
        .filter_map(|cause| cause.downcast_ref::<BridgeError>())
        .find(|err| err.is_alert())
}

/// Messages of `error` and its sources, dropping a message already contained in the one before
/// it (`msg1: msg2; msg2` becomes `msg1: msg2`).
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes: Vec<String> =
        eyre::Chain::new(error).map(|cause| cause.to_string().trim().to_string()).collect();
    causes.dedup_by(|b, a| a.contains(b.as_str()));
    causes
}

/// Installs the [`eyre`] and [`panic`](mod@std::panic) hooks.
pub fn install() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        unsafe {
            std::env::set_var("RUST_BACKTRACE", "1");
        }
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!("This is a bug. Run again with `{DEBUG_ENV}=1` and report it."))
        .into_hooks();
    panic_hook.install();
    let eyre_hook = eyre_hook.into_eyre_hook();
    let verbose = std::env::var_os(DEBUG_ENV).is_some();
    if let Err(e) =
        eyre::set_hook(Box::new(move |e| Box::new(Handler::new(verbose.then(|| eyre_hook(e))))))
    {
        debug!("failed to install eyre error hook: {e}");
    }
}
