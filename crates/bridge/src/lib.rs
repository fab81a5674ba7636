//! # atm-bridge
//!
//! Session between a user, their wallet and the deployed ATM contract: detects the wallet,
//! connects an account, reads the balance and submits deposits and withdrawals. Rendering is a
//! pure function of the session state.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

mod contract;
pub use contract::{Assessment, AtmContract, Confirmation, verify_interface};

mod error;
pub use error::BridgeError;

mod rpc;
pub use rpc::{RpcAtmContract, RpcEnvironment, RpcWallet};

mod session;
pub use session::{Session, SessionState};

pub mod view;
pub use view::{AccountPanel, Action, BalanceUnits, Page, View};

mod wallet;
pub use wallet::{Environment, WalletProvider};
