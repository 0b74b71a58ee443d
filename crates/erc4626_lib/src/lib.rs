pub mod actions;
pub mod allowance;
pub mod amount;
pub mod balances;
pub mod client;
pub mod config;
pub mod contracts;
pub mod control;
pub mod eth;
pub mod sequencer;
pub mod signer;

pub use erc4626_lib_common::error;
pub use erc4626_lib_common::utils;
pub use erc4626_lib_common::{err_create, err_custom_create, err_from, err_from_msg};
