use std::str::FromStr;
use web3::types::{Address, U256};

pub fn test_actor() -> Address {
    Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
}

pub fn test_vault() -> Address {
    Address::from_str("0xe7f1725e7734ce288f8367e1bb143e90bb3f0512").unwrap()
}

pub fn test_asset() -> Address {
    Address::from_str("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap()
}

/// Whole tokens in base units
pub fn eth(tokens: u64) -> U256 {
    U256::from(tokens) * U256::exp10(18)
}
