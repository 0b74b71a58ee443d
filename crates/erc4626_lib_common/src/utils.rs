use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use web3::types::U256;

/// Decimals used by both the vault shares and the underlying asset
pub const TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {}

#[derive(Debug, Clone, Copy)]
pub enum Decimals {
    Zero = 0,
    Nine = 9,
    Eighteen = 18,
}

/// Converts a decimal value (e.g. gas price in gwei from config) into base units.
/// Fails instead of truncating when the result would have a fractional part.
fn rust_dec_to_u256_strict(dec_amount: Decimal, num_decimals: u32) -> Result<U256, ConversionError> {
    if dec_amount.is_sign_negative() {
        return Err(ConversionError::from(format!(
            "Negative amount cannot be converted {dec_amount}"
        )));
    }
    let dec_base = Decimal::from(10_u64.pow(num_decimals));
    let dec_mul = dec_amount
        .checked_mul(dec_base)
        .ok_or_else(|| ConversionError::from("Overflow during conversion".to_string()))?
        .normalize();

    if dec_mul.fract() != Decimal::from(0) {
        return Err(ConversionError::from(format!(
            "Number cannot have a fractional part {dec_mul}"
        )));
    }
    let u128 = dec_mul.to_u128().ok_or_else(|| {
        ConversionError::from(format!("Number cannot be converted to u128 {dec_mul}"))
    })?;
    Ok(U256::from(u128))
}

pub trait DecimalConvExt {
    fn to_u256_from_gwei(&self) -> Result<U256, ConversionError>;
}

impl DecimalConvExt for Decimal {
    fn to_u256_from_gwei(&self) -> Result<U256, ConversionError> {
        rust_dec_to_u256_strict(*self, 9)
    }
}

pub trait U256ConvExt {
    fn to_eth_str(&self) -> String;
}

impl U256ConvExt for U256 {
    fn to_eth_str(&self) -> String {
        u256_to_decimal_string(*self, Decimals::Eighteen, None)
    }
}

/// Whole tokens scaled to base units, e.g. the approval ceiling
pub fn whole_tokens_to_base_units(tokens: u64) -> U256 {
    U256::from(tokens) * U256::exp10(TOKEN_DECIMALS as usize)
}

/// precision cannot be greater than decimals (it is capped automatically)
pub fn u256_to_decimal_string(
    amount: U256,
    decimals: Decimals,
    precision: Option<usize>,
) -> String {
    let decimals = decimals as usize;
    let digits = amount.to_string();
    let (int_part, frac_part) = if digits.len() > decimals {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        (int_part.to_string(), frac_part.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let mut frac_part = match precision.map(|p| std::cmp::min(p, decimals)) {
        Some(precision) => frac_part[..precision].to_string(),
        None => frac_part.trim_end_matches('0').to_string(),
    };
    if decimals == 0 {
        frac_part.clear();
    }

    if frac_part.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_part}")
    }
}
