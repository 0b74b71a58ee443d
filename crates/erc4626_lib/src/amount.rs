use crate::err_create;
use crate::error::{FlowError, VaultError};
use erc4626_lib_common::utils::TOKEN_DECIMALS;
use lazy_static::lazy_static;
use regex::Regex;
use web3::types::U256;

lazy_static! {
    // ascii digits only, \d would also accept other unicode digits
    static ref AMOUNT_INPUT_REGEX: Regex = Regex::new(r"^[0-9]*\.?[0-9]*$").unwrap();
}

/// Returns the text if it is an acceptable input state (`""`, `"."`, `"12."`, `".5"`...)
pub fn validate(raw: &str) -> Option<&str> {
    if AMOUNT_INPUT_REGEX.is_match(raw) {
        Some(raw)
    } else {
        None
    }
}

/// Scales a validated decimal string by 10^18.
///
/// Fractional digits past the 18th are rounded half up. Fails with `InvalidAmount` when
/// the string holds no digit and with `Overflow` when the result exceeds 256 bits.
pub fn to_base_units(valid: &str) -> Result<U256, VaultError> {
    if validate(valid).is_none() || !valid.chars().any(|c| c.is_ascii_digit()) {
        return Err(err_create!(FlowError::InvalidAmount(valid.to_string())));
    }
    let decimals = TOKEN_DECIMALS as usize;
    let (int_part, frac_part) = valid.split_once('.').unwrap_or((valid, ""));
    let (kept, dropped) = if frac_part.len() > decimals {
        frac_part.split_at(decimals)
    } else {
        (frac_part, "")
    };
    let digits = format!("{int_part}{kept:0<decimals$}");
    let digits = digits.trim_start_matches('0');
    let overflow = || err_create!(FlowError::Overflow(valid.to_string()));

    let value = if digits.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(digits).map_err(|_| overflow())?
    };
    if dropped.starts_with(['5', '6', '7', '8', '9']) {
        value.checked_add(U256::one()).ok_or_else(overflow)
    } else {
        Ok(value)
    }
}

/// Free text amount as typed by the user.
///
/// Only text accepted by [`validate`] is ever committed; anything else is dropped and the
/// previous value stays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountInput {
    value: String,
}

impl AmountInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns true when the text was committed
    pub fn on_change(&mut self, raw: &str) -> bool {
        match validate(raw) {
            Some(valid) => {
                self.value = valid.to_string();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Clears the text submitted as `submitted`; text typed since then is kept
    pub fn clear_if_unchanged(&mut self, submitted: &str) -> bool {
        if self.value == submitted {
            self.value.clear();
            true
        } else {
            false
        }
    }

    /// None when nothing is typed, the amount would not be submitted anyway
    pub fn base_units(&self) -> Option<Result<U256, VaultError>> {
        if self.value.is_empty() {
            None
        } else {
            Some(to_base_units(&self.value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn test_validate_input_states() {
        for accepted in ["", ".", "12", "12.", ".5", "12.5", "007"] {
            assert_eq!(validate(accepted), Some(accepted), "{accepted}");
        }
        for rejected in ["-1", "1.2.3", "1e5", "abc", " 1", "1,5", "١٢"] {
            assert_eq!(validate(rejected), None, "{rejected}");
        }
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(
            to_base_units("1.5").unwrap(),
            U256::from(1_500_000_000_000_000_000_u128)
        );
        assert_eq!(to_base_units("100").unwrap(), eth(100));
        assert_eq!(to_base_units("12.").unwrap(), eth(12));
        assert_eq!(to_base_units(".5").unwrap(), eth(1) / U256::from(2));
        assert_eq!(to_base_units("0").unwrap(), U256::zero());
        assert_eq!(to_base_units("0.000000000000000001").unwrap(), U256::one());
        // trailing fractional zero keeps the value, an integer zero multiplies it
        assert_eq!(to_base_units("1.50").unwrap(), to_base_units("1.5").unwrap());
        assert_eq!(to_base_units("10").unwrap(), to_base_units("1").unwrap() * U256::from(10));
    }

    #[test]
    fn test_to_base_units_rounding() {
        assert_eq!(to_base_units("0.0000000000000000014").unwrap(), U256::one());
        assert_eq!(to_base_units("0.0000000000000000015").unwrap(), U256::from(2));
        assert_eq!(to_base_units("0.0000000000000000009").unwrap(), U256::one());
    }

    #[test]
    fn test_to_base_units_invalid() {
        for invalid in ["", ".", "abc", "-1"] {
            let err = to_base_units(invalid).unwrap_err();
            assert_eq!(
                err.flow_error(),
                Some(&FlowError::InvalidAmount(invalid.to_string()))
            );
        }
    }

    #[test]
    fn test_to_base_units_overflow() {
        let max_tokens = "115792089237316195423570985008687907853269984665640564039457.584007913129639935";
        assert_eq!(to_base_units(max_tokens).unwrap(), U256::MAX);

        let too_big = "115792089237316195423570985008687907853269984665640564039458";
        let err = to_base_units(too_big).unwrap_err();
        assert!(matches!(err.flow_error(), Some(FlowError::Overflow(_))));

        let rounds_over = "115792089237316195423570985008687907853269984665640564039457.5840079131296399355";
        let err = to_base_units(rounds_over).unwrap_err();
        assert!(matches!(err.flow_error(), Some(FlowError::Overflow(_))));
    }

    #[test]
    fn test_amount_input_keeps_previous_value() {
        let mut input = AmountInput::new();
        assert!(input.base_units().is_none());
        assert!(input.on_change("12"));
        assert!(input.on_change("12."));
        assert!(!input.on_change("12.a"));
        assert_eq!(input.value(), "12.");
        assert_eq!(input.base_units().unwrap().unwrap(), eth(12));
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_clear_if_unchanged() {
        let mut input = AmountInput::new();
        input.on_change("5");
        assert!(!input.clear_if_unchanged("4"));
        assert_eq!(input.value(), "5");
        assert!(input.clear_if_unchanged("5"));
        assert!(input.is_empty());
    }
}
