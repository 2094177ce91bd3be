//! Amount input handling
//!
//! Decimal-string amounts typed by a user are kept as strings until
//! submission time, then converted to integer token units with the token's
//! decimal count. Strings that fail the input pattern never reach
//! conversion.

use alloy::primitives::U256;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::Error;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d*\.?\d*$").expect("amount pattern compiles"))
}

/// Whether a (possibly partial) typed value is acceptable in an amount field.
///
/// Accepts intermediate states like `""`, `"1."` and `".5"` so typing is not
/// interrupted; those still fail [`parse_units`] until complete.
pub fn is_valid_input(value: &str) -> bool {
    amount_pattern().is_match(value)
}

/// Replace an amount field with new input, rejecting malformed values.
///
/// On rejection the field is left unchanged and no error is surfaced beyond
/// the return value.
pub fn apply_input(field: &mut String, value: &str) -> Result<(), Error> {
    if !is_valid_input(value) {
        return Err(Error::InputFormat(value.to_string()));
    }
    field.clear();
    field.push_str(value);
    Ok(())
}

/// Convert a decimal amount string to integer token units.
///
/// Fractional digits beyond `decimals` are truncated, keeping the result
/// within one unit of the typed value.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, Error> {
    if !is_valid_input(value) {
        return Err(Error::InputFormat(value.to_string()));
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::InputFormat(value.to_string()));
    }

    let scale = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| Error::InputFormat(value.to_string()))?;

    let int_units = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| Error::InputFormat(value.to_string()))?
    };

    let mut frac = frac_part.to_string();
    frac.truncate(decimals as usize);
    let frac_units = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        U256::from_str_radix(&padded, 10).map_err(|_| Error::InputFormat(value.to_string()))?
    };

    int_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(|| Error::InputFormat(value.to_string()))
}

/// Format integer token units as a decimal string, trimming trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let Some(scale) = U256::from(10u64).checked_pow(U256::from(decimals)) else {
        return value.to_string();
    };
    let int = value / scale;
    let frac = value % scale;
    if frac.is_zero() {
        return int.to_string();
    }
    let frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", int, frac_str.trim_end_matches('0'))
}
