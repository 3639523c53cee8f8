//! Token amounts in raw units and human decimal form.
//!
//! A raw amount is an integer count of the token's smallest unit; the human
//! form is that integer scaled down by `10^decimals`. Comparisons always
//! happen on the raw integer.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashboardError, DashboardResult};

/// Decimals used by the chain's native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// A token quantity together with the scale it was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Smallest-unit integer value.
    pub raw: U256,
    /// Power-of-ten scale factor.
    pub decimals: u8,
}

impl TokenAmount {
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parse a human decimal string such as `"10.5"`.
    pub fn parse(input: &str, decimals: u8) -> DashboardResult<Self> {
        Ok(Self {
            raw: parse_units(input, decimals)?,
            decimals,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}

/// Convert a human decimal string into raw units.
///
/// Digits beyond `decimals` are rounded half-up into the last unit. Signs,
/// exponents and separators are rejected.
pub fn parse_units(input: &str, decimals: u8) -> DashboardResult<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::InvalidAmount("amount is empty".to_string()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(DashboardError::InvalidAmount(format!("'{}' is not a number", trimmed)));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(DashboardError::InvalidAmount(format!("'{}' is not a number", trimmed)));
    }

    let scale = decimals as usize;
    let (kept, dropped) = if frac_part.len() > scale {
        frac_part.split_at(scale)
    } else {
        (frac_part, "")
    };

    let mut raw = U256::ZERO;
    let ten = U256::from(10u8);
    let digits = int_part
        .bytes()
        .chain(kept.bytes())
        .chain(std::iter::repeat(b'0').take(scale - kept.len()));
    for digit in digits {
        raw = raw
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::from(digit - b'0')))
            .ok_or_else(|| DashboardError::InvalidAmount("amount is too large".to_string()))?;
    }

    if dropped.as_bytes().first().is_some_and(|b| *b >= b'5') {
        raw = raw
            .checked_add(U256::from(1u8))
            .ok_or_else(|| DashboardError::InvalidAmount("amount is too large".to_string()))?;
    }

    Ok(raw)
}

/// Check that `input` is a well-formed decimal with at least one non-zero digit.
///
/// Runs before the token's decimals are known, so it cannot catch amounts
/// that round to zero raw units.
pub fn check_positive_decimal(input: &str) -> DashboardResult<()> {
    // Zero decimals: only the syntax and overflow checks matter here.
    parse_units(input, 0)?;
    if input.trim().bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        Ok(())
    } else {
        Err(DashboardError::InvalidAmount(format!(
            "'{}' is not greater than 0",
            input.trim()
        )))
    }
}

/// Render raw units as a decimal string, trimming trailing zeros but always
/// keeping one fractional digit (`"100.0"`, `"0.25"`).
pub fn format_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let scale = decimals as usize;
    if scale == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac)
    }
}

/// Shorten an account identifier for display, e.g. `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
