//! Conversions between on-chain base units and what the user reads or types.
//!
//! Anything headed for the contract goes through [`parse_units`], which is
//! exact. Anything headed for the screen may round.

use chrono::{DateTime, Local, TimeZone};

use crate::error::{Result, StakingError};

/// Fraction digits shown for token amounts.
pub const DISPLAY_DECIMALS: u8 = 4;

const DAY: u64 = 24 * 60 * 60;
const HOUR: u64 = 60 * 60;
const MINUTE: u64 = 60;

fn pow10(exp: u8) -> Result<u128> {
    10u128.checked_pow(exp as u32).ok_or(StakingError::AmountOverflow)
}

/// Decimal string → base units, without loss.
pub fn parse_units(value: &str, decimals: u8) -> Result<u128> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StakingError::EmptyAmount);
    }
    if value.starts_with('-') {
        return Err(StakingError::NonPositiveAmount);
    }
    if !is_decimal(value) {
        return Err(StakingError::InvalidAmount);
    }

    let mut parts = value.split('.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");

    let scale = pow10(decimals)?;
    let whole_val: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| StakingError::AmountOverflow)?
    };
    let mut amount = whole_val
        .checked_mul(scale)
        .ok_or(StakingError::AmountOverflow)?;

    if !frac.is_empty() {
        if frac.len() > decimals as usize {
            return Err(StakingError::TooManyDecimals(decimals));
        }
        let frac_val: u128 = frac.parse().map_err(|_| StakingError::InvalidAmount)?;
        let frac_scale = pow10(decimals - frac.len() as u8)?;
        amount = amount
            .checked_add(frac_val * frac_scale)
            .ok_or(StakingError::AmountOverflow)?;
    }

    Ok(amount)
}

/// Base units → exact decimal string, trailing zeros dropped.
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let Ok(scale) = pow10(decimals) else {
        // 10^decimals exceeds u128, so the integer part is zero.
        return format!("0.{:0>width$}", amount, width = decimals as usize)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    };
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Rounded half-up to `max_fraction` digits, no grouping.
pub fn format_units_rounded(amount: u128, decimals: u8, max_fraction: u8) -> String {
    if max_fraction >= decimals {
        return format_units(amount, decimals);
    }
    let Ok(divisor) = pow10(decimals - max_fraction) else {
        return "0".to_string();
    };
    let mut quotient = amount / divisor;
    if (amount % divisor) >= divisor - divisor / 2 {
        quotient += 1;
    }
    format_units(quotient, max_fraction)
}

/// Truncated to `max_fraction` digits. Never exceeds `amount`.
pub fn format_units_floor(amount: u128, decimals: u8, max_fraction: u8) -> String {
    if max_fraction >= decimals {
        return format_units(amount, decimals);
    }
    let Ok(divisor) = pow10(decimals - max_fraction) else {
        return "0".to_string();
    };
    format_units(amount / divisor, max_fraction)
}

/// Amount for display: rounded to four digits, thousands grouped.
pub fn format_token_amount(amount: Option<u128>, token_decimals: u8) -> String {
    match amount {
        None | Some(0) => "0".to_string(),
        Some(amount) => {
            let plain = format_units_rounded(amount, token_decimals, DISPLAY_DECIMALS);
            let (whole, frac) = match plain.split_once('.') {
                Some((w, f)) => (w, Some(f)),
                None => (plain.as_str(), None),
            };
            let grouped = group_thousands(whole);
            match frac {
                Some(frac) => format!("{}.{}", grouped, frac),
                None => grouped,
            }
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Basis points → percentage with two decimals.
pub fn format_apr(basis_points: Option<u128>) -> String {
    match basis_points {
        None | Some(0) => "0%".to_string(),
        Some(bps) => format!("{:.2}%", bps as f64 / 100.0),
    }
}

pub fn format_time_remaining(seconds: Option<u64>) -> String {
    let seconds = match seconds {
        None | Some(0) => return "Unlocked".to_string(),
        Some(s) => s,
    };
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Unix seconds → `Jan 5, 2024, 03:04 PM` in the browser's time zone.
pub fn format_date(timestamp: Option<u64>) -> String {
    let ts = match timestamp {
        None | Some(0) => return "Never".to_string(),
        Some(ts) => ts,
    };
    match i64::try_from(ts).ok().and_then(|ts| Local.timestamp_opt(ts, 0).single()) {
        Some(dt) => format_datetime(&dt),
        None => "Never".to_string(),
    }
}

pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Digits with at most one `.`, at least one digit overall.
fn is_decimal(value: &str) -> bool {
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in value.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Text that is an amount, or could become one with more typing: digits
/// with at most one `.`, so `""`, `"."` and `"1."` all qualify.
pub fn is_partial_amount(value: &str) -> bool {
    value.is_empty() || value == "." || is_decimal(value)
}

/// A well-formed amount above zero.
pub fn is_valid_amount(value: &str) -> bool {
    let value = value.trim();
    is_decimal(value) && value.chars().any(|c| matches!(c, '1'..='9'))
}
