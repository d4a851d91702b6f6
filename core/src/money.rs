//! Amounts are whole pence held in an `i64`.

use crate::error::{LedgerError, Result};

pub const DEFAULT_CURRENCY: &str = "£";

/// Parses user text such as `20`, `12.5` or `12.50` into pence.
///
/// Signs, separators and more than two decimals are rejected.
pub fn parse_amount(field: &'static str, text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LedgerError::EmptyField(field));
    }

    let invalid = || LedgerError::InvalidAmount {
        field,
        value: text.to_string(),
    };

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|p| p.checked_add(cents))
        .ok_or_else(invalid)
}

pub fn format_amount(amount: i64) -> String {
    let whole = amount / 100;
    let cents = (amount % 100).abs();
    if amount < 0 {
        format!("-{}.{:02}", whole.abs(), cents)
    } else {
        format!("{}.{:02}", whole, cents)
    }
}

/// Same as [`format_amount`] for the magnitude, prefixed with the currency symbol.
pub fn format_money(amount: i64, currency: &str) -> String {
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", currency, abs / 100, abs % 100)
}

/// The sentence shown next to a friend for their balance.
pub fn describe_balance(name: &str, balance: i64, currency: &str) -> String {
    if balance < 0 {
        format!("You owe {} {}", name, format_money(balance, currency))
    } else if balance > 0 {
        format!("{} owes you {}", name, format_money(balance, currency))
    } else {
        format!("You and {} are even", name)
    }
}
