//! Currency amounts are integer minor units (cents). User-entered strings
//! are parsed once at the command boundary and formatted once on output.

use crate::ledger::error::{LedgerError, Result};

/// Parse a non-negative decimal amount ("12", "12.5", "12.50") into cents.
/// Rejects empty, non-numeric, negative, and more-than-two-decimal input.
pub fn parse_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
        return Err(LedgerError::InvalidAmount);
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(LedgerError::InvalidAmount);
    }
    if frac.len() > 2 {
        return Err(LedgerError::InvalidAmount);
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| LedgerError::InvalidAmount)?
    };

    let frac_value: i64 = if frac.is_empty() {
        0
    } else {
        let parsed: i64 = frac.parse().map_err(|_| LedgerError::InvalidAmount)?;
        // "5" means fifty cents, "05" means five.
        if frac.len() == 1 { parsed * 10 } else { parsed }
    };

    whole_value
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(frac_value))
        .ok_or(LedgerError::InvalidAmount)
}

/// Parse a payment amount: same grammar as [`parse_amount`], but zero is
/// rejected since a payment must be strictly positive.
pub fn parse_payment(input: &str) -> Result<i64> {
    let cents = parse_amount(input)?;
    if cents == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(cents)
}

/// Parse a positive whole quantity.
pub fn parse_quantity(input: &str) -> Result<i64> {
    let quantity: i64 = input.trim().parse().map_err(|_| LedgerError::InvalidQuantity)?;
    if quantity <= 0 {
        return Err(LedgerError::InvalidQuantity);
    }
    Ok(quantity)
}

/// Format cents as a decimal string with exactly two fraction digits.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(parse_amount("12").unwrap(), 1200);
        assert_eq!(parse_amount("12.5").unwrap(), 1250);
        assert_eq!(parse_amount("12.50").unwrap(), 1250);
        assert_eq!(parse_amount("0.05").unwrap(), 5);
        assert_eq!(parse_amount(" 7.25 ").unwrap(), 725);
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(parse_amount(".50").unwrap(), 50);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for input in ["", "  ", "abc", "12.345", "-1", "-0.01", "+5", "1.2.3", "12,50", "."] {
            assert!(parse_amount(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn payment_rejects_zero() {
        assert!(matches!(parse_payment("0"), Err(LedgerError::InvalidAmount)));
        assert!(matches!(parse_payment("0.00"), Err(LedgerError::InvalidAmount)));
        assert_eq!(parse_payment("0.01").unwrap(), 1);
    }

    #[test]
    fn quantity_must_be_positive_integer() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        for input in ["0", "-2", "1.5", "", "many"] {
            assert!(parse_quantity(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn formats_cents_with_two_decimals() {
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-325), "-3.25");
    }

    #[test]
    fn format_round_trips_parse() {
        for input in ["12.50", "0.05", "999.99", "0.00"] {
            let cents = parse_amount(input).unwrap();
            assert_eq!(format_cents(cents), input);
        }
    }
}
