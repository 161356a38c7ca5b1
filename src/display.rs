//! Formatting helpers for rendering a payment widget.

use rust_decimal::{Decimal, RoundingStrategy};

/// Countdown as `m:ss` (300 -> "5:00", 65 -> "1:05").
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Amount with currency code, two decimals and thousands separators
/// (1234.5 GHS -> "GHS 1,234.50").
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{currency} {sign}{}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn countdown_formats_minutes_and_padded_seconds() {
        assert_eq!(format_countdown(300), "5:00");
        assert_eq!(format_countdown(65), "1:05");
        assert_eq!(format_countdown(59), "0:59");
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(3600), "60:00");
    }

    #[test]
    fn amount_has_two_decimals() {
        assert_eq!(format_amount(dec!(150), "GHS"), "GHS 150.00");
        assert_eq!(format_amount(dec!(150.5), "GHS"), "GHS 150.50");
        assert_eq!(format_amount(dec!(0.005), "GHS"), "GHS 0.01");
    }

    #[test]
    fn amount_groups_thousands() {
        assert_eq!(format_amount(dec!(1234.5), "GHS"), "GHS 1,234.50");
        assert_eq!(format_amount(dec!(1234567.891), "NGN"), "NGN 1,234,567.89");
        assert_eq!(format_amount(dec!(999), "GHS"), "GHS 999.00");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(format_amount(dec!(-1000), "GHS"), "GHS -1,000.00");
        assert_eq!(format_amount(dec!(-0.001), "GHS"), "GHS 0.00");
    }
}
