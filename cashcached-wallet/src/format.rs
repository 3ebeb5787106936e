//! Amount formatting.

use exchange_rates::CurrencyCode;

/// Formats `amount` with exactly `fraction_digits` decimals and `,`
/// thousands separators. No symbol. Non-finite input formats as zero.
pub fn format_tokens(amount: f64, fraction_digits: usize) -> String {
    let (negative, body) = split_sign(amount, fraction_digits);
    if negative { format!("-{}", body) } else { body }
}

/// Formats `amount` with the currency's symbol and fraction digits,
/// e.g. `$1,234.50` or `-KD 0.250`.
pub fn format_money(amount: f64, currency: &CurrencyCode) -> String {
    let (negative, body) = split_sign(amount, currency.fraction_digits());
    let sign = if negative { "-" } else { "" };
    format!("{}{}{}", sign, currency.symbol(), body)
}

/// Returns the sign and the grouped absolute value. Values that round to
/// zero are never negative.
fn split_sign(amount: f64, fraction_digits: usize) -> (bool, String) {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", fraction_digits, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut body = group_thousands(int_part);
    if let Some(frac_part) = frac_part {
        body.push('.');
        body.push_str(frac_part);
    }

    let nonzero = fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    (amount < 0.0 && nonzero, body)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(0.0, 2), "0.00");
        assert_eq!(format_tokens(1234.5, 2), "1,234.50");
        assert_eq!(format_tokens(1234567.891, 0), "1,234,568");
        assert_eq!(format_tokens(999.999, 2), "1,000.00");
        assert_eq!(format_tokens(12.3456, 3), "12.346");
        assert_eq!(format_tokens(-1500.0, 1), "-1,500.0");
    }

    #[test]
    fn test_format_tokens_guards_non_finite() {
        assert_eq!(format_tokens(f64::NAN, 2), "0.00");
        assert_eq!(format_tokens(f64::INFINITY, 2), "0.00");
    }

    #[test]
    fn test_no_negative_zero() {
        assert_eq!(format_tokens(-0.001, 2), "0.00");
        assert_eq!(format_money(-0.0001, &CurrencyCode::USD), "$0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(322.580645, &CurrencyCode::USD), "$322.58");
        assert_eq!(format_money(1500.25, &CurrencyCode::KWD), "KD 1,500.250");
        assert_eq!(format_money(-5.0, &CurrencyCode::EUR), "-€5.00");
    }

    #[test]
    fn test_format_money_unknown_currency() {
        let btc: CurrencyCode = "BTC".parse().unwrap();
        assert_eq!(format_money(2.5, &btc), "BTC2.50");
    }
}
