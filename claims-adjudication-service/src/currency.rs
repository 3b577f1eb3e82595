//! Rupee formatting and parsing helpers shared by the wire format, the
//! damage estimator and the remote-result adapter.

/// Render a whole amount with thousands separators, e.g. `1234567` -> `1,234,567`
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 { format!("-{out}") } else { out }
}

/// Render an amount as `₹` plus grouped digits, keeping paise only when present
pub fn format_amount(amount: f64) -> String {
    let mut whole = amount.trunc() as i64;
    let mut paise = (amount.fract().abs() * 100.0).round() as i64;
    if paise == 100 {
        whole += if amount < 0.0 { -1 } else { 1 };
        paise = 0;
    }
    if paise == 0 {
        format!("₹{}", group_digits(whole))
    } else {
        format!("₹{}.{:02}", group_digits(whole), paise)
    }
}

/// Parse an amount string by keeping only its digits, defaulting to 0
///
/// Accepts whatever formatting the scoring service emits (`₹45,000`,
/// `45000`, `Rs. 45000`).
pub fn parse_amount(raw: &str) -> f64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().map(|n| n as f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(45_000), "45,000");
        assert_eq!(group_digits(1_234_567), "1,234,567");
        assert_eq!(group_digits(-5_500), "-5,500");
    }

    #[test]
    fn formats_whole_amounts_without_paise() {
        assert_eq!(format_amount(45_000.0), "₹45,000");
        assert_eq!(format_amount(0.0), "₹0");
        assert_eq!(format_amount(600_000.0), "₹600,000");
    }

    #[test]
    fn formats_fractional_amounts_with_paise() {
        assert_eq!(format_amount(12_345.67), "₹12,345.67");
        assert_eq!(format_amount(99.5), "₹99.50");
    }

    #[test]
    fn carries_rounded_paise_into_the_whole_part() {
        assert_eq!(format_amount(41.999), "₹42");
    }

    #[test]
    fn parses_formatted_amounts() {
        assert_eq!(parse_amount("₹45,000"), 45_000.0);
        assert_eq!(parse_amount("45000"), 45_000.0);
        assert_eq!(parse_amount("Rs. 12,500"), 12_500.0);
    }

    #[test]
    fn parse_defaults_to_zero_without_digits() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }
}
