//! Money helpers over `BigDecimal`: rounding, percentages and display formatting
//!
//! All arithmetic runs in full `BigDecimal` precision. Rounding happens only
//! when a terminal value is produced (payable amount, display strings).

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits shown for a currency amount
pub const DISPLAY_SCALE: i64 = 2;

/// Round half away from zero to the given number of fractional digits
pub fn round_money(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfUp)
}

/// `amount × percent / 100`, unrounded
pub fn percent_of(amount: &BigDecimal, percent: &BigDecimal) -> BigDecimal {
    (amount * percent) / BigDecimal::from(100)
}

/// Percentage change from `previous` to `current` at working precision.
///
/// A zero or negative baseline yields zero rather than an unbounded value.
/// Thresholds compare against this exact value; round only for display.
pub fn growth_percent(current: &BigDecimal, previous: &BigDecimal) -> BigDecimal {
    if *previous <= BigDecimal::from(0) {
        return BigDecimal::from(0);
    }
    ((current - previous) * BigDecimal::from(100)) / previous
}

/// `total / count` rounded to display precision, zero when `count` is zero
pub fn average(total: &BigDecimal, count: u64) -> BigDecimal {
    if count == 0 {
        return BigDecimal::from(0);
    }
    round_money(&(total / BigDecimal::from(count)), DISPLAY_SCALE)
}

/// Plain two-digit rendering, e.g. `2237.76`
pub fn to_display(value: &BigDecimal) -> String {
    let (negative, whole, fraction) = split_minor_units(value);
    format!("{}{}.{}", if negative { "-" } else { "" }, whole, fraction)
}

/// Display locale for currency amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// Indian rupee with lakh/crore grouping: `₹12,34,567.89`
    #[default]
    #[serde(rename = "en-IN")]
    EnIn,
    /// US dollar with thousands grouping: `$1,234,567.89`
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Locale::EnIn => "₹",
            Locale::EnUs => "$",
        }
    }

    /// Parse a locale tag, falling back to `en-IN` for anything unrecognised
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    fn group(&self, whole: &str) -> String {
        match self {
            Locale::EnIn => group_indian(whole),
            Locale::EnUs => group_thousands(whole),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en-in" | "hi-in" | "in" => Ok(Locale::EnIn),
            "en-us" | "us" => Ok(Locale::EnUs),
            other => Err(format!("Unsupported locale '{}'", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EnIn => f.write_str("en-IN"),
            Locale::EnUs => f.write_str("en-US"),
        }
    }
}

/// Render an amount with currency symbol and locale grouping.
///
/// Rounds half away from zero to two fractional digits; negative amounts are
/// prefixed with `-` ahead of the symbol.
pub fn format_money(amount: &BigDecimal, locale: Locale) -> String {
    let (negative, whole, fraction) = split_minor_units(amount);
    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        locale.currency_symbol(),
        locale.group(&whole),
        fraction
    )
}

/// Split a value into (is_negative, whole digits, two fraction digits)
fn split_minor_units(value: &BigDecimal) -> (bool, String, String) {
    let (minor_units, _) = round_money(value, DISPLAY_SCALE).as_bigint_and_exponent();
    let digits = minor_units.to_string();
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, digits),
    };
    let padded = format!("{:0>3}", digits);
    let (whole, fraction) = padded.split_at(padded.len() - 2);
    (negative, whole.to_string(), fraction.to_string())
}

fn group_thousands(whole: &str) -> String {
    let digits: Vec<char> = whole.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_string();
    }
    let (head, tail) = whole.split_at(whole.len() - 3);
    let head: Vec<char> = head.chars().collect();
    let mut out = String::with_capacity(whole.len() + whole.len() / 2);
    for (i, c) in head.iter().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(&dec("2237.5"), 0), dec("2238"));
        assert_eq!(round_money(&dec("-2237.5"), 0), dec("-2238"));
        assert_eq!(round_money(&dec("10725.49"), 0), dec("10725"));
        assert_eq!(round_money(&dec("1.005"), 2), dec("1.01"));
    }

    #[test]
    fn test_growth_percent() {
        assert_eq!(growth_percent(&dec("150"), &dec("100")), dec("50"));
        assert_eq!(growth_percent(&dec("50"), &dec("100")), dec("-50"));
        assert_eq!(growth_percent(&dec("150"), &dec("0")), dec("0"));
        assert_eq!(growth_percent(&dec("120004"), &dec("100000")), dec("20.004"));
        assert_eq!(
            round_money(&growth_percent(&dec("200"), &dec("300")), DISPLAY_SCALE),
            dec("-33.33")
        );
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average(&dec("0"), 0), dec("0"));
        assert_eq!(average(&dec("100"), 3), dec("33.33"));
    }

    #[test]
    fn test_format_money_indian_grouping() {
        assert_eq!(format_money(&dec("1234567.891"), Locale::EnIn), "₹12,34,567.89");
        assert_eq!(format_money(&dec("999"), Locale::EnIn), "₹999.00");
        assert_eq!(format_money(&dec("0.005"), Locale::EnIn), "₹0.01");
        assert_eq!(format_money(&dec("100000"), Locale::EnIn), "₹1,00,000.00");
    }

    #[test]
    fn test_format_money_us_grouping() {
        assert_eq!(format_money(&dec("1234567.891"), Locale::EnUs), "$1,234,567.89");
        assert_eq!(format_money(&dec("-1234.5"), Locale::EnUs), "-$1,234.50");
        assert_eq!(format_money(&dec("0"), Locale::EnUs), "$0.00");
    }

    #[test]
    fn test_locale_fallback() {
        assert_eq!(Locale::from_tag("en_US"), Locale::EnUs);
        assert_eq!(Locale::from_tag("fr-FR"), Locale::EnIn);
    }

    #[test]
    fn test_to_display() {
        assert_eq!(to_display(&dec("239.76")), "239.76");
        assert_eq!(to_display(&dec("0.24")), "0.24");
        assert_eq!(to_display(&dec("-0.4")), "-0.40");
    }
}
