use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// An amount of money in integer cents.
///
/// Expense amounts, budget ceilings and statistics all use it, so totals are
/// exact. The JSON documents store it as a plain decimal number (`12.34`).
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "12,34".parse().unwrap();
/// assert_eq!(amount, Money::new(1234));
/// assert_eq!(amount.to_string(), "12.34");
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// `None` when the sum does not fit in the cents range.
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Converts a decimal value into cents, rounding half away from zero.
    pub fn from_decimal(value: f64) -> Result<Self, EngineError> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
            return Err(EngineError::InvalidAmount(format!("{value} is out of range")));
        }
        Ok(Self(cents as i64))
    }

    #[must_use]
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

/// Form input: an optional sign, whole units, then at most two decimals after
/// `.` or `,`.
impl FromStr for Money {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {:?}", s.trim()));

        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text.strip_prefix('+').unwrap_or(text).trim_start()),
        };
        if digits.is_empty() {
            return Err(reject("empty amount"));
        }

        let (whole, fraction) = digits.split_once(['.', ',']).unwrap_or((digits, ""));
        let numeric = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !numeric(whole) || !numeric(fraction) {
            return Err(reject("not a decimal amount"));
        }
        if fraction.len() > 2 {
            return Err(reject("more than two decimals"));
        }

        let fraction_cents = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(2)
            .fold(0, |acc, digit| acc * 10 + i64::from(digit - b'0'));

        let cents = whole
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|cents| cents.checked_add(fraction_cents))
            .ok_or_else(|| reject("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
        assert_eq!("7.".parse::<Money>().unwrap().cents(), 700);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("0.001".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
    }

    #[test]
    fn json_uses_decimal_numbers() {
        assert_eq!(serde_json::to_string(&Money::new(1234)).unwrap(), "12.34");
        assert_eq!(serde_json::to_string(&Money::new(5000)).unwrap(), "50.0");

        let parsed: Money = serde_json::from_str("120").unwrap();
        assert_eq!(parsed, Money::new(12000));
        let parsed: Money = serde_json::from_str("0.1").unwrap();
        assert_eq!(parsed, Money::new(10));
    }

    #[test]
    fn parse_rejects_values_past_the_cents_range() {
        assert!("92233720368547758.07".parse::<Money>().is_ok());
        assert!("92233720368547758.08".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn checked_add_stops_at_overflow() {
        assert_eq!(Money::new(10).checked_add(Money::new(-30)), Some(Money::new(-20)));
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
    }
}
