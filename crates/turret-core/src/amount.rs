//! Exact fixed-point ledger amounts.
//!
//! The ledger's native asset has 7 fractional digits, so every amount is an
//! integer count of stroops (1 unit = 10_000_000 stroops). Parsing and
//! comparison are exact integer operations; floating point never touches an
//! amount, so there is no rounding slack at a cost boundary.

use crate::errors::TurretError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Stroops per whole unit of the native asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Number of fractional digits carried by ledger amounts.
pub const FRACTIONAL_DIGITS: u32 = 7;

/// An exact native-asset amount in stroops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// Zero stroops.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw stroop count.
    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    /// Raw stroop count.
    pub fn stroops(&self) -> i64 {
        self.0
    }

    /// Upload cost for a payload: `size / divisor` units, rounded half-up
    /// at the 7th fractional digit.
    pub fn upload_cost(size_bytes: u64, divisor: u64) -> Result<Self, TurretError> {
        if divisor == 0 {
            return Err(TurretError::config("upload divisor must be non-zero"));
        }
        let numerator = (size_bytes as u128) * (STROOPS_PER_UNIT as u128);
        let divisor = divisor as u128;
        let stroops = (numerator + divisor / 2) / divisor;
        i64::try_from(stroops)
            .map(Amount)
            .map_err(|_| TurretError::validation("payload too large to price"))
    }

    /// Whether the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Amount {
    type Err = TurretError;

    /// Parse a decimal string such as `"12"`, `"0.5"`, or `"0.0000001"`.
    ///
    /// At most 7 fractional digits are accepted; anything finer cannot be
    /// represented on the ledger and is rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TurretError::validation(format!("invalid amount: {s}"));

        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > FRACTIONAL_DIGITS as usize {
            return Err(TurretError::validation(format!(
                "amount {s} has more than {FRACTIONAL_DIGITS} fractional digits"
            )));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_stroops: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| invalid())?
        };
        for _ in frac.len()..FRACTIONAL_DIGITS as usize {
            frac_stroops *= 10;
        }

        whole
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|w| w.checked_add(frac_stroops))
            .map(|v| Amount(sign * v))
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Amount {
    /// Render with all 7 fractional digits, e.g. `0.0005000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / STROOPS_PER_UNIT as u64;
        let frac = abs % STROOPS_PER_UNIT as u64;
        write!(f, "{sign}{whole}.{frac:07}")
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn parses_whole_and_fractional() {
        assert_eq!("1".parse::<Amount>().unwrap().stroops(), 10_000_000);
        assert_eq!("0.5".parse::<Amount>().unwrap().stroops(), 5_000_000);
        assert_eq!("0.0000001".parse::<Amount>().unwrap().stroops(), 1);
        assert_eq!(".5".parse::<Amount>().unwrap().stroops(), 5_000_000);
    }

    #[test]
    fn rejects_too_fine_and_garbage() {
        assert_matches!(
            "0.00000001".parse::<Amount>(),
            Err(TurretError::Validation { .. })
        );
        assert_matches!("1.2.3".parse::<Amount>(), Err(TurretError::Validation { .. }));
        assert_matches!("abc".parse::<Amount>(), Err(TurretError::Validation { .. }));
        assert_matches!("".parse::<Amount>(), Err(TurretError::Validation { .. }));
    }

    #[test]
    fn display_pads_to_seven_digits() {
        assert_eq!(Amount::from_stroops(5_000_000).to_string(), "0.5000000");
        assert_eq!(Amount::from_stroops(1).to_string(), "0.0000001");
        assert_eq!(Amount::from_stroops(10_000_000).to_string(), "1.0000000");
    }

    #[test]
    fn upload_cost_rounds_half_up() {
        // 1 byte / 3 => 0.3333333... rounds to 0.3333333
        assert_eq!(Amount::upload_cost(1, 3).unwrap().stroops(), 3_333_333);
        // 1 byte / 2 => exactly 0.5
        assert_eq!(Amount::upload_cost(1, 2).unwrap().stroops(), 5_000_000);
        // 2 bytes / 3 => 0.6666666|6... rounds to 0.6666667
        assert_eq!(Amount::upload_cost(2, 3).unwrap().stroops(), 6_666_667);
        assert_matches!(Amount::upload_cost(1, 0), Err(TurretError::Config { .. }));
    }

    #[test]
    fn one_stroop_below_cost_compares_lower() {
        let cost = Amount::upload_cost(2000, 1000).unwrap();
        let short = Amount::from_stroops(cost.stroops() - 1);
        assert!(short < cost);
        assert_eq!(short.to_string(), "1.9999999");
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(stroops in 0i64..=i64::MAX / 2) {
            let amount = Amount::from_stroops(stroops);
            let parsed: Amount = amount.to_string().parse().unwrap();
            prop_assert_eq!(parsed, amount);
        }

        #[test]
        fn ordering_matches_stroop_ordering(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
            let (x, y) = (Amount::from_stroops(a), Amount::from_stroops(b));
            prop_assert_eq!(x.cmp(&y), a.cmp(&b));
        }
    }
}
