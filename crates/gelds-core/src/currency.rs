//! Exact, unbounded currency.
//!
//! [`Currency`] wraps an arbitrary-precision unsigned integer so that
//! balances never overflow or lose precision over long idle sessions.
//! It is an immutable value type: every arithmetic operation returns a
//! new value, and subtraction below zero is rejected rather than
//! floored.

use std::fmt;
use std::ops::Add;

use num_bigint::BigUint;
use num_traits::{CheckedSub, ToPrimitive, Zero};

use crate::error::InsufficientFunds;

/// Magnitude suffixes, one per power of 1000. Index 0 is "no suffix".
const SUFFIXES: [&str; 12] = [
    "", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc",
];

/// Significant digits shown by [`Currency::to_human_readable`].
const SIGNIFICANT_DIGITS: usize = 3;

/// A non-negative amount of Gelds of unbounded size.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Currency(BigUint);

impl Currency {
    /// Zero Gelds.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Wrap an existing big integer.
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    /// The underlying big integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Parse a plain base-10 digit string (no sign, no separators).
    pub fn parse_decimal(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        BigUint::parse_bytes(digits.as_bytes(), 10).map(Self)
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Subtract `amount`, failing closed when it exceeds `self`.
    ///
    /// Never returns a negative or floored value: on failure the caller
    /// still owns the untouched balance and the error reports both sides.
    pub fn try_subtract(&self, amount: &Currency) -> Result<Currency, InsufficientFunds> {
        self.0
            .checked_sub(&amount.0)
            .map(Self)
            .ok_or_else(|| InsufficientFunds {
                required: amount.clone(),
                available: self.clone(),
            })
    }

    /// Multiply by an integer factor.
    pub fn scale(&self, factor: u64) -> Currency {
        Self(&self.0 * factor)
    }

    /// Index of the magnitude suffix this amount renders with.
    ///
    /// 0 for values below one thousand, 1 for thousands, 2 for millions,
    /// and so on. Keeps counting past the last named suffix, where the
    /// formatter switches to scientific notation.
    pub fn magnitude_tier(&self) -> usize {
        let digits = self.0.to_str_radix(10).len();
        (digits - 1) / 3
    }

    /// Render with a magnitude suffix and three significant digits.
    ///
    /// Digits are truncated, never rounded, so a value always renders in
    /// its own tier: `999_999` is `"999K"` and `1_000_000` is `"1M"`.
    /// Amounts past the last suffix render as `"1.23e36"`.
    pub fn to_human_readable(&self) -> String {
        let digits = self.0.to_str_radix(10);
        let len = digits.len();
        if len <= 3 {
            return digits;
        }

        let tier = (len - 1) / 3;
        match SUFFIXES.get(tier) {
            Some(suffix) => {
                let lead = len - tier * 3;
                let (int_part, rest) = digits.split_at(lead);
                let frac = rest[..SIGNIFICANT_DIGITS.saturating_sub(lead)].trim_end_matches('0');
                if frac.is_empty() {
                    format!("{int_part}{suffix}")
                } else {
                    format!("{int_part}.{frac}{suffix}")
                }
            }
            None => {
                let (head, rest) = digits.split_at(1);
                let frac = rest[..SIGNIFICANT_DIGITS - 1].trim_end_matches('0');
                let exponent = len - 1;
                if frac.is_empty() {
                    format!("{head}e{exponent}")
                } else {
                    format!("{head}.{frac}e{exponent}")
                }
            }
        }
    }
}

impl From<u64> for Currency {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<u32> for Currency {
    fn from(v: u32) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<BigUint> for Currency {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

impl Add for Currency {
    type Output = Currency;

    fn add(self, rhs: Currency) -> Currency {
        Currency(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Currency> for &'a Currency {
    type Output = Currency;

    fn add(self, rhs: &'a Currency) -> Currency {
        Currency(&self.0 + &rhs.0)
    }
}

impl<'a> Add<&'a Currency> for Currency {
    type Output = Currency;

    fn add(self, rhs: &'a Currency) -> Currency {
        Currency(self.0 + &rhs.0)
    }
}

/// Exact decimal value, e.g. `1234567`.
impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gelds(v: u64) -> Currency {
        Currency::from(v)
    }

    #[test]
    fn subtract_rejects_overdraw() {
        let err = gelds(50).try_subtract(&gelds(1000)).unwrap_err();
        assert_eq!(err.required, gelds(1000));
        assert_eq!(err.available, gelds(50));
        assert_eq!(gelds(1000).try_subtract(&gelds(1000)).unwrap(), Currency::zero());
    }

    #[test]
    fn grows_past_u64_without_loss() {
        let max = gelds(u64::MAX);
        let sum = &max + &max;
        assert_eq!(sum.to_string(), "36893488147419103230");
        assert_eq!(sum.to_u64(), None);
        assert_eq!(sum.try_subtract(&max).unwrap(), max);
        assert_eq!(max.scale(2), sum);
    }

    #[test]
    fn human_readable_below_thousand_is_plain() {
        assert_eq!(Currency::zero().to_human_readable(), "0");
        assert_eq!(gelds(7).to_human_readable(), "7");
        assert_eq!(gelds(999).to_human_readable(), "999");
    }

    #[test]
    fn human_readable_suffixes() {
        assert_eq!(gelds(1_000).to_human_readable(), "1K");
        assert_eq!(gelds(1_500).to_human_readable(), "1.5K");
        assert_eq!(gelds(12_345).to_human_readable(), "12.3K");
        assert_eq!(gelds(999_999).to_human_readable(), "999K");
        assert_eq!(gelds(1_000_000).to_human_readable(), "1M");
        assert_eq!(gelds(1_234_567).to_human_readable(), "1.23M");
        assert_eq!(gelds(10_200_000_000).to_human_readable(), "10.2B");
        assert_eq!(gelds(u64::MAX).to_human_readable(), "18.4Qi");
    }

    #[test]
    fn human_readable_tier_boundaries() {
        assert_eq!(gelds(999_999).magnitude_tier(), 1);
        assert_eq!(gelds(1_000_000).magnitude_tier(), 2);
        assert_eq!(gelds(999).magnitude_tier(), 0);
        assert_eq!(gelds(1_000).magnitude_tier(), 1);
    }

    #[test]
    fn human_readable_falls_back_to_scientific() {
        let huge = Currency::parse_decimal(&format!("1{}", "0".repeat(36))).unwrap();
        assert_eq!(huge.to_human_readable(), "1e36");
        let huge = Currency::parse_decimal(&format!("456{}", "0".repeat(40))).unwrap();
        assert_eq!(huge.to_human_readable(), "4.56e42");
        assert_eq!(huge.magnitude_tier(), 14);

        let last_named = Currency::parse_decimal(&format!("999{}", "0".repeat(33))).unwrap();
        assert_eq!(last_named.to_human_readable(), "999Dc");
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert!(Currency::parse_decimal("").is_none());
        assert!(Currency::parse_decimal("-5").is_none());
        assert!(Currency::parse_decimal("1_000").is_none());
        assert_eq!(Currency::parse_decimal("0042"), Some(gelds(42)));
    }

    /// Raw limbs, plus decimal strings so every suffix tier and the
    /// scientific range get drawn, not just near-maximal values.
    fn arb_currency() -> impl Strategy<Value = Currency> {
        prop_oneof![
            prop::collection::vec(any::<u32>(), 0..6)
                .prop_map(|limbs| Currency::from_biguint(BigUint::new(limbs))),
            "[1-9][0-9]{0,47}".prop_map(|digits| Currency::parse_decimal(&digits).unwrap()),
        ]
    }

    /// `(exponent, mantissa)` of a rendered amount; named tiers have
    /// exponent 0.
    fn rendered_value(text: &str) -> (usize, f64) {
        match text.split_once('e') {
            Some((mantissa, exponent)) => (exponent.parse().unwrap(), mantissa.parse().unwrap()),
            None => {
                let mantissa = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
                (0, mantissa.parse().unwrap())
            }
        }
    }

    proptest! {
        #[test]
        fn subtract_undoes_add(a in arb_currency(), b in arb_currency()) {
            let sum = &a + &b;
            prop_assert_eq!(sum.try_subtract(&b).unwrap(), a);
        }

        #[test]
        fn subtract_never_goes_negative(a in arb_currency(), b in arb_currency()) {
            match a.try_subtract(&b) {
                Ok(rest) => prop_assert!(&rest + &b == a),
                Err(e) => {
                    prop_assert!(b > a);
                    prop_assert_eq!(e.available, a);
                }
            }
        }

        #[test]
        fn magnitude_tier_is_monotonic(a in arb_currency(), b in arb_currency()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(lo.magnitude_tier() <= hi.magnitude_tier());
            if lo.magnitude_tier() == hi.magnitude_tier() {
                let lo_text = lo.to_human_readable();
                let hi_text = hi.to_human_readable();
                prop_assert!(
                    rendered_value(&lo_text) <= rendered_value(&hi_text),
                    "{} rendered as {} but {} rendered as {}",
                    lo, lo_text, hi, hi_text
                );
            }
        }

        #[test]
        fn tier_neighbours_render_in_order(digits in 4usize..48, bump in 1u64..1000) {
            // Two amounts that usually share a tier, including Sx..Dc and
            // the scientific range.
            let base = Currency::parse_decimal(&format!("1{}", "0".repeat(digits - 1))).unwrap();
            let higher = &base.scale(bump) + &base;
            if base.magnitude_tier() == higher.magnitude_tier() {
                prop_assert!(
                    rendered_value(&base.to_human_readable())
                        <= rendered_value(&higher.to_human_readable())
                );
            } else {
                prop_assert!(base.magnitude_tier() < higher.magnitude_tier());
            }
        }

        #[test]
        fn scale_matches_repeated_add(a in arb_currency(), k in 1u64..20) {
            let mut acc = Currency::zero();
            for _ in 0..k {
                acc = acc + &a;
            }
            prop_assert_eq!(a.scale(k), acc);
        }
    }
}
