use std::error;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;

/// The number of decimal places a native coin value is reported with.
pub const COIN_DECIMALS: u32 = 8;

/// A coin value as reported by a native daemon, in whole coins.
///
/// Daemons report balances as decimal numbers (or decimal strings) with up to
/// [`COIN_DECIMALS`] fractional digits. An `Amount` holds that value exactly; it is never
/// routed through a binary floating-point representation once parsed.
///
/// Addition is checked: adding two `Amount`s produces `None` if the result cannot be
/// represented, mirroring how wallet totals are accumulated elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Wraps a decimal value.
    pub const fn from_decimal(value: Decimal) -> Self {
        Amount(value)
    }

    /// Creates an `Amount` from a whole number of coins.
    pub fn from_coins(coins: i64) -> Self {
        Amount(Decimal::from(coins))
    }

    /// Returns `true` if this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add<Amount> for Amount {
    type Output = Option<Amount>;

    fn add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

/// An error returned when a daemon-reported value cannot be read as an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid coin amount: {:?}", self.0)
    }
}

impl error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parses plain (`"1.5"`) or scientific (`"1e-8"`) decimal notation.
    ///
    /// JSON number literals are accepted verbatim, which is how daemons encode small
    /// balances.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Amount)
            .map_err(|_| ParseAmountError(s.to_owned()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Amount {
    /// Amounts are emitted as JSON numbers, matching the daemon's own encoding: whole
    /// values as integers, everything else as the nearest `f64`.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use rust_decimal::prelude::ToPrimitive;

        let whole = if self.0.fract().is_zero() {
            self.0.to_i64()
        } else {
            None
        };
        match (whole, self.0.to_f64()) {
            (Some(v), _) => serializer.serialize_i64(v),
            (None, Some(v)) => serializer.serialize_f64(v),
            (None, None) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Amount {
    /// Accepts a JSON number or a decimal string in plain or scientific notation.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a coin amount as a number or a decimal string")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount::from_coins(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(Decimal::from(v)))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Amount, E> {
                // `Display` for `f64` yields the shortest digits that round-trip.
                self.visit_str(&v.to_string())
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// A type for balance violations in amount addition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BalanceError {
    Overflow,
}

impl error::Error for BalanceError {}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            BalanceError::Overflow => {
                write!(f, "Amount addition resulted in a value outside the valid range.")
            }
        }
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::prop_compose;
    use rust_decimal::Decimal;

    use super::{Amount, COIN_DECIMALS};

    /// The largest whole-coin balance generated by the strategies below.
    pub const MAX_TEST_COINS: i64 = 1_000_000;

    prop_compose! {
        /// A non-negative amount with up to eight decimal places.
        pub fn arb_amount()(sats in 0i64..(MAX_TEST_COINS * 1_0000_0000)) -> Amount {
            Amount::from_decimal(Decimal::new(sats, COIN_DECIMALS))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;

    use super::{Amount, ParseAmountError};

    #[test]
    fn parses_daemon_encodings() {
        assert_eq!("5".parse::<Amount>(), Ok(Amount::from_coins(5)));
        assert_eq!(
            "0.00010000".parse::<Amount>(),
            Ok(Amount::from_decimal(Decimal::new(1, 4)))
        );
        assert_eq!(
            "1e-8".parse::<Amount>(),
            Ok(Amount::from_decimal(Decimal::new(1, 8)))
        );
        assert_eq!(
            " 12.5 ".parse::<Amount>(),
            Ok(Amount::from_decimal(Decimal::new(125, 1)))
        );
        assert_matches!("five".parse::<Amount>(), Err(ParseAmountError(s)) if s == "five");
        assert!("".parse::<Amount>().is_err());
    }

    #[test]
    fn checked_addition() {
        let a = Amount::from_coins(2);
        let b = Amount::from_decimal(Decimal::new(5, 1));
        assert_eq!(a + b, Some(Amount::from_decimal(Decimal::new(25, 1))));

        let max = Amount::from_decimal(Decimal::MAX);
        assert_eq!(max + Amount::from_coins(1), None);
        assert_eq!(max + Amount::ZERO, Some(max));
    }

    #[test]
    fn display_is_normalized() {
        assert_eq!("5.00000000".parse::<Amount>().unwrap().to_string(), "5");
        assert_eq!("0.10".parse::<Amount>().unwrap().to_string(), "0.1");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_json_numbers() {
        let json = |s: &str| serde_json::to_string(&s.parse::<Amount>().unwrap()).unwrap();

        // Whole values have no fractional part, however the daemon wrote them.
        assert_eq!(json("5"), "5");
        assert_eq!(json("5.00000000"), "5");
        assert_eq!(json("0"), "0");
        assert_eq!(json("-3.0"), "-3");

        assert_eq!(json("0.5"), "0.5");
        assert_eq!(json("1e-8"), "1e-8");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_numbers_and_strings() {
        use serde_json::{from_value, json};

        let amount = |v| from_value::<Amount>(v);
        assert_eq!(amount(json!(5)).unwrap(), Amount::from_coins(5));
        assert_eq!(amount(json!(-2)).unwrap(), Amount::from_coins(-2));
        assert_eq!(
            amount(json!(0.0001)).unwrap(),
            Amount::from_decimal(Decimal::new(1, 4))
        );
        assert_eq!(
            amount(json!(1e-8)).unwrap(),
            Amount::from_decimal(Decimal::new(1, 8))
        );
        assert_eq!(
            amount(json!("12.50")).unwrap(),
            Amount::from_decimal(Decimal::new(125, 1))
        );
        assert_eq!(
            amount(json!("1e-8")).unwrap(),
            Amount::from_decimal(Decimal::new(1, 8))
        );
        assert!(amount(json!("abc")).is_err());
        assert!(amount(json!(null)).is_err());
        assert!(amount(json!(true)).is_err());
    }
}
