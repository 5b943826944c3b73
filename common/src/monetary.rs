//! Arbitrary-precision token amounts.
//!
//! Token amounts on chain are 256-bit unsigned integers and balances derived
//! from them can go negative, so neither fits a fixed-width integer. Values
//! are [`BigUint`] and balances are [`BigInt`] throughout the ledger.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};

use crate::error::{LedgerError, Result};

/// Signed account balance.
pub type Balance = BigInt;

/// Non-negative amount moved by a transfer.
pub type Amount = BigUint;

/// Parse a base-10 balance as returned by a NUMERIC column.
///
/// A fractional part is accepted only when it is all zeros (`"750.000"`).
pub fn parse_balance(s: &str) -> Result<Balance> {
    let integral = strip_zero_fraction(s)?;
    BigInt::from_str(integral)
        .map_err(|e| LedgerError::InvalidAmount(format!("{} (value: {})", e, s)))
}

/// Parse a base-10 non-negative amount.
pub fn parse_amount(s: &str) -> Result<Amount> {
    let integral = strip_zero_fraction(s)?;
    BigUint::from_str(integral)
        .map_err(|e| LedgerError::InvalidAmount(format!("{} (value: {})", e, s)))
}

fn strip_zero_fraction(s: &str) -> Result<&str> {
    let s = s.trim();
    match s.split_once('.') {
        Some((integral, fraction)) if fraction.chars().all(|c| c == '0') => Ok(integral),
        Some(_) => Err(LedgerError::InvalidAmount(format!(
            "fractional amount not allowed (value: {})",
            s
        ))),
        None => Ok(s),
    }
}

/// Serde adapter writing big integers as base-10 strings.
///
/// JSON numbers lose precision past 2^53, so amounts travel as strings.
/// Deserialization also accepts plain JSON integers for convenience.
///
/// ```rust,ignore
/// #[serde(with = "tokenledger_common::decimal")]
/// pub value: BigUint,
/// ```
pub mod decimal {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        T: fmt::Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> std::result::Result<T, D::Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor(PhantomData))
    }

    struct DecimalVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for DecimalVisitor<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a base-10 integer string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<T, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<T, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<T, E> {
            self.visit_str(&v.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "decimal")]
        value: BigUint,
        #[serde(with = "decimal")]
        balance: BigInt,
    }

    #[test]
    fn test_parse_balance_from_numeric_text() {
        assert_eq!(parse_balance("750").unwrap(), BigInt::from(750));
        assert_eq!(parse_balance("-100").unwrap(), BigInt::from(-100));
        assert_eq!(parse_balance("15.000").unwrap(), BigInt::from(15));
        assert!(parse_balance("1.5").is_err());
        assert!(parse_balance("abc").is_err());
    }

    #[test]
    fn test_parse_amount_beyond_u128() {
        // 2^256 - 1
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let amount = parse_amount(max).unwrap();
        assert_eq!(amount.bits(), 256);
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_decimal_serde_uses_strings() {
        let holder = Holder {
            value: BigUint::from(250u32),
            balance: BigInt::from(-100),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"value":"250","balance":"-100"}"#);

        let parsed: Holder = serde_json::from_str(r#"{"value":250,"balance":"-100"}"#).unwrap();
        assert_eq!(parsed, holder);
    }
}
