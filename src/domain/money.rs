//! Serde helpers for money amounts on the JSON wire.
//!
//! Amounts go out as JSON numbers: whole amounts as integers, the rest as
//! floats. Incoming JSON numbers are parsed from their shortest decimal text,
//! so `19.99` is stored as exactly `19.99`. Strings are accepted as well.

use bigdecimal::BigDecimal;
use serde::de::{self, Unexpected, Visitor};
use serde::{ser, Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

pub fn serialize<S>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let whole = amount.with_scale(0);
    if &whole == amount {
        if let Ok(value) = whole.to_string().parse::<i64>() {
            return serializer.serialize_i64(value);
        }
    }

    let value = amount
        .to_string()
        .parse::<f64>()
        .map_err(|e| {
            <S::Error as ser::Error>::custom(format!("amount {} is not representable: {}", amount, e))
        })?;
    serializer.serialize_f64(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = BigDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a JSON number or string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<BigDecimal, E> {
        Ok(BigDecimal::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<BigDecimal, E> {
        Ok(BigDecimal::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<BigDecimal, E> {
        if !value.is_finite() {
            return Err(E::invalid_value(Unexpected::Float(value), &self));
        }
        // `Display` for f64 prints the shortest text that round-trips.
        BigDecimal::from_str(&value.to_string())
            .map_err(|_| E::invalid_value(Unexpected::Float(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<BigDecimal, E> {
        BigDecimal::from_str(value.trim()).map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}
