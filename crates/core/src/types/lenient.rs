//! Deserializers for loosely typed service payloads.
//!
//! The service is not consistent about numbers: IDs and ratings sometimes
//! arrive as JSON numbers and sometimes as numeric strings.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Deserialize an integer from a JSON number or a numeric string.
///
/// # Errors
///
/// Fails if the value is neither, or does not fit `T`.
pub fn integer<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + FromStr,
    <T as TryFrom<i64>>::Error: Display,
    <T as FromStr>::Err: Display,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => T::try_from(n).map_err(D::Error::custom),
        NumberOrText::Text(text) => text.trim().parse().map_err(D::Error::custom),
    }
}

/// Like [`integer`], but `null` and blank strings become `None`.
///
/// # Errors
///
/// Fails if a present value is not an integer that fits `T`.
pub fn optional_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + FromStr,
    <T as TryFrom<i64>>::Error: Display,
    <T as FromStr>::Err: Display,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Number(n)) => T::try_from(n).map(Some).map_err(D::Error::custom),
        Some(NumberOrText::Text(text)) => text.trim().parse().map(Some).map_err(D::Error::custom),
    }
}
