//! `deserialize_with` helpers for the values HTML forms send as text:
//! ids and numbers as `"7"`, unset dates as `""`.

use chrono::NaiveDate;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn parse_text<T, E>(text: &str) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: Error,
{
    text.trim()
        .parse()
        .map_err(|e| E::custom(format!("invalid number {text:?}: {e}")))
}

/// Accepts `7` as well as `"7"`.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrText::<T>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => parse_text(&text),
    }
}

/// Like [`number`]; `null` and blank text become `None`.
pub fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => parse_text(&text).map(Some),
    }
}

/// `YYYY-MM-DD`; `null` and blank text become `None`.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid date {text:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(deserialize_with = "number")]
        id: u64,
        #[serde(default, deserialize_with = "optional_number")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "optional_date")]
        until: Option<NaiveDate>,
    }

    fn form(body: serde_json::Value) -> Result<Form, serde_json::Error> {
        serde_json::from_value(body)
    }

    #[test]
    fn numbers_arrive_as_json_numbers_or_text() {
        let f = form(json!({"id": "7", "amount": "85000", "until": "2026-03-20"})).unwrap();
        assert_eq!(f.id, 7);
        assert_eq!(f.amount, Some(85000.0));
        assert_eq!(f.until, NaiveDate::from_ymd_opt(2026, 3, 20));

        let f = form(json!({"id": 7, "amount": 85000})).unwrap();
        assert_eq!(f.id, 7);
        assert_eq!(f.amount, Some(85000.0));
        assert_eq!(f.until, None);
    }

    #[test]
    fn blank_and_null_optionals_are_none() {
        let f = form(json!({"id": 1, "amount": "", "until": ""})).unwrap();
        assert_eq!((f.amount, f.until), (None, None));

        let f = form(json!({"id": 1, "amount": null, "until": null})).unwrap();
        assert_eq!((f.amount, f.until), (None, None));
    }

    #[test]
    fn garbage_is_still_rejected() {
        assert!(form(json!({"id": "seven"})).is_err());
        assert!(form(json!({"id": ""})).is_err());
        assert!(form(json!({"id": 1, "until": "20/03/2026"})).is_err());
    }
}
