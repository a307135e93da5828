//! URL-encoded form body decoding.

use crate::config::{AppError, Result};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Decoded `application/x-www-form-urlencoded` fields. First value wins.
#[derive(Debug, Clone, Default)]
pub struct FormValues(HashMap<String, String>);

impl FormValues {
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let body_str = String::from_utf8_lossy(body);
        let mut values = HashMap::new();

        for pair in body_str.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let dk = decode(k);
            let dv = decode(v);
            values.entry(dk).or_insert(dv);
        }

        Self(values)
    }

    /// Returns the field value, or an empty string when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Parses an integer field. Absent or empty yields `default`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the field is present but not an integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        match self.0.get(key).map(|v| v.trim()) {
            None | Some("") => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| AppError::BadRequest(format!("field {key} is not an integer"))),
        }
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
