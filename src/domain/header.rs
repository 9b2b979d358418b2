//! Spectral header: the string-keyed scalar mapping produced by the FITS reader.
//!
//! The header is immutable once built. Required keywords are read through typed
//! accessors that fail with an error naming the keyword.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectrumError};

/// A single header scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Logical(bool),
    Number(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        HeaderValue::Number(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Number(value as f64)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Text(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        HeaderValue::Logical(value)
    }
}

/// Header keyword → scalar mapping. Keys are stored upper-case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralHeader {
    entries: BTreeMap<String, HeaderValue>,
}

impl SpectralHeader {
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.entries.get(&key.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required numeric keyword.
    pub fn number(&self, key: &str) -> Result<f64> {
        let value = self
            .get(key)
            .ok_or_else(|| SpectrumError::MissingKeyword(key.to_string()))?;
        let number = value.as_f64().ok_or_else(|| SpectrumError::InvalidKeyword {
            key: key.to_string(),
            reason: format!("expected a number, got {value:?}"),
        })?;
        if !number.is_finite() {
            return Err(SpectrumError::InvalidKeyword {
                key: key.to_string(),
                reason: format!("value {number} is not finite"),
            });
        }
        Ok(number)
    }

    /// Required non-negative integer keyword (axis lengths, dimension count).
    pub fn count(&self, key: &str) -> Result<usize> {
        let number = self.number(key)?;
        if number < 0.0 || number.fract() != 0.0 {
            return Err(SpectrumError::InvalidKeyword {
                key: key.to_string(),
                reason: format!("expected a non-negative integer, got {number}"),
            });
        }
        Ok(number as usize)
    }

    /// Optional text keyword.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for SpectralHeader
where
    K: AsRef<str>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_ascii_uppercase(), v.into()))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let header: SpectralHeader = [("naxis1", HeaderValue::from(100.0))].into_iter().collect();
        assert_eq!(header.count("NAXIS1").unwrap(), 100);
        assert_eq!(header.count("naxis1").unwrap(), 100);
    }

    #[test]
    fn typed_accessors_name_the_keyword() {
        let header: SpectralHeader = [
            ("CTYPE1", HeaderValue::from("FREQ")),
            ("NAXIS1", HeaderValue::from(10.5)),
        ]
        .into_iter()
        .collect();

        match header.number("CRVAL1") {
            Err(SpectrumError::MissingKeyword(key)) => assert_eq!(key, "CRVAL1"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            header.number("CTYPE1"),
            Err(SpectrumError::InvalidKeyword { .. })
        ));
        assert!(matches!(
            header.count("NAXIS1"),
            Err(SpectrumError::InvalidKeyword { .. })
        ));
        assert_eq!(header.text("CTYPE1"), Some("FREQ"));
    }
}
