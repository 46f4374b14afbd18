use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A decimal value exactly as the server rendered it.
///
/// The API emits decimal fields as strings (`"10.00"`), but plain JSON numbers
/// are accepted as well. The text is kept verbatim and only parsed when a
/// number is actually needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Amount(String);

impl Amount {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, or `None` if the text is not a finite number.
    pub fn parse(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parse() {
            Some(value) => write!(f, "{}", format_currency(value)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
    Null(()),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => Amount(text),
            RawAmount::Number(number) => Amount(number.to_string()),
            RawAmount::Null(()) => Amount::default(),
        })
    }
}

/// `$` followed by the value fixed to two decimals. No locale handling.
pub fn format_currency(value: f64) -> String {
    // Adding positive zero turns -0.0 into 0.0
    format!("${:.2}", value + 0.0)
}
