//! Tri-state request fields
//!
//! JSON write payloads must tell apart a key that was omitted from one that
//! was sent as `null`. Partial updates leave omitted fields untouched and
//! clear nullable fields that were sent as `null`.

use serde::{Deserialize, Deserializer};

/// A JSON object member: omitted, explicitly `null`, or a value
///
/// Use with `#[serde(default)]` so an absent key becomes [`Field::Missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Field<String>,
        #[serde(default)]
        price: Field<i64>,
    }

    #[test]
    fn test_missing_null_and_value() {
        let payload: Payload = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(payload.name, Field::Missing);
        assert_eq!(payload.price, Field::Null);

        let payload: Payload = serde_json::from_str(r#"{"name": "Bessie", "price": 5}"#).unwrap();
        assert_eq!(payload.name, Field::Value("Bessie".to_string()));
        assert_eq!(payload.price, Field::Value(5));
    }

    #[test]
    fn test_wrong_type_is_a_deserialization_error() {
        assert!(serde_json::from_str::<Payload>(r#"{"price": "five"}"#).is_err());
    }
}
