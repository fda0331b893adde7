//! The JSON envelope carried by each monthly snapshot object.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecodeError;

/// One held position. Passed through untouched; only decoded to confirm the
/// payload has the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// The producer spells this field `symble`.
    #[serde(rename = "symble", default, deserialize_with = "null_as_default")]
    pub symbol: String,
    /// Purchase price per share.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bid: f64,
    /// Current price per share.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
    /// Number of shares held.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hold: i64,
}

/// Decoded view of a snapshot object. Unknown fields are ignored here but
/// survive in the raw bytes that get stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub created_at: String,
    pub body: Vec<Ticker>,
}

/// Explicit `null` decodes like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_producer_format() {
        let raw = br#"{"created_at":"2024-05-01T00:00:00Z","body":[{"symble":"AAA","bid":100.0,"value":110.0,"hold":10}]}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(envelope.created_at, "2024-05-01T00:00:00Z");
        assert_eq!(
            envelope.body,
            vec![Ticker {
                symbol: "AAA".to_string(),
                bid: 100.0,
                value: 110.0,
                hold: 10,
            }]
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw = br#"{"created_at":"x","source":"broker","body":[{"symble":"B","bid":1,"value":2,"hold":3,"note":"n"}]}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(envelope.body.len(), 1);
        assert_eq!(envelope.body[0].bid, 1.0);
    }

    #[test]
    fn correctly_spelled_symbol_is_not_read() {
        let raw = br#"{"created_at":"x","body":[{"symbol":"AAA","bid":1,"value":2,"hold":3}]}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(envelope.body[0].symbol, "");
    }

    #[test]
    fn null_ticker_fields_decode_as_defaults() {
        let raw = br#"{"created_at":"x","body":[{"symble":null,"bid":null,"value":null,"hold":null}]}"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(
            envelope.body[0],
            Ticker {
                symbol: String::new(),
                bid: 0.0,
                value: 0.0,
                hold: 0,
            }
        );
    }

    #[test]
    fn empty_body_is_fine() {
        let envelope = Envelope::parse(br#"{"created_at":"x","body":[]}"#).unwrap();
        assert!(envelope.body.is_empty());
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert!(matches!(
            Envelope::parse(br#"{"body":[]}"#),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            Envelope::parse(br#"{"created_at":"x"}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(Envelope::parse(b"not json").is_err());
        assert!(Envelope::parse(b"[]").is_err());
        assert!(Envelope::parse(br#"{"created_at":5,"body":[]}"#).is_err());
        assert!(Envelope::parse(br#"{"created_at":"x","body":{}}"#).is_err());
        assert!(Envelope::parse(br#"{"created_at":"x","body":[{"hold":1.5}]}"#).is_err());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            Envelope::parse(b"{\"created_at\":\"\xff\",\"body\":[]}"),
            Err(DecodeError::NotUtf8(_))
        ));
    }
}
