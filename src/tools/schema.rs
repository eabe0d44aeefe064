//! Schema primitives for tool inputs.
//!
//! Every catalog operation parses its raw JSON input through these field
//! types before anything touches the registry client. Numeric identifiers are
//! arbitrary-precision non-negative integers accepted as JSON integers or
//! decimal/hex strings, and are re-serialized as decimal strings at every
//! output boundary to avoid precision loss.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Raw input failed validation against a tool's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid parameters: {0}")]
pub struct InputError(pub String);

/// Parse raw JSON input into a typed input struct. `null` is treated as an
/// empty object so zero-argument tools accept absent params.
pub fn parse_input<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, InputError> {
    let value = if raw.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        raw.clone()
    };
    serde_json::from_value(value).map_err(|e| InputError(e.to_string()))
}

/// Validate raw input without keeping the parsed value.
pub fn check_input<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<(), InputError> {
    parse_input::<T>(raw).map(|_| ())
}

/// Serialize any non-negative integer as a decimal string.
pub fn to_uint_string(value: U256) -> String {
    value.to_string()
}

/// Parse a decimal or 0x-prefixed hex string into a U256.
pub fn parse_uint_str(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Value must be a non-negative integer".to_string());
    }
    let result = if let Some(hex_digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        U256::from_str_radix(hex_digits, 16)
    } else {
        U256::from_str_radix(s, 10)
    };
    result.map_err(|_| format!("Value must be a non-negative integer, got '{}'", s))
}

/// Non-negative arbitrary-precision integer field (agent ids, indices,
/// limits, expiries, chain ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uint(pub U256);

impl Uint {
    pub fn value(&self) -> U256 {
        self.0
    }

    /// Narrow to u64 for contract fields declared as uint64.
    pub fn as_u64(&self) -> Result<u64, InputError> {
        u64::try_from(self.0)
            .map_err(|_| InputError(format!("Value {} exceeds the uint64 range", self.0)))
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Uint {
    fn from(value: u64) -> Self {
        Uint(U256::from(value))
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UintVisitor;

        impl Visitor<'_> for UintVisitor {
            type Value = Uint;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Uint, E> {
                Ok(Uint(U256::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Uint, E> {
                if v < 0 {
                    Err(E::custom("Value must be a non-negative integer"))
                } else {
                    Ok(Uint(U256::from(v as u64)))
                }
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Uint, E> {
                if v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
                    Err(E::custom("Value must be a non-negative integer"))
                } else {
                    Ok(Uint(U256::from(v as u64)))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Uint, E> {
                parse_uint_str(v).map(Uint).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(UintVisitor)
    }
}

/// Feedback score, an integer in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u8);

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVisitor;

        fn bounded<E: de::Error>(v: i64) -> Result<Score, E> {
            if (0..=100).contains(&v) {
                Ok(Score(v as u8))
            } else {
                Err(E::custom("Score must be an integer between 0 and 100"))
            }
        }

        impl Visitor<'_> for ScoreVisitor {
            type Value = Score;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer between 0 and 100")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
                bounded(i64::try_from(v).unwrap_or(i64::MAX))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
                bounded(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
                if v.fract() != 0.0 {
                    Err(E::custom("Score must be an integer between 0 and 100"))
                } else {
                    bounded(v as i64)
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Score, E> {
                let parsed: i64 = v
                    .trim()
                    .parse()
                    .map_err(|_| E::custom("Score must be an integer between 0 and 100"))?;
                bounded(parsed)
            }
        }

        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// EVM address field, `0x` + 40 hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressField(pub Address);

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_hex_str(s: &str, len: usize) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() == len && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

impl<'de> Deserialize<'de> for AddressField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !is_hex_str(&s, 40) {
            return Err(de::Error::custom(
                "Expected checksum or lower-case EVM address",
            ));
        }
        // Accept any casing; checksums are not enforced at this boundary.
        let address = Address::from_str(&s.to_lowercase())
            .map_err(|_| de::Error::custom("Expected checksum or lower-case EVM address"))?;
        Ok(AddressField(address))
    }
}

/// 32-byte hash field, `0x` + 64 hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hash32(pub B256);

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !is_hex_str(&s, 64) {
            return Err(de::Error::custom("Expected 32-byte hex string"));
        }
        let hash = B256::from_str(&s)
            .map_err(|_| de::Error::custom("Expected 32-byte hex string"))?;
        Ok(Hash32(hash))
    }
}

/// Token/feedback URI restricted to the supported schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri(pub String);

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const URI_SCHEMES: [&str; 5] = ["ipfs://", "https://", "http://", "ar://", "data:"];

impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let valid = URI_SCHEMES
            .iter()
            .any(|scheme| s.len() > scheme.len() && s.starts_with(scheme));
        if !valid {
            return Err(de::Error::custom(
                "Expected URI (supports ipfs://, https://, http://, ar://, data:)",
            ));
        }
        Ok(Uri(s))
    }
}

/// Hex-encoded byte blob (optionally `0x`-prefixed), e.g. a signed feedback
/// authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        if digits.is_empty() {
            return Err(de::Error::custom("Signed feedbackAuth bytes are required"));
        }
        hex::decode(digits)
            .map(HexBytes)
            .map_err(|_| de::Error::custom("Expected hex-encoded bytes"))
    }
}

/// String field that must not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyString(pub String);

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(de::Error::custom("Value is required"));
        }
        Ok(NonEmptyString(s))
    }
}

/// Metadata key/value pair as supplied in tool input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataEntryInput {
    pub key: NonEmptyString,
    #[serde(default)]
    pub value: String,
}

impl MetadataEntryInput {
    pub fn into_entry(self) -> crate::client::MetadataEntry {
        crate::client::MetadataEntry {
            key: self.key.0,
            value: self.value,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON Schema builders
//
// Properties that accept multiple JSON types (integers or strings) are left
// without a "type" field for OpenAI-style schema compatibility.
// ---------------------------------------------------------------------------

pub fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub fn uint_prop(description: &str) -> Value {
    json!({ "description": format!("{} (non-negative integer, or decimal string)", description) })
}

pub fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub fn address_prop(description: &str) -> Value {
    json!({
        "type": "string",
        "pattern": "^0x[a-fA-F0-9]{40}$",
        "description": description,
    })
}

pub fn bytes32_prop(description: &str) -> Value {
    json!({
        "type": "string",
        "pattern": "^0x[a-fA-F0-9]{64}$",
        "description": description,
    })
}

pub fn uri_prop(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{} (ipfs://, https://, http://, ar:// or data: URI)", description),
    })
}

pub fn score_prop(description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "maximum": 100,
        "description": description,
    })
}

pub fn bool_prop(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub fn address_array_prop(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string", "pattern": "^0x[a-fA-F0-9]{40}$" },
        "description": description,
    })
}
