//! Serde adapter writing byte buffers as standard base64 text.
//!
//! Bound byte fields are read from base64, so replies that carry them should
//! write them the same way:
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Avatar {
//!     #[serde(with = "valet_bind::base64")]
//!     data: Vec<u8>,
//! }
//!
//! let json = serde_json::to_string(&Avatar { data: b"hello".to_vec() }).unwrap();
//! assert_eq!(json, r#"{"data":"aGVsbG8="}"#);
//! ```

use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine as _;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Serializes bytes as base64 text.
pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]> + ?Sized,
{
    serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
}

/// Deserializes base64 text into bytes.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<Vec<u8>>,
{
    let text = String::deserialize(deserializer)?;
    STANDARD
        .decode(text.as_bytes())
        .map(T::from)
        .map_err(|e| de::Error::custom(format!("invalid base64: {e}")))
}

/// The same adapter for `Option` fields; `None` is written as null.
pub mod option {
    use super::STANDARD;
    use ::base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serializes optional bytes as base64 text or null.
    pub fn serialize<S, T>(bytes: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b.as_ref())),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes optional base64 text.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<Vec<u8>>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| {
                STANDARD
                    .decode(text.as_bytes())
                    .map(T::from)
                    .map_err(|e| de::Error::custom(format!("invalid base64: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        #[serde(with = "crate::base64")]
        data: Bytes,
        #[serde(default, with = "crate::base64::option")]
        thumb: Option<Vec<u8>>,
    }

    #[test]
    fn test_json_text() {
        let blob = Blob {
            data: Bytes::from_static(b"hello"),
            thumb: None,
        };

        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, r#"{"data":"aGVsbG8=","thumb":null}"#);
        assert_eq!(serde_json::from_str::<Blob>(&json).unwrap(), blob);
    }

    #[test]
    fn test_option_some() {
        let blob: Blob = serde_json::from_str(r#"{"data":"","thumb":"YWJj"}"#).unwrap();
        assert!(blob.data.is_empty());
        assert_eq!(blob.thumb.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_invalid_text() {
        let err = serde_json::from_str::<Blob>(r#"{"data":"***"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid base64"));
    }
}
