//! The backend's standard response wrapper.
//!
//! # Design
//! Every successful response looks like
//! `{"result":"ok","data":...,"http_code":200}`. Only `data` is handed back
//! to callers. The metadata fields are optional and anything else in the
//! object is ignored, so envelope additions on the server never break decoding.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Required even when `T` is an `Option`: a body with no `data` key is
    /// not an envelope.
    #[serde(deserialize_with = "required")]
    pub data: T,
    /// `None` when absent or not a string.
    #[serde(default, deserialize_with = "lenient")]
    pub result: Option<String>,
    /// `None` when absent or not a small unsigned integer.
    #[serde(default, deserialize_with = "lenient")]
    pub http_code: Option<u16>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

// serde treats a missing `Option` field as `None` unless the field has a
// custom deserializer.
fn required<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer)
}

// Metadata never fails the envelope: a field of an unexpected type reads as
// absent.
fn lenient<'de, D, M>(deserializer: D) -> Result<Option<M>, D::Error>
where
    D: serde::Deserializer<'de>,
    M: serde::de::DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}
