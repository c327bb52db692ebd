//! Response envelope decoding.
//!
//! Every API response wraps its payload in the same JSON envelope. The
//! service is inconsistent about which of two error field pairs it
//! populates (`error`/`msg` on older endpoints, `e`/`message` on newer
//! ones), so both are checked here and normalized into [`Error::Api`].
//! When both pairs are non-zero the legacy pair wins.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: i64,
    #[serde(default)]
    e: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl Envelope {
    /// Resolve the two error field pairs into a single outcome.
    fn into_data(self) -> Result<Option<serde_json::Value>> {
        match (self.error, self.e) {
            (0, 0) => Ok(self.data),
            (code, _) if code != 0 => Err(Error::Api {
                code,
                message: self.msg,
            }),
            (_, code) => Err(Error::Api {
                code,
                message: self.message,
            }),
        }
    }
}

/// Decode an envelope body and deserialize its `data` payload into `T`.
///
/// Missing `data` decodes as JSON `null`, so only types that accept null
/// (e.g. `Option<T>`) succeed without a payload.
pub fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let data = envelope.into_data()?.unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(data)?)
}

/// Decode an envelope body, keeping only the success/failure outcome and
/// leaving `data` uninterpreted.
pub fn decode_ack(body: &[u8]) -> Result<()> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    envelope.into_data().map(|_| ())
}
