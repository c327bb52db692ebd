//! Offline token expiry inspection.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: i64,
}

/// Report whether `token`'s `exp` claim lies in the past.
///
/// Purely local: the payload segment is base64-decoded (unpadded standard
/// alphabet) and its numeric `exp` claim compared against the wall clock.
/// The signature is never verified (the service owns that); this only
/// saves one doomed round trip before re-authenticating. A token whose
/// expiry cannot be read (too few segments, undecodable payload, missing
/// or zero `exp`) is reported as [`Error::MalformedToken`] rather than
/// "not expired", so callers land on the re-authentication path instead
/// of trusting an unverifiable token.
pub fn is_token_expired(token: &str) -> Result<bool> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) => payload,
        _ => return Err(Error::MalformedToken("fewer than two segments")),
    };
    let decoded = STANDARD_NO_PAD
        .decode(payload)
        .map_err(|_| Error::MalformedToken("payload is not base64"))?;
    let claims: Claims = serde_json::from_slice(&decoded)
        .map_err(|_| Error::MalformedToken("payload is not a claims object"))?;
    if claims.exp == 0 {
        return Err(Error::MalformedToken("exp claim missing or zero"));
    }
    Ok(epoch_secs() > claims.exp)
}

/// Current Unix epoch in seconds.
fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
