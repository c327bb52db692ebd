//! Error taxonomy shared by every operation in the crate.
//!
//! Each failure keeps its kind so callers can branch, in particular on
//! [`Error::Api`], which carries the remote error code verbatim. Nothing
//! is retried or swallowed internally; every error propagates to the
//! immediate caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be sent or no response arrived.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON, or did not match the
    /// expected envelope or payload shape.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service responded and rejected the call. `code` and `message`
    /// come from whichever of the two envelope error pairs was populated.
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    /// The login handshake completed but yielded no access token.
    #[error("login response carried no access token")]
    MissingAccessToken,

    /// A structural element of the login handshake was missing.
    #[error("login handshake: {0}")]
    Protocol(&'static str),

    /// A token string could not be parsed for expiry inspection.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// No token is stored under the given identity.
    #[error("no stored token for {0:?}")]
    TokenNotFound(String),

    /// The credential file could not be read, parsed, or written.
    #[error("credential store: {0}")]
    Store(String),
}
