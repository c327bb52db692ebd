//! Signed request pipeline for resource calls.
//!
//! Every resource call is a POST against the API base address, signed with
//! the service's custom `AuthJWT` authorization scheme and marked
//! uncacheable. The HTTP status line is deliberately not consulted: the
//! service reports failures inside the response envelope, which
//! [`crate::envelope`] normalizes.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope;
use crate::error::Result;

/// Default base address for resource calls.
pub(crate) const API_BASE: &str = "https://web.moneylover.me/api";

/// Authorization scheme used on resource calls. Not the standard
/// `Bearer` scheme; the standard scheme appears only in the login
/// handshake's second step.
const AUTH_SCHEME: &str = "AuthJWT";

/// Sent on every request so no intermediary replays a stale envelope.
const CACHE_CONTROL: &str = "no-cache, max-age=0, no-store, no-transform, must-revalidate";

pub(crate) struct Transport {
    http: reqwest::blocking::Client,
    base: String,
    token: String,
}

impl Transport {
    pub(crate) fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base: base.into(),
            token: token.into(),
        }
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// POST with an empty body.
    pub(crate) fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.http.post(self.url(path)), path)
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub(crate) fn post_form<T, F>(&self, path: &str, form: &F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        self.dispatch(self.http.post(self.url(path)).form(form), path)
    }

    /// POST an `application/json` body.
    pub(crate) fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(self.http.post(self.url(path)).json(body), path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sign and send a prepared request, then unwrap the envelope.
    ///
    /// The signing headers are applied here, after any body encoding, so
    /// callers cannot override the authorization.
    fn dispatch<T: DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
        path: &str,
    ) -> Result<T> {
        let response = request
            .header("Authorization", format!("{AUTH_SCHEME} {}", self.token))
            .header("Cache-Control", CACHE_CONTROL)
            .send()?;
        let status = response.status();
        let body = response.bytes()?;
        tracing::debug!(path, status = %status, bytes = body.len(), "api response");
        envelope::decode_data(&body)
    }
}
