//! Types shared by the key loader, the token signer and the `app-jwt` binary

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::auth::SignedToken;

/// Errors that can occur while issuing a GitHub App JWT
#[derive(Debug, Error)]
pub enum AppJwtError {
    /// The private key file could not be read
    #[error("error reading private key {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file is not a PEM-wrapped PKCS#1 RSA private key
    #[error("{0}")]
    Format(String),

    /// The signing backend rejected the key or the claims
    #[error("error signing JWT: {0}")]
    Signing(String),

    /// The token did not verify against the key's public half
    #[error("error verifying JWT: {0}")]
    Verification(String),

    /// Required arguments were missing or empty
    #[error("{0}")]
    Usage(String),
}

impl From<jsonwebtoken::errors::Error> for AppJwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppJwtError::Signing(err.to_string())
    }
}

/// JSON document printed by `app-jwt --format json`
#[derive(Debug, Clone, Serialize)]
pub struct TokenOutput {
    /// The signed JWT
    pub token: String,
    /// GitHub App ID the token was issued for
    pub app_id: String,
    /// Issue time, RFC 3339
    pub issued_at: String,
    /// Expiry time, RFC 3339
    pub expires_at: String,
}

impl From<&SignedToken> for TokenOutput {
    fn from(signed: &SignedToken) -> Self {
        Self {
            token: signed.token.clone(),
            app_id: signed.claims.iss.clone(),
            issued_at: rfc3339(signed.claims.iat),
            expires_at: rfc3339(signed.claims.exp),
        }
    }
}

/// Format Unix seconds as RFC 3339, falling back to the raw number when out of range
pub fn rfc3339(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| secs.to_string())
}
