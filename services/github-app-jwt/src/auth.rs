//! GitHub App Authentication
//!
//! Signs the short-lived RS256 JWT used to authenticate as a GitHub App.

use crate::key::AppPrivateKey;
use crate::types::AppJwtError;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Lifetime of an App JWT; GitHub accepts at most ten minutes
pub const TOKEN_LIFETIME_SECS: u64 = 600;

/// JWT claims for GitHub App authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubAppClaims {
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issuer (GitHub App ID)
    pub iss: String,
}

impl GitHubAppClaims {
    /// Claims for a token issued at `now`
    pub fn issued_at(app_id: impl Into<String>, now: u64) -> Self {
        Self {
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
            iss: app_id.into(),
        }
    }
}

/// A signed JWT together with the claims it carries
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// Compact serialization: `header.payload.signature`
    pub token: String,
    pub claims: GitHubAppClaims,
}

/// Generate a JWT for GitHub App authentication
///
/// # Arguments
/// * `app_id` - The GitHub App ID, used verbatim as the issuer
/// * `key` - The App's private key
///
/// # Returns
/// A JWT string valid for 10 minutes
pub fn generate_jwt(app_id: &str, key: &AppPrivateKey) -> Result<String, AppJwtError> {
    issue_token(app_id, key).map(|signed| signed.token)
}

/// Generate a JWT for GitHub App authentication, keeping its claims
pub fn issue_token(app_id: &str, key: &AppPrivateKey) -> Result<SignedToken, AppJwtError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppJwtError::Signing(format!("system clock is before the Unix epoch: {e}")))?
        .as_secs();

    let claims = GitHubAppClaims::issued_at(app_id, now);
    let token = sign_claims(&claims, key)?;

    Ok(SignedToken { token, claims })
}

/// Sign claims with RS256
pub fn sign_claims(claims: &GitHubAppClaims, key: &AppPrivateKey) -> Result<String, AppJwtError> {
    debug!(iss = %claims.iss, iat = claims.iat, exp = claims.exp, "Signing JWT");

    let header = Header::new(Algorithm::RS256);
    let token = encode(&header, claims, &key.encoding_key())?;

    Ok(token)
}

/// Verify an RS256 JWT against the public half of `key`
///
/// Expiry is checked with `jsonwebtoken`'s default leeway.
pub fn verify_jwt(token: &str, key: &AppPrivateKey) -> Result<GitHubAppClaims, AppJwtError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_required_spec_claims(&["exp", "iat", "iss"]);

    let data = decode::<GitHubAppClaims>(token, &key.decoding_key()?, &validation)
        .map_err(|e| AppJwtError::Verification(e.to_string()))?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::parse_private_key;
    use crate::key::tests::{APP_KEY, SMALL_KEY};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn app_key() -> AppPrivateKey {
        parse_private_key(APP_KEY.as_bytes()).unwrap()
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_claims_expire_after_ten_minutes() {
        let claims = GitHubAppClaims::issued_at("12345", 1_700_000_000);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, claims.iat + 600);
        assert_eq!(claims.iss, "12345");
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = generate_jwt("12345", &app_key()).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        assert_eq!(segments.len(), 3);
        for segment in segments {
            assert!(!segment.is_empty());
            assert!(URL_SAFE_NO_PAD.decode(segment).is_ok());
        }
    }

    #[test]
    fn test_header_and_payload() {
        let signed = issue_token("12345", &app_key()).unwrap();
        let segments: Vec<&str> = signed.token.split('.').collect();

        let header = decode_segment(segments[0]);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["typ"], "JWT");

        let payload = decode_segment(segments[1]);
        let object = payload.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(payload["iss"], "12345");
        assert_eq!(payload["iat"], signed.claims.iat);
        assert_eq!(
            payload["exp"].as_u64().unwrap(),
            payload["iat"].as_u64().unwrap() + 600
        );
    }

    #[test]
    fn test_issued_at_is_now() {
        let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let signed = issue_token("12345", &app_key()).unwrap();
        let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

        assert!(signed.claims.iat >= before && signed.claims.iat <= after);
    }

    #[test]
    fn test_payload_is_compact_json_in_claim_order() {
        let claims = GitHubAppClaims::issued_at("12345", 1_700_000_000);
        let token = sign_claims(&claims, &app_key()).unwrap();
        let payload = token.split('.').nth(1).unwrap();

        assert_eq!(
            URL_SAFE_NO_PAD.decode(payload).unwrap(),
            br#"{"iat":1700000000,"exp":1700000600,"iss":"12345"}"#
        );
    }

    #[test]
    fn test_non_numeric_app_id_is_signed_verbatim() {
        let key = app_key();
        let token = generate_jwt("my-app", &key).unwrap();
        let claims = verify_jwt(&token, &key).unwrap();
        assert_eq!(claims.iss, "my-app");
    }

    #[test]
    fn test_signature_verifies() {
        let key = app_key();
        let signed = issue_token("12345", &key).unwrap();

        let claims = verify_jwt(&signed.token, &key).unwrap();
        assert_eq!(claims, signed.claims);
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let key = app_key();
        let claims = GitHubAppClaims::issued_at("12345", 1_700_000_000);

        assert_eq!(
            sign_claims(&claims, &key).unwrap(),
            sign_claims(&claims, &key).unwrap()
        );
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let key = app_key();
        let token = generate_jwt("12345", &key).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&GitHubAppClaims::issued_at("99999", u64::MAX / 2)).unwrap(),
        );
        let tampered = format!("{}.{}.{}", segments[0], forged, segments[2]);

        let err = verify_jwt(&tampered, &key).unwrap_err();
        assert!(matches!(err, AppJwtError::Verification(_)));
    }

    #[test]
    fn test_small_key_fails_to_sign() {
        let key = parse_private_key(SMALL_KEY.as_bytes()).unwrap();
        let err = generate_jwt("12345", &key).unwrap_err();
        assert!(matches!(err, AppJwtError::Signing(_)));
    }
}
