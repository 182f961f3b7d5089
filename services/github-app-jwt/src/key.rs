//! GitHub App Private Key Loading
//!
//! Reads the PEM file GitHub hands out when a private key is generated for an
//! App, and parses the PKCS#1 RSA key inside it.

use crate::types::AppJwtError;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// RSA private key of a GitHub App
pub struct AppPrivateKey {
    /// PKCS#1 DER bytes, as found inside the PEM block
    der: Vec<u8>,
    key: RsaPrivateKey,
}

impl AppPrivateKey {
    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Key used by `jsonwebtoken` to produce RS256 signatures
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_rsa_der(&self.der)
    }

    /// Key used by `jsonwebtoken` to check RS256 signatures made with this key
    pub fn decoding_key(&self) -> Result<DecodingKey, AppJwtError> {
        let public_der = RsaPublicKey::from(&self.key)
            .to_pkcs1_der()
            .map_err(|e| AppJwtError::Format(format!("error encoding public key: {e}")))?;

        Ok(DecodingKey::from_rsa_der(public_der.as_bytes()))
    }
}

impl fmt::Debug for AppPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppPrivateKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Load a PKCS#1 RSA private key from a PEM file
pub fn load_private_key(path: impl AsRef<Path>) -> Result<AppPrivateKey, AppJwtError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading private key");

    let data = fs::read(path).map_err(|source| AppJwtError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_private_key(&data)
}

/// Parse a PKCS#1 RSA private key from PEM-encoded bytes
///
/// Only the first PEM block is considered. Its label is not checked; the
/// payload must be PKCS#1 `RSAPrivateKey` DER, so PKCS#8 (`PRIVATE KEY`)
/// blocks are rejected.
pub fn parse_private_key(data: &[u8]) -> Result<AppPrivateKey, AppJwtError> {
    let block =
        pem::parse(data).map_err(|_| AppJwtError::Format("failed to parse PEM block".to_string()))?;

    let der = block.into_contents();
    let key = RsaPrivateKey::from_pkcs1_der(&der)
        .map_err(|e| AppJwtError::Format(format!("error parsing private key: {e}")))?;

    let key = AppPrivateKey { der, key };
    debug!(bits = key.bits(), "Parsed RSA private key");

    Ok(key)
}
