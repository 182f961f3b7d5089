//! GitHub App JWT Library
//!
//! Issues the short-lived RS256 JWT a GitHub App presents when it asks
//! GitHub's API for installation access tokens.
//!
//! ## Binaries
//!
//! - `app-jwt`: Sign an App JWT from an App ID and its private key file
//!
//! ## Example
//!
//! ```bash
//! # Print a JWT valid for 10 minutes
//! JWT=$(app-jwt --app-id $GITHUB_APP_ID --key-file /path/to/key.pem)
//!
//! # Exchange it for an installation token
//! curl -X POST \
//!   -H "Authorization: Bearer $JWT" \
//!   -H "Accept: application/vnd.github+json" \
//!   https://api.github.com/app/installations/$INSTALLATION_ID/access_tokens
//! ```
//!
//! ```ignore
//! use github_app_jwt::{generate_jwt, load_private_key};
//!
//! let key = load_private_key("key.pem")?;
//! let jwt = generate_jwt("123456", &key)?;
//! ```

pub mod auth;
pub mod key;
pub mod types;

pub use auth::{
    generate_jwt, issue_token, sign_claims, verify_jwt, GitHubAppClaims, SignedToken,
    TOKEN_LIFETIME_SECS,
};
pub use key::{load_private_key, parse_private_key, AppPrivateKey};
pub use types::{AppJwtError, TokenOutput};
