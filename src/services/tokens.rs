//! Signed, time-limited access and refresh tokens bound to a username.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Why a token was rejected. Only ever logged; callers see a generic 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("signature or structure is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token is of the wrong kind")]
    WrongKind,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    pub fn issue_access_token(&self, identity: &str) -> Result<String, AppError> {
        self.issue_at(identity, TokenKind::Access, Utc::now())
    }

    pub fn issue_refresh_token(&self, identity: &str) -> Result<String, AppError> {
        self.issue_at(identity, TokenKind::Refresh, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or(AppError::Internal("token expiry out of range"))?
            .timestamp();

        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp: expiration,
            kind,
        };

        tracing::debug!("Issuing {:?} token for {}", kind, identity);
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Returns the identity bound to `token` if it is authentic, unexpired,
    /// and of the requested kind.
    pub fn verify(&self, token: &str, require_refresh: bool) -> Result<String, TokenError> {
        self.verify_at(token, require_refresh, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        require_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        // Expiry is checked below against `now` with zero leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let expected = if require_refresh {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        };
        if claims.kind != expected {
            return Err(TokenError::WrongKind);
        }

        Ok(claims.sub)
    }

    /// Mints a fresh access token from a valid refresh token.
    ///
    /// `POST /auth/refresh` performs the same two steps split across
    /// `require_refresh_token` (verify) and its handler (issue).
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let identity = self.verify(refresh_token, true)?;
        self.issue_access_token(&identity)
    }
}
