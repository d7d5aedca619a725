use crate::application_port::{AccessToken, AuthError, TokenCodec};
use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// HMAC secret for access tokens. Debug output is redacted.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub const MIN_LEN: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            return Err(AuthError::InternalError(format!(
                "signing key must be at least {} bytes",
                Self::MIN_LEN
            )));
        }
        Ok(SigningKey(bytes))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: SigningKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // public user id
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key.0);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key.0);

        // Validation::new pins the accepted algorithm list to HS256 only.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[cfg.audience.clone()]);
        validation.set_issuer(&[cfg.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        JwtHs256Codec {
            cfg,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    fn encode_at(
        &self,
        uid: UserId,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let exp_dt = chrono::Duration::from_std(self.cfg.access_ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::InternalError("token lifetime out of range".to_string()))?;
        let claims = AccessClaims {
            sub: uid.to_string(),
            exp: exp_dt.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((token, exp_dt))
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::TokenInvalidSignature
                }
                _ => AuthError::TokenMalformed,
            },
        )?;
        Ok(data.claims)
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.encode_at(user, Utc::now())?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &AccessToken) -> Result<UserId, AuthError> {
        let claims = self.decode_access(&token.0)?;
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenMalformed)
    }
}
