//! HS256 bearer token adapter.
//!
//! Tokens are compact JWS strings (`header.claims.signature`, base64url
//! without padding) signed with HMAC-SHA256. Claims carry the user id, the
//! issue time and the expiry as Unix seconds.

mod config;

pub use config::{
    BuildMode, DEFAULT_TTL, SECRET_MIN_LEN, TokenConfigError, TokenSettings,
    token_settings_from_env,
};

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::TimeDelta;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::UserId;
use crate::domain::ports::{IssuedToken, TokenError, TokenService};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: String,
    iat: i64,
    exp: i64,
}

/// [`TokenService`] signing tokens with a shared HMAC secret.
pub struct Hs256TokenService {
    secret: Zeroizing<Vec<u8>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Hs256TokenService {
    /// Create a service signing with `settings.secret` and reading expiry
    /// times from `clock`.
    pub fn new(settings: TokenSettings, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let TokenSettings { secret, ttl } = settings;
        Self {
            secret,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| TokenError::signing(format!("invalid signing key: {err}")))
    }

    fn sign(&self, signing_input: &str) -> Result<String, TokenError> {
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
        let json = serde_json::to_vec(value)
            .map_err(|err| TokenError::signing(format!("failed to encode token: {err}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode_segment<T: for<'de> Deserialize<'de>>(
        segment: &str,
        label: &str,
    ) -> Result<T, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| TokenError::malformed(format!("{label} is not base64url")))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| TokenError::malformed(format!("{label} is not valid JSON")))
    }
}

impl TokenService for Hs256TokenService {
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::signing("token expiry out of range"))?;
        let header = Self::encode_segment(&Header {
            alg: ALGORITHM.to_owned(),
            typ: "JWT".to_owned(),
        })?;
        let claims = Self::encode_segment(&Claims {
            user_id: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })?;
        let signing_input = format!("{header}.{claims}");
        let signature = self.sign(&signing_input)?;
        Ok(IssuedToken {
            token: format!("{signing_input}.{signature}"),
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::malformed("expected three segments"));
        };

        let parsed_header: Header = Self::decode_segment(header, "header")?;
        if parsed_header.alg != ALGORITHM {
            return Err(TokenError::malformed(format!(
                "unsupported algorithm {}",
                parsed_header.alg
            )));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::malformed("signature is not base64url"))?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::bad_signature())?;

        let claims: Claims = Self::decode_segment(claims, "claims")?;
        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::expired());
        }
        UserId::new(&claims.user_id).map_err(|err| TokenError::malformed(err.to_string()))
    }
}
