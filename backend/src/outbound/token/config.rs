//! Token signing configuration.
//!
//! Reads the signing secret and lifetime from the environment through
//! [`mockable::Env`] so the rules can be exercised without touching the
//! process environment.

use std::path::PathBuf;
use std::time::Duration;

use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

pub(crate) const SECRET_FILE_ENV: &str = "TOKEN_SECRET_FILE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
pub(crate) const TTL_SECONDS_ENV: &str = "TOKEN_TTL_SECONDS";
const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/token_secret";
/// Minimum secret length accepted in release builds.
pub const SECRET_MIN_LEN: usize = 32;
/// Default token lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const TTL_EXPECTED: &str = "a positive number of seconds";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid toggles and a real secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use savings_backend::outbound::token::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token settings.
pub struct TokenSettings {
    /// HMAC signing secret.
    pub secret: Zeroizing<Vec<u8>>,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret file is too short for release builds.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds must not allow ephemeral secrets.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use savings_backend::outbound::token::{token_settings_from_env, BuildMode};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let secret_path = std::env::temp_dir().join("token_secret_example");
/// std::fs::write(&secret_path, vec![b'a'; 32])?;
///
/// let secret_path = secret_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_SECRET_FILE" => Some(secret_path.clone()),
///     "TOKEN_ALLOW_EPHEMERAL" => Some("0".to_string()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert_eq!(settings.ttl.as_secs(), 3600);
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let ttl = ttl_from_env(env, mode)?;
    let secret = secret_from_env(env, mode, allow_ephemeral)?;
    Ok(TokenSettings { secret, ttl })
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    match env.string(ALLOW_EPHEMERAL_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(true) => debug_warn_or_error(mode, true, TokenConfigError::EphemeralNotAllowed, || {}),
            Some(false) => Ok(false),
            None => {
                let error = TokenConfigError::InvalidEnv {
                    name: ALLOW_EPHEMERAL_ENV,
                    value: value.clone(),
                    expected: BOOL_EXPECTED,
                };
                debug_warn_or_error(mode, false, error, || {
                    warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to disabled");
                })
            }
        },
        None => debug_warn_or_error(
            mode,
            false,
            TokenConfigError::MissingEnv {
                name: ALLOW_EPHEMERAL_ENV,
            },
            || warn!("TOKEN_ALLOW_EPHEMERAL not set; defaulting to disabled"),
        ),
    }
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, TokenConfigError> {
    let Some(value) = env.string(TTL_SECONDS_ENV) else {
        return Ok(DEFAULT_TTL);
    };
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => {
            let error = TokenConfigError::InvalidEnv {
                name: TTL_SECONDS_ENV,
                value: value.clone(),
                expected: TTL_EXPECTED,
            };
            debug_warn_or_error(mode, DEFAULT_TTL, error, || {
                warn!(value = %value, "invalid TOKEN_TTL_SECONDS; using default");
            })
        }
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_string()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SECRET_MIN_LEN {
                bytes.zeroize();
                return Err(TokenConfigError::SecretTooShort {
                    path,
                    length,
                    min_len: SECRET_MIN_LEN,
                });
            }
            Ok(Zeroizing::new(bytes))
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token secret (dev only); tokens will not survive restarts"
            );
            Ok(ephemeral_secret())
        }
        Err(error) => Err(TokenConfigError::SecretRead {
            path,
            source: error,
        }),
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0_u8; SECRET_MIN_LEN]);
    OsRng.fill_bytes(secret.as_mut_slice());
    secret
}

fn debug_warn_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: TokenConfigError,
    warn_fn: F,
) -> Result<T, TokenConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
