use std::fmt;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Token signing settings.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 secret shared with every token verifier.
    pub secret: String,
    /// Token lifetime. `None` issues tokens without an `exp` claim.
    pub expiry_hours: Option<i64>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` selects the in-memory credential store.
    pub database_url: Option<String>,
    /// Allowed CORS origin.
    pub client_url: Option<String>,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Required | Default          |
    /// |----------------------|----------|------------------|
    /// | `APP_SECRET`         | **yes**  | --               |
    /// | `JWT_EXPIRY_HOURS`   | no       | unset (no `exp`) |
    /// | `DATABASE_URL`       | no       | in-memory store  |
    /// | `CLIENT_URL`         | no       | --               |
    /// | `BIND_ADDR`          | no       | `127.0.0.1:3000` |
    /// | `BCRYPT_COST`        | no       | `10`             |
    /// | `STORE_TIMEOUT_SECS` | no       | `5`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = non_empty("APP_SECRET").ok_or(ConfigError::Missing("APP_SECRET"))?;

        let expiry_hours = match non_empty("JWT_EXPIRY_HOURS") {
            Some(raw) => {
                let hours: i64 = parse_var("JWT_EXPIRY_HOURS", &raw)?;
                if hours <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "JWT_EXPIRY_HOURS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Some(hours)
            }
            None => None,
        };

        let bcrypt_cost = match non_empty("BCRYPT_COST") {
            Some(raw) => parse_var("BCRYPT_COST", &raw)?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                var: "BCRYPT_COST",
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        let store_timeout_secs = match non_empty("STORE_TIMEOUT_SECS") {
            Some(raw) => parse_var("STORE_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: non_empty("DATABASE_URL"),
            client_url: non_empty("CLIENT_URL"),
            jwt: JwtConfig {
                secret,
                expiry_hours,
            },
            bcrypt_cost,
            store_timeout: Duration::from_secs(store_timeout_secs),
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
