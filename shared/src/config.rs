use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Token signing and password hashing parameters handed to the auth services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    pub secret: String,
    /// Validity window of an issued token
    pub expires_in: Duration,
    /// bcrypt cost factor
    pub salt_rounds: u32,
}

impl AuthConfig {
    pub const DEFAULT_SECRET: &str = "secretKey";
    pub const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(3600);
    pub const DEFAULT_SALT_ROUNDS: u32 = 10;
    pub const MIN_SALT_ROUNDS: u32 = 4;
    pub const MAX_SALT_ROUNDS: u32 = 31;

    pub fn new(secret: impl Into<String>, expires_in: Duration, salt_rounds: u32) -> Result<Self> {
        Ok(Self {
            secret: secret.into(),
            expires_in,
            salt_rounds: validate_salt_rounds(salt_rounds)?,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == Self::DEFAULT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: Self::DEFAULT_SECRET.to_string(),
            expires_in: Self::DEFAULT_EXPIRES_IN,
            salt_rounds: Self::DEFAULT_SALT_ROUNDS,
        }
    }
}

/// Administrator account created at startup when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub auth: AuthConfig,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_ADMIN_USERNAME: &str = "admin";
    const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_port = parse_var("KEYSTONE_HTTP_PORT", lookup("KEYSTONE_HTTP_PORT"))
            .unwrap_or(Self::DEFAULT_HTTP_PORT);

        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, signing tokens with the default secret");
            warn!("⚠️  WARNING: Set JWT_SECRET before exposing this server!");
            AuthConfig::DEFAULT_SECRET.to_string()
        });

        let expires_in = match lookup("JWT_EXPIRES_IN") {
            Some(raw) => parse_duration(&raw).unwrap_or_else(|e| {
                warn!("{}, falling back to 1h", e);
                AuthConfig::DEFAULT_EXPIRES_IN
            }),
            None => AuthConfig::DEFAULT_EXPIRES_IN,
        };

        let salt_rounds = parse_var("BCRYPT_SALT_ROUNDS", lookup("BCRYPT_SALT_ROUNDS"))
            .map(|rounds| {
                validate_salt_rounds(rounds).unwrap_or_else(|e| {
                    warn!("{}, falling back to {}", e, AuthConfig::DEFAULT_SALT_ROUNDS);
                    AuthConfig::DEFAULT_SALT_ROUNDS
                })
            })
            .unwrap_or(AuthConfig::DEFAULT_SALT_ROUNDS);

        let admin = lookup("KEYSTONE_ADMIN_PASSWORD").map(|password| AdminBootstrap {
            username: lookup("KEYSTONE_ADMIN_USERNAME")
                .unwrap_or_else(|| Self::DEFAULT_ADMIN_USERNAME.to_string()),
            email: lookup("KEYSTONE_ADMIN_EMAIL")
                .unwrap_or_else(|| Self::DEFAULT_ADMIN_EMAIL.to_string()),
            password,
        });

        Self {
            host: lookup("KEYSTONE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port,
            data_dir: lookup("KEYSTONE_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            auth: AuthConfig {
                secret,
                expires_in,
                salt_rounds,
            },
            admin,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

/// Parse a numeric variable, warning when it is set but unreadable
fn parse_var<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number, using the default", key, raw);
            None
        }
    }
}

fn validate_salt_rounds(rounds: u32) -> Result<u32> {
    if (AuthConfig::MIN_SALT_ROUNDS..=AuthConfig::MAX_SALT_ROUNDS).contains(&rounds) {
        Ok(rounds)
    } else {
        Err(Error::InvalidCost(rounds))
    }
}

/// Parse a token lifetime such as `"1h"`, `"30m"`, `"7d"` or `"3600"`.
///
/// A bare number is read as seconds. Supported units: `ms`, `s`, `m`, `h`, `d`, `w`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let value = raw.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);

    let amount: u64 = amount
        .parse()
        .map_err(|_| Error::InvalidDuration(raw.to_string()))?;

    let seconds_per_unit = match unit.trim() {
        "ms" => return Ok(Duration::from_millis(amount)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(Error::InvalidDuration(raw.to_string())),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::InvalidDuration(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));

        // Bare numbers are seconds
        assert_eq!(parse_duration("3600").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("10 years").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.auth, AuthConfig::default());
        assert!(config.auth.uses_default_secret());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_auth_values_from_env() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cr3t"),
            ("JWT_EXPIRES_IN", "15m"),
            ("BCRYPT_SALT_ROUNDS", "12"),
        ]);

        assert_eq!(config.auth.secret, "s3cr3t");
        assert_eq!(config.auth.expires_in, Duration::from_secs(900));
        assert_eq!(config.auth.salt_rounds, 12);
        assert!(!config.auth.uses_default_secret());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("JWT_EXPIRES_IN", "soon"),
            ("BCRYPT_SALT_ROUNDS", "99"),
            ("KEYSTONE_HTTP_PORT", "not-a-port"),
        ]);

        assert_eq!(config.auth.expires_in, AuthConfig::DEFAULT_EXPIRES_IN);
        assert_eq!(config.auth.salt_rounds, AuthConfig::DEFAULT_SALT_ROUNDS);
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<u16>("KEYSTONE_HTTP_PORT", Some("9000".to_string())), Some(9000));
        assert_eq!(parse_var::<u16>("KEYSTONE_HTTP_PORT", Some(" 9000 ".to_string())), Some(9000));
        assert_eq!(parse_var::<u16>("KEYSTONE_HTTP_PORT", Some("not-a-port".to_string())), None);
        assert_eq!(parse_var::<u16>("KEYSTONE_HTTP_PORT", Some("70000".to_string())), None);
        assert_eq!(parse_var::<u32>("BCRYPT_SALT_ROUNDS", Some("ten".to_string())), None);
        assert_eq!(parse_var::<u32>("BCRYPT_SALT_ROUNDS", None), None);
    }

    #[test]
    fn test_admin_bootstrap_requires_password() {
        let config = config_from(&[("KEYSTONE_ADMIN_USERNAME", "root")]);
        assert!(config.admin.is_none());

        let config = config_from(&[
            ("KEYSTONE_ADMIN_USERNAME", "root"),
            ("KEYSTONE_ADMIN_PASSWORD", "changeme1"),
        ]);
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "admin@localhost");
        assert_eq!(admin.password, "changeme1");
    }

    #[test]
    fn test_auth_config_rejects_bad_cost() {
        assert_eq!(
            AuthConfig::new("k", Duration::from_secs(60), 3),
            Err(Error::InvalidCost(3))
        );
        assert!(AuthConfig::new("k", Duration::from_secs(60), 4).is_ok());
    }
}
