//! Process configuration read from environment variables.

use std::time::Duration;

use bridgecms_infra::SmtpSettings;
use thiserror::Error;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {key}: '{value}' ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub enabled: bool,
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub app_env: String,
    pub use_persistent_stores: bool,
    pub database_url: String,
    pub jwt_secret: String,
    /// Allowed CORS origin.
    pub frontend_url: String,
    pub smtp: SmtpConfig,
    /// Recipient of new-contact alerts.
    pub admin_email: String,
    pub rate_limit: RateLimitConfig,
    pub seed: SeedConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let string = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            port: parse(get("PORT"), "PORT", 5000)?,
            app_env: string("APP_ENV", "development"),
            use_persistent_stores: flag(get("USE_PERSISTENT_STORES"), "USE_PERSISTENT_STORES", false)?,
            database_url: string("DATABASE_URL", "postgres://localhost:5432/bridgecms"),
            jwt_secret: string("JWT_SECRET", DEV_JWT_SECRET),
            frontend_url: string("FRONTEND_URL", "http://localhost:3000"),
            smtp: SmtpConfig {
                host: string("SMTP_HOST", "smtp.gmail.com"),
                port: parse(get("SMTP_PORT"), "SMTP_PORT", 587)?,
                user: get("SMTP_USER"),
                pass: get("SMTP_PASS"),
                from: string("SMTP_FROM", "noreply@bridgeaitech.com"),
            },
            admin_email: string("ADMIN_EMAIL", "hello@bridgeaitech.com"),
            rate_limit: RateLimitConfig {
                max_requests: parse(get("RATE_LIMIT_MAX"), "RATE_LIMIT_MAX", 100)?,
                window: Duration::from_secs(parse(get("RATE_LIMIT_WINDOW_SECS"), "RATE_LIMIT_WINDOW_SECS", 900)?),
            },
            seed: SeedConfig {
                enabled: flag(get("SEED_DEMO_DATA"), "SEED_DEMO_DATA", false)?,
                admin_email: string("SEED_ADMIN_EMAIL", "admin@bridgeaitech.com"),
                admin_password: string("SEED_ADMIN_PASSWORD", "admin123"),
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// SMTP settings, if credentials are configured.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let (user, pass) = (self.smtp.user.clone()?, self.smtp.pass.clone()?);
        Some(SmtpSettings {
            host: self.smtp.host.clone(),
            port: self.smtp.port,
            username: user,
            password: pass,
            from: self.smtp.from.clone(),
        })
    }
}

fn parse<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value: raw,
        }),
    }
}

fn flag(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value: raw,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert!(cfg.is_development());
        assert!(!cfg.use_persistent_stores);
        assert!(cfg.uses_default_jwt_secret());
        assert_eq!(cfg.smtp.host, "smtp.gmail.com");
        assert_eq!(cfg.smtp.port, 587);
        assert_eq!(cfg.admin_email, "hello@bridgeaitech.com");
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window, Duration::from_secs(900));
        assert!(!cfg.seed.enabled);
        assert_eq!(cfg.smtp_settings(), None);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "secret"),
            ("SEED_DEMO_DATA", "true"),
            ("RATE_LIMIT_MAX", "5"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.is_development());
        assert!(cfg.seed.enabled);
        assert_eq!(cfg.rate_limit.max_requests, 5);
        assert_eq!(cfg.smtp_settings().unwrap().username, "mailer");
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.key, "PORT");

        let err = config(&[("SEED_DEMO_DATA", "maybe")]).unwrap_err();
        assert_eq!(err.key, "SEED_DEMO_DATA");
    }

    #[test]
    fn blank_values_use_defaults() {
        let cfg = config(&[("JWT_SECRET", "  "), ("PORT", "")]).unwrap();
        assert!(cfg.uses_default_jwt_secret());
        assert_eq!(cfg.port, 5000);
    }
}
