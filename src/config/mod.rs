//! Configuration module for the signup backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SIGNUP_BIND_ADDR format: {0}")]
    BindAddr(#[from] std::net::AddrParseError),
    #[error("Invalid boolean for {name}: {value:?}")]
    Bool { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the administrative views (open when unset)
    pub admin_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Whether BOS numbers must be unique across members
    pub unique_bos: bool,
    /// Suffix pre-filled into the email field of a blank signup form
    pub email_domain: String,
    /// Club name used in the welcome message
    pub club_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let admin_psk = env::var("SIGNUP_ADMIN_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("SIGNUP_DB_PATH")
            .unwrap_or_else(|_| "./data/signup.sqlite".to_string())
            .into();

        let bind_addr = env::var("SIGNUP_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("SIGNUP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("SIGNUP_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let unique_bos = match env::var("SIGNUP_UNIQUE_BOS") {
            Ok(value) => parse_bool("SIGNUP_UNIQUE_BOS", &value)?,
            Err(_) => true,
        };

        let email_domain =
            env::var("SIGNUP_EMAIL_DOMAIN").unwrap_or_else(|_| "@aber.ac.uk".to_string());

        let club_name = env::var("SIGNUP_CLUB_NAME").unwrap_or_else(|_| "AberLAG".to_string());

        Ok(Self {
            admin_psk,
            db_path,
            bind_addr,
            log_level,
            log_format,
            unique_bos,
            email_domain,
            club_name,
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Bool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("SIGNUP_ADMIN_PSK");
        env::remove_var("SIGNUP_DB_PATH");
        env::remove_var("SIGNUP_BIND_ADDR");
        env::remove_var("SIGNUP_LOG_LEVEL");
        env::remove_var("SIGNUP_LOG_FORMAT");
        env::remove_var("SIGNUP_UNIQUE_BOS");
        env::remove_var("SIGNUP_EMAIL_DOMAIN");
        env::remove_var("SIGNUP_CLUB_NAME");

        let config = Config::from_env().unwrap();

        assert!(config.admin_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/signup.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.unique_bos);
        assert_eq!(config.email_domain, "@aber.ac.uk");
        assert_eq!(config.club_name, "AberLAG");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", " on ").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(matches!(
            parse_bool("X", "maybe"),
            Err(ConfigError::Bool { name: "X", .. })
        ));
    }
}
