use crate::error::{ReferralError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub smtp: SmtpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Request body limit for the send endpoint (attachment included)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
}

/// Outbound relay settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Sender address; falls back to `user`
    pub from: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_smtp_port() -> u16 {
    587
}

impl SmtpConfig {
    /// Address used in the `From` header
    pub fn sender(&self) -> Option<&str> {
        self.from
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.user.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn has_credentials(&self) -> bool {
        matches!(
            (self.user.as_deref(), self.password.as_deref()),
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty()
        )
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ReferralError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ReferralError::Config(e.to_string()))
    }

    /// Overlay the process environment on top of this configuration
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables resolved by `lookup` (`SMTP_HOST`, `SMTP_PORT`,
    /// `SMTP_SECURE`, `SMTP_USER`, `SMTP_PASSWORD`, `SMTP_FROM`,
    /// `DATABASE_URL`, `LISTEN_ADDR`)
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = lookup("SMTP_PORT") {
            self.smtp.port = port
                .trim()
                .parse()
                .map_err(|_| ReferralError::Config(format!("Invalid SMTP_PORT: {}", port)))?;
        }
        if let Some(secure) = lookup("SMTP_SECURE") {
            self.smtp.secure = secure.trim().eq_ignore_ascii_case("true");
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.smtp.user = Some(user);
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.smtp.password = Some(password);
        }
        if let Some(from) = lookup("SMTP_FROM") {
            self.smtp.from = Some(from);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database_url = url;
        }
        if let Some(addr) = lookup("LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:3000".to_string(),
                max_upload_bytes: default_max_upload_bytes(),
            },
            storage: StorageConfig {
                database_url: "sqlite://referral.db".to_string(),
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: default_smtp_port(),
                secure: false,
                user: None,
                password: None,
                from: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.smtp.port, 587);
        assert!(!config.smtp.secure);
        assert!(!config.smtp.has_credentials());
        assert_eq!(config.smtp.sender(), None);
    }

    #[test]
    fn test_env_overrides_smtp_settings() {
        let vars = HashMap::from([
            ("SMTP_HOST", "relay.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_SECURE", "true"),
            ("SMTP_USER", "me@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
        ]);

        let config = Config::default().apply_env_from(lookup_in(&vars)).unwrap();

        assert_eq!(config.smtp.host, "relay.example.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.secure);
        assert!(config.smtp.has_credentials());
        assert_eq!(config.smtp.sender(), Some("me@example.com"));
    }

    #[test]
    fn test_secure_only_for_true() {
        let vars = HashMap::from([("SMTP_SECURE", "yes")]);
        let config = Config::default().apply_env_from(lookup_in(&vars)).unwrap();
        assert!(!config.smtp.secure);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let vars = HashMap::from([("SMTP_PORT", "submission")]);
        let result = Config::default().apply_env_from(lookup_in(&vars));
        assert!(matches!(result, Err(ReferralError::Config(_))));
    }

    #[test]
    fn test_from_overrides_user_as_sender() {
        let vars = HashMap::from([
            ("SMTP_USER", "login@example.com"),
            ("SMTP_FROM", "Referrals <referrals@example.com>"),
        ]);
        let config = Config::default().apply_env_from(lookup_in(&vars)).unwrap();
        assert_eq!(config.smtp.sender(), Some("Referrals <referrals@example.com>"));
    }

    #[test]
    fn test_empty_from_falls_back_to_user() {
        let vars = HashMap::from([
            ("SMTP_USER", "login@example.com"),
            ("SMTP_PASSWORD", "pw"),
            ("SMTP_FROM", ""),
        ]);
        let config = Config::default().apply_env_from(lookup_in(&vars)).unwrap();
        assert_eq!(config.smtp.sender(), Some("login@example.com"));
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen_addr = "127.0.0.1:8080"

            [storage]
            database_url = "sqlite::memory:"

            [smtp]
            host = "localhost"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.logging.format, "json");
    }
}
