//! Environment-based configuration for mailferry.
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the binary before this crate runs). Required variables are checked
//! together so a misconfigured deployment reports every missing name at
//! once instead of failing one variable at a time.

use {
    secrecy::Secret,
    thiserror::Error,
};

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", names.join(", "))]
    Missing { names: Vec<&'static str> },

    #[error("invalid value {value:?} for {name}: expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Process-wide configuration, built once at startup and passed by
/// reference afterwards.
#[derive(Clone)]
pub struct Config {
    /// Bot token from @BotFather (`TELEGRAM_BOT_TOKEN`).
    pub telegram_token: Secret<String>,
    pub smtp: SmtpConfig,
}

/// Mail transport settings.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server host (`SMTP_SERVER`, default `smtp.gmail.com`).
    pub server: String,
    /// SMTP server port (`SMTP_PORT`, default 587 / STARTTLS).
    pub port: u16,
    /// Sender address, also the SMTP username (`EMAIL_FROM`).
    pub from: String,
    /// Sender credential (`EMAIL_PASSWORD`).
    pub password: Secret<String>,
    /// Fixed recipient address (`EMAIL_TO`).
    pub to: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"[REDACTED]")
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("password", &"[REDACTED]")
            .field("to", &self.to)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails before any network activity when a required variable is
    /// missing or `SMTP_PORT` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let telegram_token = require(&lookup, "TELEGRAM_BOT_TOKEN", &mut missing);
        let from = require(&lookup, "EMAIL_FROM", &mut missing);
        let password = require(&lookup, "EMAIL_PASSWORD", &mut missing);
        let to = require(&lookup, "EMAIL_TO", &mut missing);
        if !missing.is_empty() {
            return Err(ConfigError::Missing { names: missing });
        }

        let server = lookup("SMTP_SERVER")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string());
        let port = match lookup("SMTP_PORT").filter(|v| !v.is_empty()) {
            Some(raw) => match raw.parse() {
                Ok(port) => port,
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: "SMTP_PORT",
                        value: raw,
                        expected: "a TCP port number",
                    });
                },
            },
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            telegram_token: Secret::new(telegram_token),
            smtp: SmtpConfig {
                server,
                port,
                from,
                password: Secret::new(password),
                to,
            },
        })
    }
}

/// Empty values count as missing: an `EMAIL_TO=` line in a `.env` file is a
/// misconfiguration, not an address.
fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match lookup(name).filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => {
            missing.push(name);
            String::new()
        },
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::collections::HashMap};

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("TELEGRAM_BOT_TOKEN", "123:ABC"),
        ("EMAIL_FROM", "bot@example.com"),
        ("EMAIL_PASSWORD", "hunter2"),
        ("EMAIL_TO", "inbox@example.com"),
    ];

    #[test]
    fn minimal_config_applies_smtp_defaults() {
        let config = load(&env(&REQUIRED)).unwrap();
        assert_eq!(config.telegram_token.expose_secret(), "123:ABC");
        assert_eq!(config.smtp.server, DEFAULT_SMTP_SERVER);
        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(config.smtp.from, "bot@example.com");
        assert_eq!(config.smtp.to, "inbox@example.com");
    }

    #[test]
    fn explicit_smtp_settings_override_defaults() {
        let mut vars = env(&REQUIRED);
        vars.insert("SMTP_SERVER".into(), "mail.example.com".into());
        vars.insert("SMTP_PORT".into(), "2525".into());
        let config = load(&vars).unwrap();
        assert_eq!(config.smtp.server, "mail.example.com");
        assert_eq!(config.smtp.port, 2525);
    }

    #[test]
    fn all_missing_variables_are_reported_together() {
        let err = load(&env(&[("EMAIL_FROM", "bot@example.com")])).unwrap_err();
        let ConfigError::Missing { names } = err else {
            panic!("expected Missing, got {err}");
        };
        assert_eq!(names, vec![
            "TELEGRAM_BOT_TOKEN",
            "EMAIL_PASSWORD",
            "EMAIL_TO"
        ]);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = env(&REQUIRED);
        vars.insert("EMAIL_TO".into(), String::new());
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { names } if names == vec!["EMAIL_TO"]));
    }

    #[test]
    fn unparseable_port_is_rejected() {
        let mut vars = env(&REQUIRED);
        vars.insert("SMTP_PORT".into(), "not-a-port".into());
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid {
            name: "SMTP_PORT",
            ..
        }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&env(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("123:ABC"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
