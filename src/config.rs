//! Provider configuration.
//!
//! The provider block takes the API address and, optionally, a username and
//! password. Each value falls back to an environment variable when the block
//! leaves it unset.
//!
//! ```text
//! provider "hashicups" {
//!   host     = "http://localhost:19090"
//!   username = "education"
//!   password = "test123"
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::client::Credentials;
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable consulted when `host` is unset.
pub const HOST_ENV: &str = "HASHICUPS_HOST";
/// Environment variable consulted when `username` is unset.
pub const USERNAME_ENV: &str = "HASHICUPS_USERNAME";
/// Environment variable consulted when `password` is unset.
pub const PASSWORD_ENV: &str = "HASHICUPS_PASSWORD";
/// Address used when neither the block nor the environment gives one.
pub const DEFAULT_HOST: &str = "http://localhost:19090";

/// The provider block, after environment fallback.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the cafe API.
    #[serde(default)]
    pub host: Option<String>,
    /// Account name for sign-in.
    #[serde(default)]
    pub username: Option<String>,
    /// Account password for sign-in.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Decode the provider block, filling gaps from the process environment.
    pub fn from_value(config: Value) -> Result<Self, ProviderError> {
        Self::from_value_with_env(config, |key| std::env::var(key).ok())
    }

    /// Decode the provider block, filling gaps from `env`.
    pub fn from_value_with_env<F>(config: Value, env: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut parsed: Self = match config {
            Value::Null => Self::default(),
            other => serde_json::from_value(other)
                .map_err(|e| ProviderError::Configuration(e.to_string()))?,
        };

        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());
        let blank = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
        if blank(&parsed.host) {
            parsed.host = lookup(HOST_ENV);
        }
        if blank(&parsed.username) {
            parsed.username = lookup(USERNAME_ENV);
        }
        if blank(&parsed.password) {
            parsed.password = lookup(PASSWORD_ENV);
        }
        Ok(parsed)
    }

    /// The base URL to use.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Sign-in credentials, if both halves are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        }
    }

    /// Check the configuration, returning one diagnostic per problem.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        match reqwest::Url::parse(self.host()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {},
            Ok(url) => diagnostics.push(
                Diagnostic::error("Invalid cafe API host")
                    .with_detail(format!(
                        "The host must use http or https, got scheme '{}'.",
                        url.scheme()
                    ))
                    .with_attribute("host"),
            ),
            Err(e) => diagnostics.push(
                Diagnostic::error("Invalid cafe API host")
                    .with_detail(format!("Could not parse '{}' as a URL: {}", self.host(), e))
                    .with_attribute("host"),
            ),
        }

        match (&self.username, &self.password) {
            (Some(_), None) => diagnostics.push(
                Diagnostic::error("Missing cafe API password")
                    .with_detail(format!(
                        "A username was given without a password. Set the password in the \
                         provider block or the {} environment variable.",
                        PASSWORD_ENV
                    ))
                    .with_attribute("password"),
            ),
            (None, Some(_)) => diagnostics.push(
                Diagnostic::error("Missing cafe API username")
                    .with_detail(format!(
                        "A password was given without a username. Set the username in the \
                         provider block or the {} environment variable.",
                        USERNAME_ENV
                    ))
                    .with_attribute("username"),
            ),
            _ => {},
        }

        diagnostics
    }
}

/// Schema of the provider block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_description("Interact with a HashiCups cafe API.")
        .with_attribute(
            "host",
            Attribute::optional_string().with_description(format!(
                "URI of the cafe API. May also be set with the {} environment variable.",
                HOST_ENV
            )),
        )
        .with_attribute(
            "username",
            Attribute::optional_string().with_description(format!(
                "Username for the cafe API. May also be set with the {} environment variable.",
                USERNAME_ENV
            )),
        )
        .with_attribute(
            "password",
            Attribute::optional_string()
                .sensitive()
                .with_description(format!(
                    "Password for the cafe API. May also be set with the {} environment variable.",
                    PASSWORD_ENV
                )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::has_errors;
    use serde_json::json;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_config_uses_default_host() {
        let config = ProviderConfig::from_value_with_env(Value::Null, env_of(&[])).unwrap();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert!(config.credentials().is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let config = ProviderConfig::from_value_with_env(
            json!({"host": "https://cafes.example.com", "username": "alice"}),
            env_of(&[
                (HOST_ENV, "http://ignored"),
                (USERNAME_ENV, "bob"),
                (PASSWORD_ENV, "secret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.host(), "https://cafes.example.com");
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn test_empty_strings_fall_back_to_env() {
        let config = ProviderConfig::from_value_with_env(
            json!({"host": ""}),
            env_of(&[(HOST_ENV, "http://env-host:8080")]),
        )
        .unwrap();
        assert_eq!(config.host(), "http://env-host:8080");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ProviderConfig::from_value_with_env(json!({"hostname": "x"}), env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_invalid_host() {
        let config = ProviderConfig {
            host: Some("not a url".to_string()),
            ..Default::default()
        };
        let diags = config.validate();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("host"));

        let config = ProviderConfig {
            host: Some("ftp://cafes.example.com".to_string()),
            ..Default::default()
        };
        assert!(has_errors(&config.validate()));
    }

    #[test]
    fn test_half_credentials() {
        let config = ProviderConfig {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        let diags = config.validate();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Missing cafe API password");

        let config = ProviderConfig {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate()[0].summary, "Missing cafe API username");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ProviderConfig {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_schema_marks_password_sensitive() {
        let schema = provider_config_schema();
        assert!(schema.attribute("password").unwrap().flags.sensitive);
        assert!(!schema.attribute("host").unwrap().flags.sensitive);
    }
}
