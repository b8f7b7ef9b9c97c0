//! Client configuration.
//!
//! [`ClientConfig`] deserializes from TOML. The API key itself never appears in
//! the file; the file names the environment variable that holds it.
//!
//! ```toml
//! api_url = "https://api.devpayments.com/v1"
//! raise_errors = true
//! api_key_env = "DEVPAY_API_KEY"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! http_version = "auto"
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::{
    error::{DevPayError, Result},
    transport::{HttpConfig, http::validate_url},
};

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.devpayments.com/v1";

/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "DEVPAY_API_KEY";

/// Root client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API endpoint that every operation is posted to.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Return server-reported errors as `Err` (true) or inside the response (false).
    #[serde(default = "default_raise_errors")]
    pub raise_errors: bool,

    /// Environment variable containing the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            raise_errors: default_raise_errors(),
            api_key_env: default_api_key_env(),
            http: HttpConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::Config`] if parsing or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use devpay::ClientConfig;
    ///
    /// let config = ClientConfig::from_toml("raise_errors = false").unwrap();
    /// assert!(!config.raise_errors);
    /// assert_eq!(config.api_url, "https://api.devpayments.com/v1");
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| DevPayError::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::Config`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DevPayError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - `api_url` parses and uses HTTPS (plain HTTP only for loopback hosts)
    /// - `api_key_env` is a valid environment variable name
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.parsed_api_url()?;
        validate_env_var_name(&self.api_key_env)?;
        self.http.validate()
    }

    /// Returns `api_url` parsed and validated.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::Config`] if the URL is malformed or not allowed.
    pub fn parsed_api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_url).map_err(|e| {
            DevPayError::Config(format!("invalid api_url '{}': {e}", self.api_url))
        })?;
        validate_url(&url)?;
        Ok(url)
    }

    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::Config`] if the variable is unset or empty.
    pub fn api_key_from_env(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(DevPayError::Config(format!(
                "environment variable {} is empty",
                self.api_key_env
            ))),
            Err(_) => Err(DevPayError::Config(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(DevPayError::Config("environment variable name cannot be empty".to_owned()));
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(DevPayError::Config(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    if let Some(ch) = chars.find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(DevPayError::Config(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_raise_errors() -> bool {
    true
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_owned()
}
