// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Configuration management for cfdot
//!
//! Two layers of configuration exist:
//!
//! - The process-wide [`Config`]: a default [`TlsConfig`] shared by every
//!   service and the HTTP [`ClientConfig`]. It is loaded once at startup from
//!   built-in defaults, optional TOML files, `CFDOT_` environment variables
//!   and finally the global command-line flags.
//! - Per-service endpoints, resolved by [`resolve`] from the service's own
//!   flags and environment variables with the process-wide TLS defaults
//!   merged in, then checked by [`validation`]. The [`hooks`] module runs both
//!   steps for every service a command talks to.
//!
//! # Configuration Files (Optional)
//!
//! Searched in order, all found files are layered:
//! - Explicit path given with `--config` (must exist)
//! - `cfdot.toml` (current directory)
//! - `~/.config/cfdot/config.toml` (user)
//! - `$XDG_CONFIG_HOME/cfdot/config.toml` (XDG)
//!
//! # Environment Variables
//!
//! `CFDOT_` prefix with double underscores as separators:
//! - `CFDOT_TLS__CA_CERT_FILE=/var/vcap/jobs/cfdot/config/certs/ca.crt`
//! - `CFDOT_TLS__SKIP_CERT_VERIFY=true`
//! - `CFDOT_CLIENT__TIMEOUT=30`
//!
//! # Example Configuration File
//!
//! ```toml
//! [tls]
//! ca_cert_file = "/var/vcap/jobs/cfdot/config/certs/ca.crt"
//! cert_file = "/var/vcap/jobs/cfdot/config/certs/client.crt"
//! key_file = "/var/vcap/jobs/cfdot/config/certs/client.key"
//! skip_cert_verify = false
//!
//! [client]
//! timeout = 30
//! ```

pub mod error;
pub mod hooks;
pub mod resolve;
pub mod validation;

use crate::Cli;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use self::error::ConfigError;

/// Process-wide configuration
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the first configuration file that was loaded, if any
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
    /// Default TLS settings inherited by every service
    #[serde(default)]
    pub tls: TlsConfig,
    /// HTTP client behaviour
    #[serde(default)]
    pub client: ClientConfig,
}

/// TLS material for one connection
///
/// Empty strings mean "not set". The same type holds the process-wide
/// defaults and each resolved service's settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// CA bundle used to verify the server
    pub ca_cert_file: String,
    /// Client certificate for mutual TLS
    pub cert_file: String,
    /// Client private key for mutual TLS
    pub key_file: String,
    /// Accept any server certificate
    pub skip_cert_verify: bool,
}

impl TlsConfig {
    /// Fill unset fields from `defaults`
    ///
    /// A field that is already non-empty is kept. `skip_cert_verify` ends up
    /// set if either side enables it.
    pub fn merge(&mut self, defaults: &TlsConfig) {
        if self.ca_cert_file.is_empty() {
            self.ca_cert_file = defaults.ca_cert_file.clone();
        }
        if self.cert_file.is_empty() {
            self.cert_file = defaults.cert_file.clone();
        }
        if self.key_file.is_empty() {
            self.key_file = defaults.key_file.clone();
        }
        self.skip_cert_verify = self.skip_cert_verify || defaults.skip_cert_verify;
    }

    fn is_empty(&self) -> bool {
        self.ca_cert_file.is_empty()
            && self.cert_file.is_empty()
            && self.key_file.is_empty()
            && !self.skip_cert_verify
    }
}

/// HTTP client behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout in seconds, `0` disables the timeout
    pub timeout: u64,
}

impl ClientConfig {
    /// Timeout for connecting and for each unary call
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

impl Config {
    /// Load configuration from defaults, files and `CFDOT_` environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if an explicit `config_path` does not
    /// exist, if a file has invalid syntax, or if an environment variable
    /// does not fit its field.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(explicit_path) = config_path {
            if !PathBuf::from(explicit_path).exists() {
                return Err(ConfigError::Load(config::ConfigError::Message(
                    format!(
                        "Specified configuration file not found: {explicit_path}"
                    ),
                )));
            }
        }

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?);

        let mut loaded_path: Option<PathBuf> = None;
        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                log::debug!("Loading config from: {}", path.display());
                if loaded_path.is_none() {
                    loaded_path = Some(path.clone());
                }
                builder = builder.add_source(
                    File::from(path).format(FileFormat::Toml).required(false),
                );
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("CFDOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.loaded_from = loaded_path;

        if config.loaded_from.is_none() {
            log::debug!("No configuration files found, using defaults and environment variables");
        }

        Ok(config)
    }

    /// Apply the global command-line flags on top of the loaded values
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        let defaults = &cli.default_tls;

        if let Some(ref path) = defaults.ca_cert_file {
            self.tls.ca_cert_file = path.clone();
        }

        if let Some(ref path) = defaults.client_cert_file {
            self.tls.cert_file = path.clone();
        }

        if let Some(ref path) = defaults.client_key_file {
            self.tls.key_file = path.clone();
        }

        if let Some(skip) = defaults.skip_cert_verify {
            self.tls.skip_cert_verify = skip;
        }

        if let Some(timeout) = cli.timeout {
            self.client.timeout = timeout;
        }

        if !self.tls.is_empty() {
            log::debug!(
                "Default TLS: ca_cert_file={:?}, cert_file={:?}, key_file={:?}, skip_cert_verify={}",
                self.tls.ca_cert_file,
                self.tls.cert_file,
                self.tls.key_file,
                self.tls.skip_cert_verify
            );
        }

        self
    }

    fn get_config_paths(config_path: Option<&str>) -> Vec<PathBuf> {
        if let Some(path) = config_path {
            return vec![PathBuf::from(path)];
        }

        let mut paths = vec![PathBuf::from("cfdot.toml")];

        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config/cfdot/config.toml"));
        }

        if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("cfdot/config.toml"));
        }

        paths
    }
}
