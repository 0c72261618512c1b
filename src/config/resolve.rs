// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Per-service connection resolution
//!
//! Each backend service (BBS, Locket) is configured from three layers, in
//! decreasing priority:
//!
//! 1. Command-line flags (`--bbsURL`, `--locketCACertFile`, ...)
//! 2. Service environment variables (`BBS_URL`, `LOCKET_CA_CERT_FILE`, ...)
//! 3. The process-wide default [`TlsConfig`] (TLS fields only)
//!
//! A flag that was given on the command line, even as an empty string,
//! shadows its environment variable. An environment variable set to the empty
//! string counts as unset.

use super::error::ConfigError;
use super::TlsConfig;
use config::Environment;
use log::{debug, warn};
use std::collections::HashMap;

const URL_KEY: &str = "url";
const API_LOCATION_KEY: &str = "api_location";
const CA_CERT_FILE_KEY: &str = "ca_cert_file";
const CERT_FILE_KEY: &str = "cert_file";
const KEY_FILE_KEY: &str = "key_file";
const SKIP_CERT_VERIFY_KEY: &str = "skip_cert_verify";

/// A backend service cfdot can connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// The scheduling database service, addressed by URL
    Bbs,
    /// The lock and presence service, addressed by `host:port`
    Locket,
}

impl Service {
    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Service::Bbs => "BBS",
            Service::Locket => "Locket",
        }
    }

    /// Human label for the address setting, used in error messages
    pub fn address_label(&self) -> &'static str {
        match self {
            Service::Bbs => "BBS URL",
            Service::Locket => "Locket API Location",
        }
    }

    pub fn address_flag(&self) -> &'static str {
        match self {
            Service::Bbs => "bbsURL",
            Service::Locket => "locketAPILocation",
        }
    }

    pub fn ca_cert_flag(&self) -> &'static str {
        match self {
            Service::Bbs => "bbsCACertFile",
            Service::Locket => "locketCACertFile",
        }
    }

    pub fn cert_flag(&self) -> &'static str {
        match self {
            Service::Bbs => "bbsCertFile",
            Service::Locket => "locketCertFile",
        }
    }

    pub fn key_flag(&self) -> &'static str {
        match self {
            Service::Bbs => "bbsKeyFile",
            Service::Locket => "locketKeyFile",
        }
    }

    pub fn skip_verify_flag(&self) -> &'static str {
        match self {
            Service::Bbs => "bbsSkipCertVerify",
            Service::Locket => "locketSkipCertVerify",
        }
    }

    /// Prefix shared by all environment variables of this service
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Service::Bbs => "BBS",
            Service::Locket => "LOCKET",
        }
    }

    pub fn address_env(&self) -> &'static str {
        match self {
            Service::Bbs => "BBS_URL",
            Service::Locket => "LOCKET_API_LOCATION",
        }
    }

    fn address_key(&self) -> &'static str {
        match self {
            Service::Bbs => URL_KEY,
            Service::Locket => API_LOCATION_KEY,
        }
    }

    fn setting_keys(&self) -> [&'static str; 5] {
        [
            self.address_key(),
            CA_CERT_FILE_KEY,
            CERT_FILE_KEY,
            KEY_FILE_KEY,
            SKIP_CERT_VERIFY_KEY,
        ]
    }

    /// Full environment variable name for a lowercase setting key
    fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix(), key.to_uppercase())
    }
}

/// Connection flags of one service as given on the command line
///
/// `None` means the flag was not passed. `Some("")` means it was passed
/// explicitly empty and must not fall back to the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFlags {
    pub address: Option<String>,
    pub ca_cert_file: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub skip_cert_verify: Option<bool>,
}

/// Fully resolved connection settings for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service: Service,
    /// URL for BBS, `host:port` for Locket
    pub address: String,
    pub tls: TlsConfig,
}

/// Snapshot of the environment variables belonging to one service
///
/// Only the exact upper-case names are read (`BBS_URL`, not `bbs_url`).
/// Keys are stored lowercase without the service prefix, so `BBS_CA_CERT_FILE`
/// is available as `ca_cert_file`.
#[derive(Debug, Clone, Default)]
pub struct ServiceEnv {
    values: HashMap<String, String>,
}

impl ServiceEnv {
    /// Read the service's variables from the process environment
    ///
    /// A variable whose value is not valid unicode is treated as unset.
    pub fn from_process(service: Service) -> Result<Self, ConfigError> {
        let mut vars = HashMap::new();
        for key in service.setting_keys() {
            let name = service.env_var(key);
            match std::env::var(&name) {
                Ok(value) => {
                    vars.insert(name, value);
                }
                Err(std::env::VarError::NotUnicode(_)) => {
                    warn!("Ignoring {name}: value is not valid unicode");
                }
                Err(std::env::VarError::NotPresent) => {}
            }
        }
        Self::collect(service, vars)
    }

    /// Read the service's variables from an explicit map of `NAME => value`
    pub fn from_map(
        service: Service,
        mut vars: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let names: Vec<String> = service
            .setting_keys()
            .iter()
            .map(|key| service.env_var(key))
            .collect();
        vars.retain(|name, _| names.contains(name));
        Self::collect(service, vars)
    }

    fn collect(
        service: Service,
        vars: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let values = config::Config::builder()
            .add_source(
                Environment::with_prefix(service.env_prefix())
                    .prefix_separator("_")
                    .ignore_empty(true)
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize::<HashMap<String, String>>()?;

        Ok(Self { values })
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Parse a boolean literal
///
/// Accepts exactly `1, t, T, TRUE, true, True` and
/// `0, f, F, FALSE, false, False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn flag_or_env(flag: &Option<String>, env: &ServiceEnv, key: &str) -> String {
    match flag {
        Some(value) => value.clone(),
        None => env.get(key).unwrap_or_default().to_string(),
    }
}

/// Resolve the connection settings of `service`
///
/// Flags win over the environment, and the process-wide `defaults` fill any
/// TLS field still empty afterwards. The address never comes from
/// `defaults`. Nothing is validated here beyond boolean parsing.
pub fn resolve(
    service: Service,
    flags: &ServiceFlags,
    env: &ServiceEnv,
    defaults: &TlsConfig,
) -> Result<ServiceEndpoint, ConfigError> {
    let skip_cert_verify = match flags.skip_cert_verify {
        Some(value) => value,
        None => match env.get(SKIP_CERT_VERIFY_KEY) {
            Some(raw) => {
                parse_bool(raw).ok_or_else(|| ConfigError::InvalidBoolean {
                    var: service.env_var(SKIP_CERT_VERIFY_KEY),
                    value: raw.to_string(),
                })?
            }
            None => false,
        },
    };

    let mut tls = TlsConfig {
        ca_cert_file: flag_or_env(&flags.ca_cert_file, env, CA_CERT_FILE_KEY),
        cert_file: flag_or_env(&flags.cert_file, env, CERT_FILE_KEY),
        key_file: flag_or_env(&flags.key_file, env, KEY_FILE_KEY),
        skip_cert_verify,
    };
    tls.merge(defaults);

    let endpoint = ServiceEndpoint {
        service,
        address: flag_or_env(&flags.address, env, service.address_key()),
        tls,
    };

    debug!(
        "Resolved {} endpoint: address={:?}, ca_cert_file={:?}, cert_file={:?}, key_file={:?}, skip_cert_verify={}",
        service.name(),
        endpoint.address,
        endpoint.tls.ca_cert_file,
        endpoint.tls.cert_file,
        endpoint.tls.key_file,
        endpoint.tls.skip_cert_verify
    );

    Ok(endpoint)
}
