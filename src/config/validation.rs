// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Endpoint validation for cfdot
//!
//! Decides whether a resolved [`ServiceEndpoint`] describes something cfdot
//! can connect to. Checks run in a fixed order and the first failure is
//! returned:
//!
//! 1. The address is set
//! 2. The address parses (URL for BBS, `host:port` for Locket)
//! 3. BBS only: the scheme is `http` or `https`
//! 4. Secure endpoints without skip-verify have a readable CA file
//! 5. Secure endpoints have both a client certificate and a key
//! 6. The key and certificate files are readable
//!
//! A plaintext `http` BBS endpoint stops after step 3; any TLS settings that
//! came with it are ignored. Locket is always secure.
//!
//! Validation only reads the filesystem. It never changes the endpoint, so
//! running it twice gives the same answer.

use super::error::{ConfigError, FileKind};
use super::resolve::{Service, ServiceEndpoint};
use super::TlsConfig;
use log::debug;
use std::fs::File;
use url::Url;

/// Validate a resolved endpoint
pub fn validate(endpoint: &ServiceEndpoint) -> Result<(), ConfigError> {
    let service = endpoint.service;

    if endpoint.address.is_empty() {
        return Err(ConfigError::MissingAddress { service });
    }

    match service {
        Service::Bbs => validate_bbs_url(&endpoint.address)?,
        Service::Locket => validate_host_port(&endpoint.address)?,
    }

    if !is_secure(endpoint) {
        debug!(
            "{} endpoint {} is plaintext, TLS settings ignored",
            service.name(),
            endpoint.address
        );
        return Ok(());
    }

    validate_tls_config(service, &endpoint.tls)
}

/// Whether the endpoint is reached over TLS
///
/// A BBS URL is secure when its parsed scheme is `https`, in any letter
/// case. Locket is always secure. Client construction relies on the same
/// answer, so an endpoint validated as secure never gets a plaintext client.
pub fn is_secure(endpoint: &ServiceEndpoint) -> bool {
    match endpoint.service {
        Service::Bbs => Url::parse(&endpoint.address)
            .map(|url| url.scheme() == "https")
            .unwrap_or(false),
        Service::Locket => true,
    }
}

/// Check that a BBS URL parses with an `http` or `https` scheme
fn validate_bbs_url(address: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        service: Service::Bbs,
        value: address.to_string(),
    };

    // An empty scheme is a malformed URL rather than a missing one
    if address.starts_with(':') {
        return Err(invalid());
    }

    let url = match Url::parse(address) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(ConfigError::UnsupportedScheme {
                service: Service::Bbs,
                value: address.to_string(),
            })
        }
        Err(_) => return Err(invalid()),
    };

    match url.scheme() {
        "https" | "http" => Ok(()),
        _ => Err(ConfigError::UnsupportedScheme {
            service: Service::Bbs,
            value: address.to_string(),
        }),
    }
}

/// Check a `host:port` pair as used by Locket
fn validate_host_port(address: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        service: Service::Locket,
        value: address.to_string(),
    };

    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || host.contains('/') {
        return Err(invalid());
    }
    port.parse::<u16>().map_err(|_| invalid())?;

    Ok(())
}

/// Validate TLS material for a secure endpoint
pub fn validate_tls_config(
    service: Service,
    tls: &TlsConfig,
) -> Result<(), ConfigError> {
    if !tls.skip_cert_verify {
        if tls.ca_cert_file.is_empty() {
            return Err(ConfigError::MissingCaCert { service });
        }
        validate_readable_file(FileKind::CaCert, &tls.ca_cert_file)?;
    }

    if tls.cert_file.is_empty() || tls.key_file.is_empty() {
        return Err(ConfigError::MissingClientCertOrKey { service });
    }

    validate_readable_file(FileKind::Key, &tls.key_file)?;
    validate_readable_file(FileKind::Cert, &tls.cert_file)?;

    Ok(())
}

fn validate_readable_file(
    kind: FileKind,
    path: &str,
) -> Result<(), ConfigError> {
    File::open(path)
        .map(drop)
        .map_err(|e| ConfigError::unreadable_file(kind, path, &e))
}
