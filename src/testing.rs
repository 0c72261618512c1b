// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! TLS material generated on the fly for tests

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Name, X509};
use std::path::Path;
use tempfile::TempDir;

/// Self-signed certificates and keys written to a temporary directory
///
/// The RSA certificate doubles as the CA. Its key is written both as
/// PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`). The EC
/// pair uses a SEC1 key (`BEGIN EC PRIVATE KEY`).
pub struct TlsFixtures {
    _dir: TempDir,
    pub ca_cert: String,
    pub cert: String,
    pub pkcs8_key: String,
    pub pkcs1_key: String,
    pub ec_cert: String,
    pub sec1_key: String,
}

fn self_signed(key: &PKey<Private>, common_name: &str) -> X509 {
    let mut name = X509Name::builder().unwrap(); //#[allow_ci]
    name.append_entry_by_nid(Nid::COMMONNAME, common_name)
        .unwrap(); //#[allow_ci]
    let name = name.build();

    let serial = BigNum::from_u32(1)
        .and_then(|n| n.to_asn1_integer())
        .unwrap(); //#[allow_ci]

    let mut builder = X509::builder().unwrap(); //#[allow_ci]
    builder.set_version(2).unwrap(); //#[allow_ci]
    builder.set_serial_number(&serial).unwrap(); //#[allow_ci]
    builder.set_subject_name(&name).unwrap(); //#[allow_ci]
    builder.set_issuer_name(&name).unwrap(); //#[allow_ci]
    builder.set_pubkey(key).unwrap(); //#[allow_ci]
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap()) //#[allow_ci]
        .unwrap(); //#[allow_ci]
    builder
        .set_not_after(&Asn1Time::days_from_now(1).unwrap()) //#[allow_ci]
        .unwrap(); //#[allow_ci]
    builder.sign(key, MessageDigest::sha256()).unwrap(); //#[allow_ci]
    builder.build()
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap(); //#[allow_ci]
    path.to_string_lossy().into_owned()
}

impl TlsFixtures {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap(); //#[allow_ci]

        let rsa = Rsa::generate(2048).unwrap(); //#[allow_ci]
        let pkcs1 = rsa.private_key_to_pem().unwrap(); //#[allow_ci]
        let rsa_key = PKey::from_rsa(rsa).unwrap(); //#[allow_ci]
        let rsa_cert = self_signed(&rsa_key, "cfdot-client")
            .to_pem()
            .unwrap(); //#[allow_ci]

        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap(); //#[allow_ci]
        let ec = EcKey::generate(&group).unwrap(); //#[allow_ci]
        let sec1 = ec.private_key_to_pem().unwrap(); //#[allow_ci]
        let ec_key = PKey::from_ec_key(ec).unwrap(); //#[allow_ci]
        let ec_cert = self_signed(&ec_key, "cfdot-ec-client").to_pem().unwrap(); //#[allow_ci]

        Self {
            ca_cert: write(dir.path(), "ca.crt", &rsa_cert),
            cert: write(dir.path(), "client.crt", &rsa_cert),
            pkcs8_key: write(
                dir.path(),
                "client.key",
                &rsa_key.private_key_to_pem_pkcs8().unwrap(), //#[allow_ci]
            ),
            pkcs1_key: write(dir.path(), "client-rsa.key", &pkcs1),
            ec_cert: write(dir.path(), "client-ec.crt", &ec_cert),
            sec1_key: write(dir.path(), "client-ec.key", &sec1),
            _dir: dir,
        }
    }
}
