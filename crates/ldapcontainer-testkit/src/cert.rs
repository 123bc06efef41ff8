//! Self-signed certificates for TLS-enabled test containers
//!
//! One key pair signs two certificates: the server certificate handed to
//! slapd and a CA certificate for `LDAP_TLS_CA_FILE`. Clients are expected
//! to skip verification, so the chain does not need to validate.

use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::{Datelike, Days, Utc};
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, SerialNumber,
    date_time_ymd,
};

/// PEM output of [`CertificateGenerator::generate`]
#[derive(Clone, Debug)]
pub struct GeneratedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
    pub ca_pem: String,
}

impl GeneratedCertificate {
    /// Write certificate, private key and CA to the given files
    pub fn write(&self, cert_file: &Path, key_file: &Path, ca_file: &Path) -> anyhow::Result<()> {
        for (path, pem) in [
            (cert_file, &self.cert_pem),
            (key_file, &self.key_pem),
            (ca_file, &self.ca_pem),
        ] {
            std::fs::write(path, pem)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Builder for self-signed test certificates
#[derive(Clone, Debug)]
pub struct CertificateGenerator {
    subject: Vec<(DnType, String)>,
    subject_alt_names: Vec<String>,
    validity_days: u64,
}

impl Default for CertificateGenerator {
    fn default() -> Self {
        Self {
            subject: vec![
                (DnType::CommonName, "Test".to_string()),
                (DnType::OrganizationalUnitName, "Test".to_string()),
                (DnType::OrganizationName, "Test".to_string()),
                (DnType::LocalityName, "Test".to_string()),
                (DnType::StateOrProvinceName, "Test".to_string()),
            ],
            subject_alt_names: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            validity_days: 365,
        }
    }
}

impl CertificateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the subject common name
    pub fn with_common_name(mut self, common_name: &str) -> Self {
        self.subject.retain(|(ty, _)| *ty != DnType::CommonName);
        self.subject
            .insert(0, (DnType::CommonName, common_name.to_string()));
        self
    }

    pub fn with_subject_alt_name(mut self, name: &str) -> Self {
        self.subject_alt_names.push(name.to_string());
        self
    }

    pub fn with_validity_days(mut self, days: u64) -> Self {
        self.validity_days = days;
        self
    }

    pub fn validity_days(&self) -> u64 {
        self.validity_days
    }

    /// Generate a fresh key pair, server certificate and CA certificate
    pub fn generate(&self) -> anyhow::Result<GeneratedCertificate> {
        let key_pair = KeyPair::generate().context("failed to generate key pair")?;

        let server = self.params(false)?.self_signed(&key_pair)?;
        let ca = self.params(true)?.self_signed(&key_pair)?;

        tracing::debug!(
            sans = ?self.subject_alt_names,
            validity_days = self.validity_days,
            "Generated self-signed test certificate"
        );

        Ok(GeneratedCertificate {
            cert_pem: server.pem(),
            key_pem: key_pair.serialize_pem(),
            ca_pem: ca.pem(),
        })
    }

    /// Generate and write to the given files
    pub fn write(&self, cert_file: &Path, key_file: &Path, ca_file: &Path) -> anyhow::Result<()> {
        self.generate()?.write(cert_file, key_file, ca_file)
    }

    fn params(&self, is_ca: bool) -> anyhow::Result<CertificateParams> {
        let mut params = CertificateParams::new(self.subject_alt_names.clone())?;

        let mut name = DistinguishedName::new();
        for (ty, value) in &self.subject {
            name.push(ty.clone(), value.as_str());
        }
        params.distinguished_name = name;
        params.serial_number = Some(random_serial());

        let today = Utc::now().date_naive();
        let expiry = today
            .checked_add_days(Days::new(self.validity_days))
            .ok_or_else(|| anyhow!("validity of {} days overflows", self.validity_days))?;
        params.not_before = date_time_ymd(today.year(), today.month() as u8, today.day() as u8);
        params.not_after = date_time_ymd(expiry.year(), expiry.month() as u8, expiry.day() as u8);

        if is_ca {
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        }
        Ok(params)
    }
}

/// Random positive 64-bit serial
fn random_serial() -> SerialNumber {
    SerialNumber::from_slice(&random_serial_bytes())
}

fn random_serial_bytes() -> [u8; 8] {
    let mut bytes: [u8; 8] = rand::random();
    bytes[0] &= 0x7f;
    bytes
}

/// Write a fresh certificate, key and CA with the default generator
pub fn generate_certificate(cert_file: &Path, key_file: &Path, ca_file: &Path) -> anyhow::Result<()> {
    CertificateGenerator::default().write(cert_file, key_file, ca_file)
}
