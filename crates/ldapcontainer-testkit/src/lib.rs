//! Test helpers for ldapcontainer
//!
//! - Self-signed certificate generation for LDAPS
//! - Temporary TLS fixtures
//! - Tracing setup for test output

pub mod cert;
pub mod fixture;

pub use cert::{CertificateGenerator, GeneratedCertificate, generate_certificate};
pub use fixture::{TlsFixture, init_tracing};
