//! Per-test fixtures

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use crate::cert::CertificateGenerator;

static TRACING: Once = Once::new();

/// Install a fmt subscriber that writes through the test harness.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Safe to call
/// from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Freshly generated TLS material in a temporary directory.
///
/// The directory and files are removed when the fixture is dropped, so keep
/// it alive for as long as the container that mounts them.
pub struct TlsFixture {
    dir: TempDir,
    cert: PathBuf,
    key: PathBuf,
    ca: PathBuf,
}

impl TlsFixture {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_generator(&CertificateGenerator::default())
    }

    pub fn with_generator(generator: &CertificateGenerator) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let cert = dir.path().join("cert.crt");
        let key = dir.path().join("key.key");
        let ca = dir.path().join("ca.crt");
        generator.write(&cert, &key, &ca)?;
        Ok(Self { dir, cert, key, ca })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn cert(&self) -> &Path {
        &self.cert
    }

    pub fn key(&self) -> &Path {
        &self.key
    }

    pub fn ca(&self) -> &Path {
        &self.ca
    }
}
