//! Container configuration
//!
//! Defaults match the Bitnami OpenLDAP image. Every value can be overridden
//! through `LDAP_CONTAINER_*` environment variables, e.g.
//! `LDAP_CONTAINER_IMAGE_TAG=2.6.7` or `LDAP_CONTAINER_STARTUP_TIMEOUT_SECS=120`.

use std::time::Duration;

use config::{Config, Environment, Source};
use serde::Deserialize;

use crate::error::Result;

/// Plain LDAP port inside the container
pub const LDAP_PORT: u16 = 1389;
/// LDAPS port inside the container
pub const LDAPS_PORT: u16 = 1636;

pub const DEFAULT_IMAGE_NAME: &str = "bitnamilegacy/openldap";
pub const DEFAULT_IMAGE_TAG: &str = "2.6.6";
pub const DEFAULT_ROOT: &str = "dc=example,dc=org";
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "adminpassword";

pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "LDAP_CONTAINER";

/// Settings used to build and wait for an LDAP container
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LdapContainerConfig {
    /// Docker image repository
    pub image_name: String,
    /// Docker image tag
    pub image_tag: String,
    /// Directory root suffix (e.g., dc=example,dc=org)
    pub root: String,
    /// Admin username, without the `cn=` prefix
    pub admin_user: String,
    /// Admin password
    pub admin_password: String,
    /// How long to keep probing before giving up on startup
    pub startup_timeout_secs: u64,
    /// Pause between readiness probes in milliseconds
    pub retry_interval_ms: u64,
    /// Connection timeout for each probe in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for LdapContainerConfig {
    fn default() -> Self {
        Self {
            image_name: DEFAULT_IMAGE_NAME.to_string(),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            root: DEFAULT_ROOT.to_string(),
            admin_user: DEFAULT_ADMIN_USER.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl LdapContainerConfig {
    /// Load defaults overridden by `LDAP_CONTAINER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load defaults overridden by an arbitrary config source
    pub fn load<S>(source: S) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = Config::builder().add_source(source).build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Full image reference, e.g. `bitnamilegacy/openldap:2.6.6`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image_name, self.image_tag)
    }
}
