//! Error types for LDAP container operations

use std::path::PathBuf;
use std::time::Duration;

/// Error type for starting and talking to an LDAP container
#[derive(Debug, thiserror::Error)]
pub enum LdapContainerError {
    #[error("container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bind as {dn} rejected: rc={rc}, {text}")]
    BindRejected { dn: String, rc: u32, text: String },

    #[error("LDAP server not ready after {timeout:?} ({attempts} attempts): {last_error}")]
    StartupTimeout {
        timeout: Duration,
        attempts: u32,
        last_error: String,
    },

    #[error("container port {0} is not exposed")]
    PortNotExposed(u16),

    #[error("invalid TLS file {path}: {reason}")]
    InvalidTlsFile { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, LdapContainerError>;
