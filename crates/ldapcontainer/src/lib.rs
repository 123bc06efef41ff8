//! ldapcontainer - disposable OpenLDAP servers for integration tests
//!
//! This crate provides:
//! - An OpenLDAP container builder (root, admin credentials, TLS, extra env)
//! - Readiness checking by admin bind instead of log scraping
//! - Connection URLs and admin-bound `ldap3` connections
//! - Configuration through `LDAP_CONTAINER_*` environment variables
//!
//! ```no_run
//! # async fn run() -> ldapcontainer::Result<()> {
//! let ldap = ldapcontainer::LdapContainer::new().start().await?;
//! let mut admin = ldap.admin_context().await?;
//! let entries = ldapcontainer::connection::count_entries(
//!     &mut admin,
//!     ldap.root(),
//!     "(objectClass=*)",
//! )
//! .await?;
//! assert!(entries > 0);
//! ldap.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod container;
pub mod dn;
pub mod error;
pub mod image;
pub mod running;
pub mod wait;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use crate::config::{LDAP_PORT, LDAPS_PORT, LdapContainerConfig};
pub use container::{LdapContainer, TlsFiles};
pub use error::{LdapContainerError, Result};
pub use image::LdapImage;
pub use running::{Endpoints, RunningLdap};
pub use wait::WaitSettings;
