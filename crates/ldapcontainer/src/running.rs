//! Handle to a started LDAP container

use std::time::Duration;

use ldap3::Ldap;
use testcontainers::ContainerAsync;
use tracing::info;

use crate::config::LDAPS_PORT;
use crate::connection::{self, ConnectOptions};
use crate::dn::admin_dn;
use crate::error::{LdapContainerError, Result};
use crate::image::LdapImage;

/// Host-side address of the container's LDAP listeners
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub host: String,
    pub ldap_port: u16,
    /// Only mapped when TLS is enabled
    pub ldaps_port: Option<u16>,
}

impl Endpoints {
    pub fn new(host: impl Into<String>, ldap_port: u16, ldaps_port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            ldap_port,
            ldaps_port,
        }
    }

    pub fn ldap_url(&self) -> String {
        format!("ldap://{}:{}", self.host, self.ldap_port)
    }

    pub fn ldaps_url(&self) -> Result<String> {
        let port = self
            .ldaps_port
            .ok_or(LdapContainerError::PortNotExposed(LDAPS_PORT))?;
        Ok(format!("ldaps://{}:{}", self.host, port))
    }
}

/// A started OpenLDAP server. The container is removed when this is dropped.
pub struct RunningLdap {
    container: ContainerAsync<LdapImage>,
    endpoints: Endpoints,
    root: String,
    admin_user: String,
    admin_password: String,
    connect_timeout: Duration,
}

impl std::fmt::Debug for RunningLdap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningLdap")
            .field("container_id", &self.container.id())
            .field("endpoints", &self.endpoints)
            .field("root", &self.root)
            .field("admin_user", &self.admin_user)
            .finish_non_exhaustive()
    }
}

impl RunningLdap {
    pub(crate) fn new(
        container: ContainerAsync<LdapImage>,
        endpoints: Endpoints,
        root: String,
        admin_user: String,
        admin_password: String,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            container,
            endpoints,
            root,
            admin_user,
            admin_password,
            connect_timeout,
        }
    }

    pub fn container_id(&self) -> &str {
        self.container.id()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn host(&self) -> &str {
        &self.endpoints.host
    }

    /// `ldap://host:port`
    pub fn ldap_url(&self) -> String {
        self.endpoints.ldap_url()
    }

    /// `ldaps://host:port`, only available when started with TLS
    pub fn ldaps_url(&self) -> Result<String> {
        self.endpoints.ldaps_url()
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn admin_user(&self) -> &str {
        &self.admin_user
    }

    pub fn admin_user_dn(&self) -> String {
        admin_dn(&self.admin_user, &self.root)
    }

    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    /// Connection over plain LDAP, already bound as the admin
    pub async fn admin_context(&self) -> Result<Ldap> {
        let options = ConnectOptions::new(self.connect_timeout);
        connection::connect_and_bind(
            &self.ldap_url(),
            &self.admin_user_dn(),
            &self.admin_password,
            &options,
        )
        .await
    }

    /// Connection over LDAPS that accepts the self-signed server
    /// certificate, already bound as the admin
    pub async fn admin_context_tls(&self) -> Result<Ldap> {
        let url = self.ldaps_url()?;
        let options = ConnectOptions::new(self.connect_timeout).trust_all();
        connection::connect_and_bind(&url, &self.admin_user_dn(), &self.admin_password, &options)
            .await
    }

    /// Stop and remove the container
    pub async fn stop(self) -> Result<()> {
        let id = self.container.id().to_string();
        self.container.stop().await?;
        self.container.rm().await?;
        info!(container_id = %id, "LDAP container removed");
        Ok(())
    }
}
