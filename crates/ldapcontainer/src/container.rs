//! OpenLDAP container builder
//!
//! [`LdapContainer`] collects the directory root, admin credentials, optional
//! TLS material and extra environment. [`LdapContainer::start`] runs the image,
//! waits until the admin can bind and hands back a [`RunningLdap`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use testcontainers::core::{ContainerPort, IntoContainerPort, Mount};
use testcontainers::runners::AsyncRunner;
use tracing::info;

use crate::config::{LDAP_PORT, LDAPS_PORT, LdapContainerConfig};
use crate::dn::{admin_dn, normalize_admin_user};
use crate::error::{LdapContainerError, Result};
use crate::image::LdapImage;
use crate::running::{Endpoints, RunningLdap};
use crate::wait::{self, WaitSettings};

pub const ENV_ADMIN_USERNAME: &str = "LDAP_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "LDAP_ADMIN_PASSWORD";
pub const ENV_ROOT: &str = "LDAP_ROOT";
pub const ENV_ENABLE_TLS: &str = "LDAP_ENABLE_TLS";
pub const ENV_TLS_CERT_FILE: &str = "LDAP_TLS_CERT_FILE";
pub const ENV_TLS_KEY_FILE: &str = "LDAP_TLS_KEY_FILE";
pub const ENV_TLS_CA_FILE: &str = "LDAP_TLS_CA_FILE";
pub const ENV_TLS_VERIFY_CLIENT: &str = "LDAP_TLS_VERIFY_CLIENT";

/// Where the image expects TLS material
pub const CONTAINER_CERT_FILE: &str = "/opt/bitnami/openldap/certs/openldap.crt";
pub const CONTAINER_KEY_FILE: &str = "/opt/bitnami/openldap/certs/openldap.key";
pub const CONTAINER_CA_FILE: &str = "/opt/bitnami/openldap/certs/openldapCA.crt";

/// Host paths of the PEM files mounted into the container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca: PathBuf,
}

/// Builder for a disposable OpenLDAP server
#[derive(Clone, Debug)]
pub struct LdapContainer {
    config: LdapContainerConfig,
    wait: WaitSettings,
    tls: Option<TlsFiles>,
    extra_env: BTreeMap<String, String>,
}

impl Default for LdapContainer {
    fn default() -> Self {
        Self::from_config(LdapContainerConfig::default())
    }
}

impl LdapContainer {
    /// Container with default image, root and credentials
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: LdapContainerConfig) -> Self {
        let wait = WaitSettings::from(&config);
        Self {
            config,
            wait,
            tls: None,
            extra_env: BTreeMap::new(),
        }
    }

    /// Container configured from `LDAP_CONTAINER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(LdapContainerConfig::from_env()?))
    }

    /// Set the admin user, either as a bare name or as `cn=<name>,<root>`.
    /// A DN is stored as its bare name, so [`Self::admin_user`] never returns it.
    pub fn with_admin_user(mut self, admin_user: &str) -> Self {
        self.config.admin_user = admin_user.to_string();
        self
    }

    pub fn with_admin_password(mut self, admin_password: &str) -> Self {
        self.config.admin_password = admin_password.to_string();
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.config.root = root.to_string();
        self
    }

    /// Add a container environment variable. Applied after the generated
    /// variables, so it can override them.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.extra_env.insert(key.to_string(), value.to_string());
        self
    }

    /// Enable LDAPS with the given PEM certificate, private key and CA
    pub fn with_tls(
        mut self,
        cert: impl AsRef<Path>,
        key: impl AsRef<Path>,
        ca: impl AsRef<Path>,
    ) -> Self {
        self.tls = Some(TlsFiles {
            cert: cert.as_ref().to_path_buf(),
            key: key.as_ref().to_path_buf(),
            ca: ca.as_ref().to_path_buf(),
        });
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.wait.startup_timeout = timeout;
        self
    }

    pub fn config(&self) -> &LdapContainerConfig {
        &self.config
    }

    pub fn wait_settings(&self) -> &WaitSettings {
        &self.wait
    }

    /// Bare admin username, even when a full DN was passed to [`Self::with_admin_user`]
    pub fn admin_user(&self) -> String {
        normalize_admin_user(&self.config.admin_user, &self.config.root)
    }

    pub fn admin_user_dn(&self) -> String {
        admin_dn(&self.admin_user(), &self.config.root)
    }

    pub fn admin_password(&self) -> &str {
        &self.config.admin_password
    }

    pub fn root(&self) -> &str {
        &self.config.root
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Resolve everything into the image that will be run
    pub fn to_image(&self) -> Result<LdapImage> {
        let mut env = BTreeMap::new();
        env.insert(ENV_ADMIN_USERNAME.to_string(), self.admin_user());
        env.insert(
            ENV_ADMIN_PASSWORD.to_string(),
            self.config.admin_password.clone(),
        );
        env.insert(ENV_ROOT.to_string(), self.config.root.clone());

        let mut mounts = Vec::new();
        let mut ports: Vec<ContainerPort> = vec![LDAP_PORT.tcp()];

        if let Some(tls) = &self.tls {
            for (host_file, container_file, env_key) in [
                (&tls.cert, CONTAINER_CERT_FILE, ENV_TLS_CERT_FILE),
                (&tls.key, CONTAINER_KEY_FILE, ENV_TLS_KEY_FILE),
                (&tls.ca, CONTAINER_CA_FILE, ENV_TLS_CA_FILE),
            ] {
                let source = resolve_tls_file(host_file)?;
                mounts.push(Mount::bind_mount(
                    source.to_string_lossy().into_owned(),
                    container_file,
                ));
                env.insert(env_key.to_string(), container_file.to_string());
            }
            env.insert(ENV_ENABLE_TLS.to_string(), "yes".to_string());
            env.insert(ENV_TLS_VERIFY_CLIENT.to_string(), "never".to_string());
            ports.push(LDAPS_PORT.tcp());
        }

        for (key, value) in &self.extra_env {
            env.insert(key.clone(), value.clone());
        }

        Ok(LdapImage::new(
            self.config.image_name.clone(),
            self.config.image_tag.clone(),
            env,
            mounts,
            ports,
        ))
    }

    /// Run the container and wait until the admin can bind
    pub async fn start(self) -> Result<RunningLdap> {
        let image = self.to_image()?;
        let admin_user = self.admin_user();
        let admin_user_dn = self.admin_user_dn();

        info!(
            image = %self.config.image_ref(),
            root = %self.config.root,
            admin = %admin_user_dn,
            tls = self.tls_enabled(),
            "Starting LDAP container"
        );

        let container = image.start().await?;
        let host = container.get_host().await?.to_string();
        let ldap_port = container.get_host_port_ipv4(LDAP_PORT.tcp()).await?;
        let ldaps_port = if self.tls_enabled() {
            Some(container.get_host_port_ipv4(LDAPS_PORT.tcp()).await?)
        } else {
            None
        };
        let endpoints = Endpoints::new(host, ldap_port, ldaps_port);

        wait::wait_for_admin_bind(
            &endpoints.ldap_url(),
            &admin_user_dn,
            &self.config.admin_password,
            &self.wait,
        )
        .await?;

        info!(
            container_id = %container.id(),
            url = %endpoints.ldap_url(),
            "LDAP container ready"
        );

        Ok(RunningLdap::new(
            container,
            endpoints,
            self.config.root,
            admin_user,
            self.config.admin_password,
            self.wait.connect_timeout,
        ))
    }
}

fn resolve_tls_file(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    if !absolute.is_file() {
        return Err(LdapContainerError::InvalidTlsFile {
            path: absolute,
            reason: "not a readable file".to_string(),
        });
    }
    Ok(absolute)
}
