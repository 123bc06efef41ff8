//! LDAP client connections to a running container

use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope};

use crate::error::{LdapContainerError, Result};

/// Options for opening a client connection
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    /// Connection timeout
    pub timeout: Duration,
    /// Skip server certificate verification (self-signed test certificates)
    pub trust_all_certificates: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::config::DEFAULT_CONNECT_TIMEOUT_MS),
            trust_all_certificates: false,
        }
    }
}

impl ConnectOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Accept any server certificate
    pub fn trust_all(mut self) -> Self {
        self.trust_all_certificates = true;
        self
    }

    pub(crate) fn settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_no_tls_verify(self.trust_all_certificates)
    }
}

/// Open a connection and spawn its driver on the current runtime
pub async fn connect(url: &str, options: &ConnectOptions) -> Result<Ldap> {
    let (conn, ldap) = LdapConnAsync::with_settings(options.settings(), url).await?;

    tokio::spawn(async move {
        if let Err(e) = conn.drive().await {
            tracing::warn!("LDAP connection driver error: {}", e);
        }
    });

    Ok(ldap)
}

/// Simple bind, turning a non-zero result code into [`LdapContainerError::BindRejected`]
pub async fn bind(ldap: &mut Ldap, dn: &str, password: &str) -> Result<()> {
    let result = ldap.simple_bind(dn, password).await?;
    if result.rc != 0 {
        return Err(LdapContainerError::BindRejected {
            dn: dn.to_string(),
            rc: result.rc,
            text: result.text,
        });
    }
    Ok(())
}

/// Connect and bind in one step
pub async fn connect_and_bind(
    url: &str,
    dn: &str,
    password: &str,
    options: &ConnectOptions,
) -> Result<Ldap> {
    let mut ldap = connect(url, options).await?;
    if let Err(e) = bind(&mut ldap, dn, password).await {
        let _ = ldap.unbind().await;
        return Err(e);
    }
    Ok(ldap)
}

/// Subtree search under `base`, returning how many entries matched
pub async fn count_entries(ldap: &mut Ldap, base: &str, filter: &str) -> Result<usize> {
    let (entries, _result) = ldap
        .search(base, Scope::Subtree, filter, vec!["dn"])
        .await?
        .success()?;
    Ok(entries.len())
}
