//! Readiness checks
//!
//! The OpenLDAP image opens its port before slapd accepts binds, so log lines
//! and port checks are not enough. The container is ready once the admin
//! can bind.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::LdapContainerConfig;
use crate::connection::{self, ConnectOptions};
use crate::error::{LdapContainerError, Result};

/// Timing for readiness probes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitSettings {
    pub startup_timeout: Duration,
    pub retry_interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self::from(&LdapContainerConfig::default())
    }
}

impl From<&LdapContainerConfig> for WaitSettings {
    fn from(config: &LdapContainerConfig) -> Self {
        Self {
            startup_timeout: config.startup_timeout(),
            retry_interval: config.retry_interval(),
            connect_timeout: config.connect_timeout(),
        }
    }
}

/// Run `probe` until it succeeds or `startup_timeout` elapses.
///
/// The last sleep is cut short so one final probe runs at the deadline.
/// Returns the number of attempts it took.
pub async fn retry_until_ready<F, Fut>(settings: &WaitSettings, mut probe: F) -> Result<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let started = Instant::now();
    let deadline = started + settings.startup_timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match probe().await {
            Ok(()) => return Ok(attempts),
            Err(e) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(LdapContainerError::StartupTimeout {
                        timeout: settings.startup_timeout,
                        attempts,
                        last_error: e.to_string(),
                    });
                }
                debug!(
                    attempt = attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "LDAP server not ready yet"
                );
                tokio::time::sleep(settings.retry_interval.min(remaining)).await;
            }
        }
    }
}

/// Wait until `dn` can bind against `url`
pub async fn wait_for_admin_bind(
    url: &str,
    dn: &str,
    password: &str,
    settings: &WaitSettings,
) -> Result<()> {
    let options = ConnectOptions::new(settings.connect_timeout);
    let options = &options;
    let connect_timeout = settings.connect_timeout;
    let started = Instant::now();

    let attempts = retry_until_ready(settings, move || async move {
        let probe = connection::connect_and_bind(url, dn, password, options);
        let mut ldap = match tokio::time::timeout(connect_timeout, probe).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(LdapContainerError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "admin bind timed out",
                )));
            }
        };
        let _ = ldap.unbind().await;
        Ok(())
    })
    .await?;

    info!(
        url = %url,
        attempts,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "LDAP server accepted admin bind"
    );
    Ok(())
}
