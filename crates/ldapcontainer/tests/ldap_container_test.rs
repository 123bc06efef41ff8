//! LDAP Container Integration Tests
//!
//! These tests start real OpenLDAP containers and require a running Docker
//! daemon.
//!
//! To run these tests:
//! 1. Make sure `docker info` works for the current user
//! 2. Run: cargo test -p ldapcontainer --test ldap_container_test -- --ignored

use ldap3::Scope;
use ldapcontainer::connection::{self, ConnectOptions};
use ldapcontainer::{LdapContainer, LdapContainerError};
use ldapcontainer_testkit::{TlsFixture, init_tracing};

const ROOT: &str = "dc=example,dc=org";
const ALL_OBJECTS: &str = "(objectClass=*)";

#[tokio::test]
#[ignore]
async fn test_admin_context_search() -> anyhow::Result<()> {
    init_tracing();
    let ldap = LdapContainer::new().start().await?;

    let mut admin = ldap.admin_context().await?;
    let (entries, _) = admin
        .search(ROOT, Scope::Subtree, ALL_OBJECTS, vec!["dn"])
        .await?
        .success()?;
    assert!(!entries.is_empty());

    admin.unbind().await?;
    ldap.stop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_ldap_connection() -> anyhow::Result<()> {
    init_tracing();
    let ldap = LdapContainer::new().start().await?;

    let url = ldap.ldap_url();
    assert!(url.starts_with("ldap://"));

    let mut conn = connection::connect(&url, &ConnectOptions::default()).await?;
    connection::bind(&mut conn, "cn=admin,dc=example,dc=org", "adminpassword").await?;
    assert!(connection::count_entries(&mut conn, ROOT, ALL_OBJECTS).await? > 0);

    conn.unbind().await?;
    ldap.stop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_ldap_admin_credentials() -> anyhow::Result<()> {
    init_tracing();
    let ldap = LdapContainer::new()
        .with_admin_user("cn=customAdmin,dc=example,dc=org")
        .with_admin_password("customPassword")
        .start()
        .await?;

    assert_eq!(ldap.admin_user(), "customAdmin");
    assert_eq!(ldap.admin_user_dn(), "cn=customAdmin,dc=example,dc=org");
    assert_eq!(ldap.admin_password(), "customPassword");

    let mut conn = connection::connect_and_bind(
        &ldap.ldap_url(),
        &ldap.admin_user_dn(),
        ldap.admin_password(),
        &ConnectOptions::default(),
    )
    .await?;
    assert!(connection::count_entries(&mut conn, ROOT, ALL_OBJECTS).await? > 0);

    // The default admin must not exist any more
    let mut other = connection::connect(&ldap.ldap_url(), &ConnectOptions::default()).await?;
    let rejected = connection::bind(&mut other, "cn=admin,dc=example,dc=org", "adminpassword").await;
    assert!(matches!(
        rejected,
        Err(LdapContainerError::BindRejected { rc: 49, .. })
    ));

    conn.unbind().await?;
    ldap.stop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_ldap_container_can_use_tls() -> anyhow::Result<()> {
    init_tracing();
    let tls = TlsFixture::new()?;
    let ldap = LdapContainer::new()
        .with_tls(tls.cert(), tls.key(), tls.ca())
        .with_env("BITNAMI_DEBUG", "true")
        .start()
        .await?;

    let ldaps_url = ldap.ldaps_url()?;
    assert!(ldaps_url.starts_with("ldaps://"));

    let mut admin = ldap.admin_context_tls().await?;
    assert!(connection::count_entries(&mut admin, ROOT, ALL_OBJECTS).await? > 0);

    admin.unbind().await?;
    ldap.stop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_ldaps_url_requires_tls() -> anyhow::Result<()> {
    init_tracing();
    let ldap = LdapContainer::new().start().await?;

    assert!(matches!(
        ldap.ldaps_url(),
        Err(LdapContainerError::PortNotExposed(_))
    ));
    assert!(ldap.admin_context_tls().await.is_err());

    ldap.stop().await?;
    Ok(())
}
