//! testcontainers image definition for OpenLDAP

use std::borrow::Cow;
use std::collections::BTreeMap;

use testcontainers::Image;
use testcontainers::core::{ContainerPort, Mount, WaitFor};

/// Fully resolved OpenLDAP image, produced by [`crate::LdapContainer::to_image`]
#[derive(Debug, Clone)]
pub struct LdapImage {
    name: String,
    tag: String,
    env: BTreeMap<String, String>,
    mounts: Vec<Mount>,
    ports: Vec<ContainerPort>,
}

impl LdapImage {
    pub(crate) fn new(
        name: String,
        tag: String,
        env: BTreeMap<String, String>,
        mounts: Vec<Mount>,
        ports: Vec<ContainerPort>,
    ) -> Self {
        Self {
            name,
            tag,
            env,
            mounts,
            ports,
        }
    }

    /// Environment passed to the container, ordered by key
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Look up a single environment variable
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn mount_list(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn ports(&self) -> &[ContainerPort] {
        &self.ports
    }
}

impl Image for LdapImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        // Readiness is an admin bind, checked after start
        Vec::new()
    }

    fn env_vars(
        &self,
    ) -> impl IntoIterator<Item = (impl Into<Cow<'_, str>>, impl Into<Cow<'_, str>>)> {
        &self.env
    }

    fn mounts(&self) -> impl IntoIterator<Item = &Mount> {
        &self.mounts
    }

    fn expose_ports(&self) -> &[ContainerPort] {
        &self.ports
    }
}
