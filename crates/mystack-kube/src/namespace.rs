//! Per-user namespace handling
//!
//! Each user's entire cluster lives in one namespace derived
//! deterministically from the username; the platform's uniqueness constraint
//! on namespace names is the concurrency guard against double-provisioning.

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::labels::{HERITAGE, HERITAGE_LABEL, OWNER_LABEL};

/// Prefix of every namespace managed by this controller
pub const NAMESPACE_PREFIX: &str = "mystack-";

/// Derive the namespace owning a user's cluster.
pub fn namespace_name(username: &str) -> String {
    format!("{NAMESPACE_PREFIX}{username}")
}

/// Build the namespace object, carrying ownership and provenance labels.
pub fn build_namespace(username: &str) -> Namespace {
    let labels = BTreeMap::from([
        (OWNER_LABEL.to_string(), username.to_string()),
        (HERITAGE_LABEL.to_string(), HERITAGE.to_string()),
    ]);

    Namespace {
        metadata: ObjectMeta {
            name: Some(namespace_name(username)),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Create the user's namespace; a duplicate fails with `AlreadyExists`.
pub async fn create_namespace(client: &dyn PlatformClient, username: &str) -> Result<Namespace> {
    client.create_namespace(&build_namespace(username)).await
}

pub async fn namespace_exists(client: &dyn PlatformClient, username: &str) -> Result<bool> {
    client.namespace_exists(&namespace_name(username)).await
}

/// Delete the user's namespace; the platform cascades to everything in it.
pub async fn delete_namespace(client: &dyn PlatformClient, username: &str) -> Result<()> {
    client.delete_namespace(&namespace_name(username)).await
}
