//! Label sets carried by every generated object
//!
//! Label-based bulk selection is the only way to discover the resources
//! owned by a cluster, so every object carries the ownership + provenance
//! pair; workloads and endpoints additionally carry the routable marker the
//! list operations filter on.

use std::collections::BTreeMap;

/// Ownership label, set to the username owning the cluster
pub const OWNER_LABEL: &str = "mystack/owner";

/// Application identity label
pub const APP_LABEL: &str = "app";

/// Provenance label identifying objects created by this controller
pub const HERITAGE_LABEL: &str = "heritage";

/// Provenance label value
pub const HERITAGE: &str = "mystack";

/// Bulk-selection marker carried by workloads and endpoints
pub const ROUTABLE_LABEL: &str = "mystack/routable";

/// Endpoint marker distinguishing backing-service endpoints from app ones
pub const SERVICE_LABEL: &str = "mystack/service";

/// Ownership + identity + provenance labels carried by every object.
pub fn base_labels(name: &str, username: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (OWNER_LABEL.to_string(), username.to_string()),
        (APP_LABEL.to_string(), name.to_string()),
        (HERITAGE_LABEL.to_string(), HERITAGE.to_string()),
    ])
}

/// Base labels plus the routable marker, for workload deployments.
pub fn workload_labels(name: &str, username: &str) -> BTreeMap<String, String> {
    let mut labels = base_labels(name, username);
    labels.insert(ROUTABLE_LABEL.to_string(), "true".to_string());
    labels
}

/// Workload labels plus the backing-service marker, for endpoints.
pub fn endpoint_labels(
    name: &str,
    username: &str,
    is_backing_service: bool,
) -> BTreeMap<String, String> {
    let mut labels = workload_labels(name, username);
    labels.insert(
        SERVICE_LABEL.to_string(),
        is_backing_service.to_string(),
    );
    labels
}

/// Selector matching every routable object owned by `username`.
pub fn routable_selector(username: &str) -> String {
    format!("{ROUTABLE_LABEL}=true,{OWNER_LABEL}={username}")
}

/// Selector matching the owner's endpoints on one side of the
/// backing-service marker.
pub fn endpoint_selector(username: &str, is_backing_service: bool) -> String {
    format!(
        "{},{SERVICE_LABEL}={is_backing_service}",
        routable_selector(username)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_labels_carry_ownership_and_provenance() {
        let labels = base_labels("test", "user");
        assert_eq!(labels[OWNER_LABEL], "user");
        assert_eq!(labels[APP_LABEL], "test");
        assert_eq!(labels[HERITAGE_LABEL], "mystack");
        assert!(!labels.contains_key(ROUTABLE_LABEL));
    }

    #[test]
    fn workload_labels_are_routable() {
        let labels = workload_labels("test", "user");
        assert_eq!(labels[ROUTABLE_LABEL], "true");
    }

    #[test]
    fn endpoint_labels_carry_service_marker() {
        assert_eq!(endpoint_labels("test", "user", true)[SERVICE_LABEL], "true");
        assert_eq!(endpoint_labels("test", "user", false)[SERVICE_LABEL], "false");
    }

    #[test]
    fn selectors() {
        assert_eq!(
            routable_selector("user"),
            "mystack/routable=true,mystack/owner=user"
        );
        assert_eq!(
            endpoint_selector("user", false),
            "mystack/routable=true,mystack/owner=user,mystack/service=false"
        );
    }
}
