//! Network endpoint translation and lifecycle
//!
//! Each workload with published ports gets one endpoint of the same name,
//! carrying the backing-service marker the domain-routing layer uses to
//! tell infrastructure endpoints apart from application ones.

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

use mystack_core::WorkloadConfig;

use crate::client::PlatformClient;
use crate::error::{KubeError, Result};
use crate::labels::{APP_LABEL, endpoint_labels};
use crate::namespace::namespace_name;
use crate::portmap::PortMap;

/// Stable network identity exposing one workload's ports.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub name: String,
    pub username: String,
    pub port_maps: Vec<PortMap>,
    pub is_backing_service: bool,
}

impl Endpoint {
    pub fn new(
        name: &str,
        username: &str,
        port_maps: Vec<PortMap>,
        is_backing_service: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            username: username.to_string(),
            port_maps,
            is_backing_service,
        }
    }

    /// Translate a workload declaration's ports into its endpoint.
    pub fn from_config(
        name: &str,
        username: &str,
        config: &WorkloadConfig,
        is_backing_service: bool,
    ) -> Result<Self> {
        Ok(Self::new(
            name,
            username,
            PortMap::parse_all(&config.ports)?,
            is_backing_service,
        ))
    }

    pub fn namespace(&self) -> String {
        namespace_name(&self.username)
    }

    /// Build the service object for this endpoint.
    pub fn build(&self) -> Service {
        let labels = endpoint_labels(&self.name, &self.username, self.is_backing_service);
        let selector = BTreeMap::from([(APP_LABEL.to_string(), self.name.clone())]);

        let ports: Vec<ServicePort> = self
            .port_maps
            .iter()
            .map(|p| ServicePort {
                name: Some(format!("port-{}", p.port)),
                port: p.port,
                target_port: Some(IntOrString::Int(p.target_port)),
                ..Default::default()
            })
            .collect();

        Service {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: Some(selector),
                ports: Some(ports),
                type_: Some("ClusterIP".to_string()),
                ..Default::default()
            }),
            status: None,
        }
    }

    /// Expose the endpoint; a duplicate fails with `AlreadyExists`.
    pub async fn expose(&self, client: &dyn PlatformClient) -> Result<Service> {
        client.create_service(&self.namespace(), &self.build()).await
    }

    pub async fn delete(&self, client: &dyn PlatformClient) -> Result<()> {
        client.delete_service(&self.namespace(), &self.name).await
    }
}

/// Look up the first published port of a user's endpoint by name.
pub async fn endpoint_port(
    client: &dyn PlatformClient,
    name: &str,
    username: &str,
) -> Result<i32> {
    let service = client
        .get_service(&namespace_name(username), name)
        .await?;

    service
        .spec
        .and_then(|s| s.ports)
        .and_then(|ports| ports.first().map(|p| p.port))
        .ok_or_else(|| KubeError::NotFound {
            kind: "Service",
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePlatform;
    use crate::labels::{SERVICE_LABEL, routable_selector};
    use crate::namespace::create_namespace;

    fn endpoint(name: &str, is_backing_service: bool) -> Endpoint {
        Endpoint::new(
            name,
            "user",
            vec![PortMap {
                port: 80,
                target_port: 5000,
            }],
            is_backing_service,
        )
    }

    #[test]
    fn build_maps_ports_and_markers() {
        let service = endpoint("test", false).build();

        assert_eq!(service.metadata.namespace.as_deref(), Some("mystack-user"));
        let labels = service.metadata.labels.as_ref().unwrap();
        assert_eq!(labels[SERVICE_LABEL], "false");

        let spec = service.spec.as_ref().unwrap();
        assert_eq!(spec.selector.as_ref().unwrap()[APP_LABEL], "test");
        let ports = spec.ports.as_ref().unwrap();
        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(5000)));
    }

    #[test]
    fn backing_service_marker_is_true_for_services() {
        let service = endpoint("test", true).build();
        let labels = service.metadata.labels.unwrap();
        assert_eq!(labels[SERVICE_LABEL], "true");
    }

    #[tokio::test]
    async fn expose_twice_is_conflict() {
        let platform = FakePlatform::new();
        let e = endpoint("test", false);

        e.expose(&platform).await.unwrap();
        let err = e.expose(&platform).await.unwrap_err();
        assert_eq!(err.to_string(), "Service \"test\" already exists");
    }

    #[tokio::test]
    async fn delete_removes_only_the_named_endpoint() {
        let platform = FakePlatform::new();
        endpoint("test", false).expose(&platform).await.unwrap();
        endpoint("test2", false).expose(&platform).await.unwrap();

        endpoint("test", false).delete(&platform).await.unwrap();

        let listed = platform
            .list_services("mystack-user", &routable_selector("user"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].metadata.name.as_deref(), Some("test2"));
    }

    #[tokio::test]
    async fn delete_of_unexposed_endpoint_fails() {
        let platform = FakePlatform::new();
        let err = endpoint("test", false).delete(&platform).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn endpoint_port_returns_first_published_port() {
        let platform = FakePlatform::new();

        let err = endpoint_port(&platform, "test", "user").await.unwrap_err();
        assert_eq!(err.to_string(), "Service \"test\" not found");

        create_namespace(&platform, "user").await.unwrap();
        endpoint("test", true).expose(&platform).await.unwrap();

        let port = endpoint_port(&platform, "test", "user").await.unwrap();
        assert_eq!(port, 80);
    }
}
