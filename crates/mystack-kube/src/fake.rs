//! In-memory platform client for testing
//!
//! Stores objects in plain maps, enforcing the same name-uniqueness and
//! label-selector semantics the real platform provides, so cluster logic can
//! be exercised without an API server.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
use k8s_openapi::api::batch::v1::{Job, JobStatus};
use k8s_openapi::api::core::v1::{Namespace, PersistentVolumeClaim, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::client::PlatformClient;
use crate::error::{KubeError, Result};

#[derive(Default)]
struct FakeState {
    namespaces: HashMap<String, Namespace>,
    deployments: HashMap<String, HashMap<String, Deployment>>,
    services: HashMap<String, HashMap<String, Service>>,
    jobs: HashMap<String, HashMap<String, Job>>,
    claims: HashMap<String, HashMap<String, PersistentVolumeClaim>>,
}

/// In-memory [`PlatformClient`] implementation.
#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<RwLock<FakeState>>,
}

impl FakePlatform {
    /// Create an empty fake platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a stored deployment as having all desired replicas available.
    pub fn mark_deployment_available(&self, namespace: &str, name: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(deployment) = state
            .deployments
            .get_mut(namespace)
            .and_then(|ns| ns.get_mut(name))
        {
            let desired = deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
            deployment.status = Some(DeploymentStatus {
                replicas: Some(desired),
                ready_replicas: Some(desired),
                available_replicas: Some(desired),
                updated_replicas: Some(desired),
                ..Default::default()
            });
        }
    }

    /// Mark a stored job as completed.
    pub fn mark_job_succeeded(&self, namespace: &str, name: &str) {
        let mut state = self.state.write().unwrap();
        if let Some(job) = state.jobs.get_mut(namespace).and_then(|ns| ns.get_mut(name)) {
            job.status = Some(JobStatus {
                succeeded: Some(1),
                ..Default::default()
            });
        }
    }

    /// Count stored volume claims in a namespace.
    pub fn volume_claim_count(&self, namespace: &str) -> usize {
        let state = self.state.read().unwrap();
        state.claims.get(namespace).map(|ns| ns.len()).unwrap_or(0)
    }
}

fn required_name(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

fn matches_selector(meta: &ObjectMeta, selector: &str) -> bool {
    if selector.is_empty() {
        return true;
    }
    let labels = meta.labels.clone().unwrap_or_default();
    selector.split(',').all(|pair| match pair.split_once('=') {
        Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
        None => false,
    })
}

fn insert_unique<T: Clone>(
    objects: &mut HashMap<String, HashMap<String, T>>,
    namespace: &str,
    name: String,
    object: T,
    kind: &'static str,
) -> Result<T> {
    let entries = objects.entry(namespace.to_string()).or_default();
    if entries.contains_key(&name) {
        return Err(KubeError::AlreadyExists { kind, name });
    }
    entries.insert(name, object.clone());
    Ok(object)
}

fn get_existing<T: Clone>(
    objects: &HashMap<String, HashMap<String, T>>,
    namespace: &str,
    name: &str,
    kind: &'static str,
) -> Result<T> {
    objects
        .get(namespace)
        .and_then(|ns| ns.get(name))
        .cloned()
        .ok_or_else(|| KubeError::NotFound {
            kind,
            name: name.to_string(),
        })
}

fn remove_existing<T>(
    objects: &mut HashMap<String, HashMap<String, T>>,
    namespace: &str,
    name: &str,
    kind: &'static str,
) -> Result<()> {
    objects
        .get_mut(namespace)
        .and_then(|ns| ns.remove(name))
        .map(|_| ())
        .ok_or_else(|| KubeError::NotFound {
            kind,
            name: name.to_string(),
        })
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace> {
        let name = required_name(&namespace.metadata);
        let mut state = self.state.write().unwrap();
        if state.namespaces.contains_key(&name) {
            return Err(KubeError::AlreadyExists {
                kind: "Namespace",
                name,
            });
        }
        state.namespaces.insert(name, namespace.clone());
        Ok(namespace.clone())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.read().unwrap().namespaces.contains_key(name))
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.namespaces.remove(name).is_none() {
            return Err(KubeError::NotFound {
                kind: "Namespace",
                name: name.to_string(),
            });
        }
        // Platform semantics: deleting a namespace cascades to everything in it.
        state.deployments.remove(name);
        state.services.remove(name);
        state.jobs.remove(name);
        state.claims.remove(name);
        Ok(())
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let name = required_name(&deployment.metadata);
        let mut state = self.state.write().unwrap();
        insert_unique(
            &mut state.deployments,
            namespace,
            name,
            deployment.clone(),
            "Deployment",
        )
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let state = self.state.read().unwrap();
        get_existing(&state.deployments, namespace, name, "Deployment")
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        remove_existing(&mut state.deployments, namespace, name, "Deployment")
    }

    async fn list_deployments(&self, namespace: &str, selector: &str) -> Result<Vec<Deployment>> {
        let state = self.state.read().unwrap();
        Ok(state
            .deployments
            .get(namespace)
            .map(|ns| {
                ns.values()
                    .filter(|d| matches_selector(&d.metadata, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service> {
        let name = required_name(&service.metadata);
        let mut state = self.state.write().unwrap();
        insert_unique(
            &mut state.services,
            namespace,
            name,
            service.clone(),
            "Service",
        )
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        let state = self.state.read().unwrap();
        get_existing(&state.services, namespace, name, "Service")
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        remove_existing(&mut state.services, namespace, name, "Service")
    }

    async fn list_services(&self, namespace: &str, selector: &str) -> Result<Vec<Service>> {
        let state = self.state.read().unwrap();
        Ok(state
            .services
            .get(namespace)
            .map(|ns| {
                ns.values()
                    .filter(|s| matches_selector(&s.metadata, selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job> {
        let name = required_name(&job.metadata);
        let mut state = self.state.write().unwrap();
        insert_unique(&mut state.jobs, namespace, name, job.clone(), "Job")
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job> {
        let state = self.state.read().unwrap();
        get_existing(&state.jobs, namespace, name, "Job")
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.write().unwrap();
        remove_existing(&mut state.jobs, namespace, name, "Job")
    }

    async fn create_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim> {
        let name = required_name(&claim.metadata);
        let mut state = self.state.write().unwrap();
        insert_unique(
            &mut state.claims,
            namespace,
            name,
            claim.clone(),
            "PersistentVolumeClaim",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_namespace(name: &str) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn labeled_deployment(name: &str, labels: &[(&str, &str)]) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_namespace_is_conflict() {
        let platform = FakePlatform::new();
        platform.create_namespace(&named_namespace("ns")).await.unwrap();

        let err = platform
            .create_namespace(&named_namespace("ns"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            KubeError::AlreadyExists {
                kind: "Namespace",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn namespace_delete_cascades() {
        let platform = FakePlatform::new();
        platform.create_namespace(&named_namespace("ns")).await.unwrap();
        platform
            .create_deployment("ns", &labeled_deployment("app", &[]))
            .await
            .unwrap();

        platform.delete_namespace("ns").await.unwrap();

        assert!(!platform.namespace_exists("ns").await.unwrap());
        let err = platform.get_deployment("ns", "app").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_of_absent_object_is_not_found() {
        let platform = FakePlatform::new();
        assert!(platform
            .delete_service("ns", "missing")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(platform
            .delete_namespace("missing")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn selector_listing_filters_by_labels() {
        let platform = FakePlatform::new();
        platform
            .create_deployment(
                "ns",
                &labeled_deployment("a", &[("mystack/routable", "true"), ("mystack/owner", "u1")]),
            )
            .await
            .unwrap();
        platform
            .create_deployment(
                "ns",
                &labeled_deployment("b", &[("mystack/routable", "true"), ("mystack/owner", "u2")]),
            )
            .await
            .unwrap();
        platform
            .create_deployment("ns", &labeled_deployment("c", &[]))
            .await
            .unwrap();

        let routable = platform
            .list_deployments("ns", "mystack/routable=true")
            .await
            .unwrap();
        assert_eq!(routable.len(), 2);

        let owned = platform
            .list_deployments("ns", "mystack/routable=true,mystack/owner=u1")
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].metadata.name.as_deref(), Some("a"));

        let everything = platform.list_deployments("ns", "").await.unwrap();
        assert_eq!(everything.len(), 3);
    }
}
