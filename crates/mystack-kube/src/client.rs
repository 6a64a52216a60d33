//! Orchestration-platform capability
//!
//! The cluster lifecycle talks to the platform exclusively through
//! [`PlatformClient`], so the real API-backed client and the in-memory fake
//! used by the test-suite are interchangeable. The handle is shared by
//! concurrent cluster operations and never mutated by them.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Namespace, PersistentVolumeClaim, Service};
use kube::api::{Api, DeleteParams, ListParams, PostParams};

use crate::error::{KubeError, Result};

/// Capability interface over the orchestration platform.
///
/// Raw 404/409 API responses are translated to the typed
/// [`KubeError::NotFound`]/[`KubeError::AlreadyExists`] kinds at this
/// boundary so callers can treat "create twice" as a conflict rather than an
/// internal fault.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace>;
    async fn namespace_exists(&self, name: &str) -> Result<bool>;
    async fn delete_namespace(&self, name: &str) -> Result<()>;

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment>;
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;
    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<()>;
    async fn list_deployments(&self, namespace: &str, selector: &str) -> Result<Vec<Deployment>>;

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service>;
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service>;
    async fn delete_service(&self, namespace: &str, name: &str) -> Result<()>;
    async fn list_services(&self, namespace: &str, selector: &str) -> Result<Vec<Service>>;

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job>;
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job>;
    async fn delete_job(&self, namespace: &str, name: &str) -> Result<()>;

    async fn create_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim>;
}

/// Platform client backed by a real Kubernetes API server.
#[derive(Clone)]
pub struct KubePlatform {
    client: kube::Client,
}

impl KubePlatform {
    /// Connect using the default kubeconfig/in-cluster environment.
    pub async fn try_default() -> Result<Self> {
        let client = kube::Client::try_default().await?;
        Ok(Self { client })
    }

    /// Wrap an existing Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        Self { client }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn volume_claims(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn object_name(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

#[async_trait]
impl PlatformClient for KubePlatform {
    async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace> {
        let name = object_name(&namespace.metadata);
        self.namespaces()
            .create(&PostParams::default(), namespace)
            .await
            .map_err(|e| KubeError::from_api("Namespace", &name, e))
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(self.namespaces().get_opt(name).await?.is_some())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.namespaces()
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| KubeError::from_api("Namespace", name, e))?;
        Ok(())
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let name = object_name(&deployment.metadata);
        self.deployments(namespace)
            .create(&PostParams::default(), deployment)
            .await
            .map_err(|e| KubeError::from_api("Deployment", &name, e))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        self.deployments(namespace)
            .get(name)
            .await
            .map_err(|e| KubeError::from_api("Deployment", name, e))
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<()> {
        self.deployments(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| KubeError::from_api("Deployment", name, e))?;
        Ok(())
    }

    async fn list_deployments(&self, namespace: &str, selector: &str) -> Result<Vec<Deployment>> {
        let params = ListParams::default().labels(selector);
        let list = self.deployments(namespace).list(&params).await?;
        Ok(list.items)
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service> {
        let name = object_name(&service.metadata);
        self.services(namespace)
            .create(&PostParams::default(), service)
            .await
            .map_err(|e| KubeError::from_api("Service", &name, e))
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        self.services(namespace)
            .get(name)
            .await
            .map_err(|e| KubeError::from_api("Service", name, e))
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<()> {
        self.services(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| KubeError::from_api("Service", name, e))?;
        Ok(())
    }

    async fn list_services(&self, namespace: &str, selector: &str) -> Result<Vec<Service>> {
        let params = ListParams::default().labels(selector);
        let list = self.services(namespace).list(&params).await?;
        Ok(list.items)
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job> {
        let name = object_name(&job.metadata);
        self.jobs(namespace)
            .create(&PostParams::default(), job)
            .await
            .map_err(|e| KubeError::from_api("Job", &name, e))
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job> {
        self.jobs(namespace)
            .get(name)
            .await
            .map_err(|e| KubeError::from_api("Job", name, e))
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<()> {
        self.jobs(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| KubeError::from_api("Job", name, e))?;
        Ok(())
    }

    async fn create_volume_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim> {
        let name = object_name(&claim.metadata);
        self.volume_claims(namespace)
            .create(&PostParams::default(), claim)
            .await
            .map_err(|e| KubeError::from_api("PersistentVolumeClaim", &name, e))
    }
}
