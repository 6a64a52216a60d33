//! Cluster lifecycle
//!
//! A `Cluster` is the runtime aggregate for one (user, stack) pair,
//! constructed fresh from a stack description each time it is needed. The
//! creation sequence is an explicit, ordered set of stages: namespace,
//! volumes, service workloads, app workloads, service endpoints, app
//! endpoints, setup job, readiness. Deletion reverses the flow without
//! waiting: endpoints first (so partial failures surface distinctly), then
//! the namespace, which the platform cascades to everything else.

use std::sync::Arc;

use tracing::info;

use mystack_core::StackConfig;
use mystack_store::ConfigRegistry;

use crate::client::PlatformClient;
use crate::deployment::Workload;
use crate::error::{KubeError, Result};
use crate::job::SetupJob;
use crate::labels::endpoint_selector;
use crate::namespace::{create_namespace, delete_namespace, namespace_exists, namespace_name};
use crate::readiness::Readiness;
use crate::service::Endpoint;
use crate::volume::StackVolume;

/// Name and published ports of one exposed workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAddress {
    pub name: String,
    pub ports: Vec<i32>,
}

/// Runtime aggregate for one user's stack.
pub struct Cluster {
    pub username: String,
    pub namespace: String,
    pub svc_workloads: Vec<Workload>,
    pub app_workloads: Vec<Workload>,
    pub svc_endpoints: Vec<Endpoint>,
    pub app_endpoints: Vec<Endpoint>,
    pub volumes: Vec<StackVolume>,
    pub setup: Option<SetupJob>,
    workload_readiness: Arc<dyn Readiness>,
    job_readiness: Arc<dyn Readiness>,
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("username", &self.username)
            .field("namespace", &self.namespace)
            .field("svc_workloads", &self.svc_workloads)
            .field("app_workloads", &self.app_workloads)
            .field("svc_endpoints", &self.svc_endpoints)
            .field("app_endpoints", &self.app_endpoints)
            .field("volumes", &self.volumes)
            .field("setup", &self.setup)
            .field("workload_readiness", &"<dyn Readiness>")
            .field("job_readiness", &"<dyn Readiness>")
            .finish()
    }
}

impl Cluster {
    /// Materialize the typed cluster from a parsed stack description.
    ///
    /// Services and apps are translated in name order; workloads without
    /// published ports get no endpoint. The setup job inherits every app's
    /// environment after its own, so one-shot tasks see the same connection
    /// variables the apps do.
    pub fn from_config(
        username: &str,
        config: &StackConfig,
        workload_readiness: Arc<dyn Readiness>,
        job_readiness: Arc<dyn Readiness>,
    ) -> Result<Self> {
        let mut svc_workloads = Vec::new();
        let mut svc_endpoints = Vec::new();
        for (name, workload_config) in config.services_by_name() {
            svc_workloads.push(Workload::from_config(name, username, workload_config)?);
            if !workload_config.ports.is_empty() {
                svc_endpoints.push(Endpoint::from_config(name, username, workload_config, true)?);
            }
        }

        let mut app_workloads = Vec::new();
        let mut app_endpoints = Vec::new();
        for (name, workload_config) in config.apps_by_name() {
            app_workloads.push(Workload::from_config(name, username, workload_config)?);
            if !workload_config.ports.is_empty() {
                app_endpoints.push(Endpoint::from_config(name, username, workload_config, false)?);
            }
        }

        let setup = config.setup.as_ref().map(|setup_config| {
            let mut environment = setup_config.environment.clone();
            for (_, app) in config.apps_by_name() {
                environment.extend(app.environment.iter().cloned());
            }
            SetupJob::new(
                username,
                &setup_config.image,
                environment,
                setup_config.period_seconds,
                setup_config.timeout_seconds,
            )
        });

        let volumes = config
            .volumes
            .iter()
            .map(|v| StackVolume::from_config(username, v))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            username: username.to_string(),
            namespace: namespace_name(username),
            svc_workloads,
            app_workloads,
            svc_endpoints,
            app_endpoints,
            volumes,
            setup,
            workload_readiness,
            job_readiness,
        })
    }

    /// Load the stored stack description and materialize its cluster.
    pub fn from_registry(
        registry: &ConfigRegistry,
        username: &str,
        cluster_name: &str,
        workload_readiness: Arc<dyn Readiness>,
        job_readiness: Arc<dyn Readiness>,
    ) -> Result<Self> {
        let config = registry.load(cluster_name)?;
        Self::from_config(username, &config, workload_readiness, job_readiness)
    }

    /// Submit every sub-resource to the platform and block until usable.
    ///
    /// An existing namespace aborts immediately with `AlreadyExists`; any
    /// later failure aborts at its stage with already-created resources left
    /// in place, since rollback could fail and compound the error state.
    pub async fn create(&self, client: &dyn PlatformClient) -> Result<()> {
        info!(namespace = %self.namespace, "creating namespace");
        create_namespace(client, &self.username).await?;

        for volume in &self.volumes {
            volume.create(client).await?;
        }

        info!(namespace = %self.namespace, "submitting workloads");
        for workload in self.svc_workloads.iter().chain(&self.app_workloads) {
            workload.deploy(client).await?;
        }

        info!(namespace = %self.namespace, "exposing endpoints");
        for endpoint in self.svc_endpoints.iter().chain(&self.app_endpoints) {
            endpoint.expose(client).await?;
        }

        if let Some(setup) = &self.setup {
            info!(namespace = %self.namespace, "running setup job");
            setup.run(client).await?;
            self.job_readiness
                .wait_for_job_completion(client, setup)
                .await?;
        }

        info!(namespace = %self.namespace, "waiting for workload readiness");
        self.workload_readiness
            .wait_for_completion(client, &self.svc_workloads)
            .await?;
        self.workload_readiness
            .wait_for_completion(client, &self.app_workloads)
            .await?;

        info!(namespace = %self.namespace, "cluster ready");
        Ok(())
    }

    /// Tear the cluster down.
    ///
    /// Endpoints are deleted explicitly first so a missing one surfaces as
    /// its own `NotFound` rather than being masked by namespace deletion;
    /// the namespace delete then cascades to workloads, jobs, and claims.
    pub async fn delete(&self, client: &dyn PlatformClient) -> Result<()> {
        info!(namespace = %self.namespace, "deleting endpoints");
        for endpoint in self.svc_endpoints.iter().chain(&self.app_endpoints) {
            endpoint.delete(client).await?;
        }

        info!(namespace = %self.namespace, "deleting namespace");
        delete_namespace(client, &self.username).await?;
        Ok(())
    }

    /// List the cluster's app endpoints; the namespace must exist.
    pub async fn apps(&self, client: &dyn PlatformClient) -> Result<Vec<EndpointAddress>> {
        self.list_endpoints(client, false).await
    }

    /// List the cluster's backing-service endpoints; the namespace must exist.
    pub async fn services(&self, client: &dyn PlatformClient) -> Result<Vec<EndpointAddress>> {
        self.list_endpoints(client, true).await
    }

    async fn list_endpoints(
        &self,
        client: &dyn PlatformClient,
        backing_services: bool,
    ) -> Result<Vec<EndpointAddress>> {
        if !namespace_exists(client, &self.username).await? {
            return Err(KubeError::NotFound {
                kind: "Namespace",
                name: self.namespace.clone(),
            });
        }

        let selector = endpoint_selector(&self.username, backing_services);
        let services = client.list_services(&self.namespace, &selector).await?;

        let mut addresses: Vec<EndpointAddress> = services
            .into_iter()
            .map(|service| EndpointAddress {
                name: service.metadata.name.unwrap_or_default(),
                ports: service
                    .spec
                    .and_then(|s| s.ports)
                    .map(|ports| ports.into_iter().map(|p| p.port).collect())
                    .unwrap_or_default(),
            })
            .collect();
        addresses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(addresses)
    }
}
