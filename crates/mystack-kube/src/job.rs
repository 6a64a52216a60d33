//! One-shot setup job translation and lifecycle

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar as KubeEnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use mystack_core::EnvVar;

use crate::client::PlatformClient;
use crate::error::{KubeError, Result};
use crate::labels::base_labels;
use crate::namespace::namespace_name;

/// Name of the setup job inside every cluster namespace
pub const SETUP_JOB_NAME: &str = "setup";

/// One-shot batch task run once per cluster creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupJob {
    pub username: String,
    pub image: String,
    pub environment: Vec<EnvVar>,
    pub period_seconds: u32,
    pub timeout_seconds: u32,
}

impl SetupJob {
    pub fn new(
        username: &str,
        image: &str,
        environment: Vec<EnvVar>,
        period_seconds: u32,
        timeout_seconds: u32,
    ) -> Self {
        Self {
            username: username.to_string(),
            image: image.to_string(),
            environment,
            period_seconds,
            timeout_seconds,
        }
    }

    pub fn namespace(&self) -> String {
        namespace_name(&self.username)
    }

    /// Build the batch job object.
    pub fn build(&self) -> Job {
        let labels = base_labels(SETUP_JOB_NAME, &self.username);

        let env: Vec<KubeEnvVar> = self
            .environment
            .iter()
            .map(|e| KubeEnvVar {
                name: e.name.clone(),
                value: Some(e.value.clone()),
                value_from: None,
            })
            .collect();

        Job {
            metadata: ObjectMeta {
                name: Some(SETUP_JOB_NAME.to_string()),
                namespace: Some(self.namespace()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(JobSpec {
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![Container {
                            name: SETUP_JOB_NAME.to_string(),
                            image: Some(self.image.clone()),
                            env: Some(env),
                            ..Default::default()
                        }],
                        restart_policy: Some("OnFailure".to_string()),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            status: None,
        }
    }

    /// Submit the job into the owner's namespace, which must exist.
    pub async fn run(&self, client: &dyn PlatformClient) -> Result<Job> {
        let namespace = self.namespace();
        if !client.namespace_exists(&namespace).await? {
            return Err(KubeError::NotFound {
                kind: "Namespace",
                name: namespace,
            });
        }
        client.create_job(&namespace, &self.build()).await
    }

    pub async fn delete(&self, client: &dyn PlatformClient) -> Result<()> {
        client.delete_job(&self.namespace(), SETUP_JOB_NAME).await
    }
}
