//! Persistent volume claims backing declared stack volumes

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

use mystack_core::VolumeConfig;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::labels::base_labels;
use crate::namespace::namespace_name;
use crate::quantity::validate;

/// Named persistent volume request of a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackVolume {
    pub username: String,
    pub name: String,
    pub storage: String,
}

impl StackVolume {
    pub fn from_config(username: &str, config: &VolumeConfig) -> Result<Self> {
        validate(&config.storage)?;
        Ok(Self {
            username: username.to_string(),
            name: config.name.clone(),
            storage: config.storage.clone(),
        })
    }

    pub fn namespace(&self) -> String {
        namespace_name(&self.username)
    }

    /// Build the volume claim; workloads reference it by the volume name.
    pub fn build(&self) -> PersistentVolumeClaim {
        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace()),
                labels: Some(base_labels(&self.name, &self.username)),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(vec!["ReadWriteOnce".to_string()]),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(BTreeMap::from([(
                        "storage".to_string(),
                        Quantity(self.storage.clone()),
                    )])),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: None,
        }
    }

    pub async fn create(&self, client: &dyn PlatformClient) -> Result<PersistentVolumeClaim> {
        client.create_volume_claim(&self.namespace(), &self.build()).await
    }
}
