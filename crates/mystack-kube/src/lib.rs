//! Mystack Kube - cluster materialization for the multi-tenant controller
//!
//! This crate turns a parsed stack description into a running set of
//! per-user resources on Kubernetes:
//! - **Resource Translation**: workloads, endpoints, setup jobs, and volume
//!   claims built from the stack description with ownership/provenance labels
//! - **Platform Capability**: one client interface with a real API-backed
//!   implementation and an in-memory fake for tests
//! - **Readiness Waiting**: blocking polling until workloads and setup jobs
//!   are usable, with a swappable instantly-ready test double
//! - **Cluster Lifecycle**: ordered create/delete of the whole aggregate

pub mod client;
pub mod cluster;
pub mod deployment;
pub mod error;
pub mod fake;
pub mod job;
pub mod labels;
pub mod namespace;
pub mod portmap;
pub mod quantity;
pub mod readiness;
pub mod service;
pub mod volume;

pub use client::{KubePlatform, PlatformClient};
pub use cluster::{Cluster, EndpointAddress};
pub use deployment::Workload;
pub use error::{KubeError, Result};
pub use fake::FakePlatform;
pub use job::{SETUP_JOB_NAME, SetupJob};
pub use labels::{
    APP_LABEL, HERITAGE, HERITAGE_LABEL, OWNER_LABEL, ROUTABLE_LABEL, SERVICE_LABEL,
};
pub use namespace::{NAMESPACE_PREFIX, namespace_name};
pub use portmap::PortMap;
pub use quantity::{CPU_REQUEST_SCALE, MEMORY_REQUEST_SCALE};
pub use readiness::{ImmediateReadiness, PollingReadiness, Readiness};
pub use service::{Endpoint, endpoint_port};
pub use volume::StackVolume;
