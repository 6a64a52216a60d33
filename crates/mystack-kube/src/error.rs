//! Error types for mystack-kube

use thiserror::Error;

/// Result type for cluster operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while materializing or tearing down a cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The platform reports a duplicate object on create
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// The platform reports a missing object on an operation that requires
    /// prior existence
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: &'static str, name: String },

    /// A probed workload or setup job missed its readiness deadline
    #[error("timed out waiting for \"{name}\" to become ready")]
    ReadinessTimeout { name: String },

    /// A port string is neither an integer nor an `int:int` pair
    #[error("invalid port mapping \"{value}\"")]
    InvalidPortMapping { value: String },

    /// A resource quantity does not use the canonical suffix syntax
    #[error("invalid quantity \"{value}\"")]
    InvalidQuantity { value: String },

    /// Stack configuration error
    #[error(transparent)]
    Config(#[from] mystack_core::ConfigError),

    /// Config registry error
    #[error(transparent)]
    Store(#[from] mystack_store::StoreError),
}

impl KubeError {
    /// Check if this is a missing-object error (typed or raw API 404)
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::NotFound { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }

    /// Check if this is a conflict error (typed or raw API 409)
    pub fn is_conflict(&self) -> bool {
        match self {
            KubeError::AlreadyExists { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 409,
            _ => false,
        }
    }

    /// Translate a raw API error for a named object into the typed
    /// conflict/missing kinds, passing everything else through.
    pub(crate) fn from_api(kind: &'static str, name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref resp) if resp.code == 404 => KubeError::NotFound {
                kind,
                name: name.to_string(),
            },
            kube::Error::Api(ref resp) if resp.code == 409 => KubeError::AlreadyExists {
                kind,
                name: name.to_string(),
            },
            other => KubeError::Api(other),
        }
    }
}
