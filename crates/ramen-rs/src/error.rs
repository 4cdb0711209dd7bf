//! Error type for Ramen API operations

use thiserror::Error;

/// Errors returned by [`crate::RamenClient`] operations
#[derive(Debug, Error)]
pub enum RamenError {
    /// A Kubernetes API call failed
    #[error("kubernetes api error: {0}")]
    Api(#[from] kube::Error),

    /// The kubeconfig could not be read or the requested context is invalid
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Neither a kubeconfig nor an in-cluster environment was found
    #[error("cluster configuration error: {0}")]
    Infer(#[from] kube::config::InferConfigError),
}
