//! High-level Ramen API client
//!
//! Wraps a [`kube::Client`] with the operations the console needs: listing
//! DR policies and placement controls, and the unassign command.

use crate::error::RamenError;
use crate::resources::{DRPlacementControl, DRPolicy};
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams};
use kube::config::KubeConfigOptions;
use kube::core::{ApiResource, GroupVersionKind};
use kube::{Client, Config};

/// Annotation a DRPC places on its Placement to take over scheduling.
/// Removed again when the policy is unassigned.
pub const SCHEDULING_DISABLE_ANNOTATION: &str =
    "cluster.open-cluster-management.io/experimental-scheduling-disable";

/// High-level client for Ramen DR resources
#[derive(Clone)]
pub struct RamenClient {
    client: Client,
    /// Namespace to scope DRPC operations to; None means all namespaces
    namespace: Option<String>,
}

impl RamenClient {
    /// Connect using the inferred configuration (kubeconfig current context,
    /// or in-cluster environment)
    pub async fn connect() -> Result<Self, RamenError> {
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            namespace: None,
        })
    }

    /// Connect using a named kubeconfig context
    pub async fn from_context(context: &str) -> Result<Self, RamenError> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        };
        let config = Config::from_kubeconfig(&options).await?;
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            namespace: None,
        })
    }

    /// Scope placement-control operations to a single namespace
    ///
    /// Returns a clone of the client with the namespace applied.
    pub fn with_namespace(&self, namespace: &str) -> Self {
        Self {
            client: self.client.clone(),
            namespace: Some(namespace.to_string()),
        }
    }

    fn drpc_api(&self) -> Api<DRPlacementControl> {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    fn placement_api(&self, namespace: &str) -> Api<DynamicObject> {
        // Placement is an open-cluster-management CRD we only patch, so a
        // dynamic object is enough.
        let gvk = GroupVersionKind::gvk("cluster.open-cluster-management.io", "v1beta1", "Placement");
        let resource = ApiResource::from_gvk(&gvk);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }

    /// List all DRPolicies (cluster-scoped)
    pub async fn list_policies(&self) -> Result<Vec<DRPolicy>, RamenError> {
        let api: Api<DRPolicy> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    /// List DRPlacementControls in the configured scope
    pub async fn list_placement_controls(&self) -> Result<Vec<DRPlacementControl>, RamenError> {
        let list = self.drpc_api().list(&ListParams::default()).await?;
        Ok(list.items)
    }

    /// Unassign a single placement control
    ///
    /// Restores scheduling on the referenced Placement by dropping the
    /// takeover annotation, then deletes the DRPC. The DRPC delete is the
    /// authoritative step; the annotation patch is attempted first so the
    /// placement is never left unschedulable.
    pub async fn unassign(
        &self,
        namespace: &str,
        drpc_name: &str,
        placement_name: &str,
    ) -> Result<(), RamenError> {
        let patch = serde_json::json!({
            "metadata": {
                "annotations": { SCHEDULING_DISABLE_ANNOTATION: null }
            }
        });
        match self
            .placement_api(namespace)
            .patch(placement_name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
        {
            Ok(_) => {}
            // A placement deleted out from under us is not a failure of the
            // unassign itself.
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                tracing::warn!(
                    "placement {}/{} not found while unassigning {}",
                    namespace,
                    placement_name,
                    drpc_name
                );
            }
            Err(err) => return Err(err.into()),
        }

        let drpcs: Api<DRPlacementControl> = Api::namespaced(self.client.clone(), namespace);
        drpcs.delete(drpc_name, &DeleteParams::default()).await?;
        tracing::info!("unassigned drpc {}/{}", namespace, drpc_name);
        Ok(())
    }
}
