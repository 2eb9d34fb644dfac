use crate::catalog::DeviceFamilyCatalog;
use crate::db::Store;
use crate::domain::{Pod, PodDescription};
use crate::loaders::TopologyDoc;

use super::allocator::{self, AllocatorConfig};
use super::materializer;
use super::FabricError;

/// Orchestrates create-or-recreate of a pod; the only entry point that
/// mutates the persisted fabric graph.
pub struct FabricBuilder<'a> {
    store: &'a Store,
    catalog: &'a DeviceFamilyCatalog,
    allocator_config: AllocatorConfig,
}

impl<'a> FabricBuilder<'a> {
    pub fn new(store: &'a Store, catalog: &'a DeviceFamilyCatalog) -> Self {
        Self {
            store,
            catalog,
            allocator_config: AllocatorConfig::default(),
        }
    }

    pub fn with_allocator_config(mut self, cfg: AllocatorConfig) -> Self {
        self.allocator_config = cfg;
        self
    }

    /// `processFabric(podName, podDescription, recreate)`. See the decision
    /// table: create on first sight, cascade-recreate when `recreate` is
    /// set or forced by policy, otherwise update in place.
    ///
    /// The "existing pod, recreate=false, but a structural diff is
    /// detected" branch is unreachable in the source algorithm because its
    /// diff check only runs on creation. Rather than replicate that or
    /// silently widen to a recreate, this returns `FabricError::RecreateRequired`
    /// — an explicit, typed refusal that leaves the decision with the caller.
    pub async fn process_fabric(
        &self,
        pod_name: &str,
        description: &PodDescription,
        topology: &TopologyDoc,
        recreate: bool,
    ) -> Result<Pod, FabricError> {
        description
            .validate()
            .map_err(FabricError::InvalidDescription)?;
        materializer::validate_topology(self.catalog, description, topology)?;

        match self.store.get_pod_by_name(pod_name).await? {
            None => {
                tracing::info!(pod = pod_name, "creating pod");
                let pod = self.store.create_pod(pod_name, description).await?;
                self.materialize_and_allocate(&pod, topology).await
            }
            Some(existing) if recreate => {
                tracing::info!(pod = pod_name, "recreate requested, cascading delete");
                self.store.delete_pod(existing.id).await?;
                let pod = self.store.create_pod(pod_name, description).await?;
                self.materialize_and_allocate(&pod, topology).await
            }
            Some(existing) if existing.is_recreate_fabric(description) => {
                tracing::warn!(pod = pod_name, "structural diff without recreate flag");
                Err(FabricError::RecreateRequired(pod_name.to_string()))
            }
            Some(existing) => {
                tracing::debug!(pod = pod_name, "updating pod fields in place");
                self.store.update_pod(existing.id, description).await
            }
        }
    }

    async fn materialize_and_allocate(&self, pod: &Pod, topology: &TopologyDoc) -> Result<Pod, FabricError> {
        materializer::materialize(self.store, self.catalog, pod, topology).await?;
        allocator::allocate(self.store, pod, &self.allocator_config).await
    }
}
