//! Adapters between the HTTP layer and external systems: the Kubernetes API
//! holding Velero resources, and S3-compatible object storage

mod manifests;
mod object_store;
mod resource_modifiers;
mod velero_client;

pub use manifests::*;
pub use object_store::*;
pub use resource_modifiers::*;
pub use velero_client::*;
