//! Kubernetes client wrapper for Velero resources
//!
//! `VeleroApi` is the seam between the HTTP layer and the cluster: one call per
//! (kind, verb), scoped to the Velero namespace, with errors passed through
//! unmodified. `KubeVeleroClient` is the live implementation.

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{DeleteParams, ListParams, Patch, PatchParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config, Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};

use crate::crd::{
    Backup, BackupRepository, BackupStorageLocation, DownloadRequest, PodVolumeBackup, Restore,
    Schedule,
};
use crate::error::{Error, Result};

/// Label selecting the Velero node-agent daemonset pods
pub const NODE_AGENT_SELECTOR: &str = "name=node-agent";

/// Label linking pod volume backups to their Backup
pub const BACKUP_NAME_LABEL: &str = "velero.io/backup-name";

/// Typed CRUD operations against the Velero namespace
#[async_trait]
pub trait VeleroApi: Send + Sync {
    /// Namespace every call is scoped to
    fn namespace(&self) -> &str;

    async fn list_backups(&self) -> Result<Vec<Backup>>;
    async fn get_backup(&self, name: &str) -> Result<Backup>;
    async fn create_backup(&self, backup: &Backup) -> Result<Backup>;
    async fn delete_backup(&self, name: &str) -> Result<()>;

    async fn list_restores(&self) -> Result<Vec<Restore>>;
    async fn get_restore(&self, name: &str) -> Result<Restore>;
    async fn create_restore(&self, restore: &Restore) -> Result<Restore>;
    async fn delete_restore(&self, name: &str) -> Result<()>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>>;
    async fn get_schedule(&self, name: &str) -> Result<Schedule>;
    async fn create_schedule(&self, schedule: &Schedule) -> Result<Schedule>;
    async fn delete_schedule(&self, name: &str) -> Result<()>;

    async fn list_backup_storage_locations(&self) -> Result<Vec<BackupStorageLocation>>;
    async fn get_backup_storage_location(&self, name: &str) -> Result<BackupStorageLocation>;
    /// Apply a JSON merge patch
    async fn patch_backup_storage_location(
        &self,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<BackupStorageLocation>;

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;
    /// Delete a ConfigMap; a missing ConfigMap is not an error
    async fn delete_config_map(&self, name: &str) -> Result<()>;

    async fn list_backup_repositories(&self) -> Result<Vec<BackupRepository>>;
    async fn list_pod_volume_backups(&self, backup_name: &str) -> Result<Vec<PodVolumeBackup>>;
    async fn list_node_agent_pods(&self) -> Result<Vec<Pod>>;

    async fn create_download_request(&self, request: &DownloadRequest) -> Result<DownloadRequest>;
    async fn get_download_request(&self, name: &str) -> Result<DownloadRequest>;
}

/// Open a client from a kubeconfig file, or from in-cluster credentials when
/// no path is given
pub async fn connect(kubeconfig_path: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig_path {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::config(format!("Failed to read kubeconfig {}: {}", path.display(), e))
            })?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| Error::config(format!("Invalid kubeconfig {}: {}", path.display(), e)))?;
            info!(path = %path.display(), "Loaded kubeconfig");
            config
        }
        None => {
            let config = Config::incluster()
                .map_err(|e| Error::config(format!("Failed to load in-cluster config: {}", e)))?;
            info!("Loaded in-cluster Kubernetes config");
            config
        }
    };

    Ok(Client::try_from(config)?)
}

/// Live `VeleroApi` backed by a kube client
#[derive(Clone)]
pub struct KubeVeleroClient {
    client: Client,
    namespace: String,
}

impl KubeVeleroClient {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn list<K>(&self, params: &ListParams) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        self.api::<K>()
            .list(params)
            .await
            .map(|list| list.items)
            .map_err(|e| {
                error!(kind = %K::kind(&Default::default()), error = %e, "Error listing resources");
                e.into()
            })
    }

    async fn get<K>(&self, name: &str) -> Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        self.api::<K>().get(name).await.map_err(|e| {
            error!(kind = %K::kind(&Default::default()), name = %name, error = %e, "Error getting resource");
            e.into()
        })
    }

    async fn create<K>(&self, obj: &K) -> Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        <K as Resource>::DynamicType: Default,
    {
        self.api::<K>()
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| {
                error!(kind = %K::kind(&Default::default()), error = %e, "Error creating resource");
                e.into()
            })
    }

    async fn delete<K>(&self, name: &str) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        self.api::<K>()
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(kind = %K::kind(&Default::default()), name = %name, error = %e, "Error deleting resource");
                e.into()
            })
    }
}

#[async_trait]
impl VeleroApi for KubeVeleroClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list_backups(&self) -> Result<Vec<Backup>> {
        self.list(&ListParams::default()).await
    }

    async fn get_backup(&self, name: &str) -> Result<Backup> {
        self.get(name).await
    }

    async fn create_backup(&self, backup: &Backup) -> Result<Backup> {
        self.create(backup).await
    }

    async fn delete_backup(&self, name: &str) -> Result<()> {
        self.delete::<Backup>(name).await
    }

    async fn list_restores(&self) -> Result<Vec<Restore>> {
        self.list(&ListParams::default()).await
    }

    async fn get_restore(&self, name: &str) -> Result<Restore> {
        self.get(name).await
    }

    async fn create_restore(&self, restore: &Restore) -> Result<Restore> {
        self.create(restore).await
    }

    async fn delete_restore(&self, name: &str) -> Result<()> {
        self.delete::<Restore>(name).await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        self.list(&ListParams::default()).await
    }

    async fn get_schedule(&self, name: &str) -> Result<Schedule> {
        self.get(name).await
    }

    async fn create_schedule(&self, schedule: &Schedule) -> Result<Schedule> {
        self.create(schedule).await
    }

    async fn delete_schedule(&self, name: &str) -> Result<()> {
        self.delete::<Schedule>(name).await
    }

    async fn list_backup_storage_locations(&self) -> Result<Vec<BackupStorageLocation>> {
        self.list(&ListParams::default()).await
    }

    async fn get_backup_storage_location(&self, name: &str) -> Result<BackupStorageLocation> {
        self.get(name).await
    }

    async fn patch_backup_storage_location(
        &self,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<BackupStorageLocation> {
        self.api::<BackupStorageLocation>()
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| {
                error!(name = %name, error = %e, "Error patching BackupStorageLocation");
                e.into()
            })
    }

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        self.create(config_map).await
    }

    async fn delete_config_map(&self, name: &str) -> Result<()> {
        match self
            .api::<ConfigMap>()
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => {
                info!(name = %name, "Deleted ConfigMap");
                Ok(())
            }
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                warn!(name = %name, "ConfigMap not found, already deleted");
                Ok(())
            }
            Err(e) => {
                error!(name = %name, error = %e, "Error deleting ConfigMap");
                Err(e.into())
            }
        }
    }

    async fn list_backup_repositories(&self) -> Result<Vec<BackupRepository>> {
        self.list(&ListParams::default()).await
    }

    async fn list_pod_volume_backups(&self, backup_name: &str) -> Result<Vec<PodVolumeBackup>> {
        let selector = format!("{}={}", BACKUP_NAME_LABEL, backup_name);
        self.list(&ListParams::default().labels(&selector)).await
    }

    async fn list_node_agent_pods(&self) -> Result<Vec<Pod>> {
        self.list(&ListParams::default().labels(NODE_AGENT_SELECTOR))
            .await
    }

    async fn create_download_request(&self, request: &DownloadRequest) -> Result<DownloadRequest> {
        self.create(request).await
    }

    async fn get_download_request(&self, name: &str) -> Result<DownloadRequest> {
        self.get(name).await
    }
}
