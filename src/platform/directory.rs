//! Remote function directory contract.
//!
//! This module defines the interface the synchronization core uses to read
//! and mutate function records on the platform, together with the
//! HTTP-backed production implementation.

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

use super::client::PlatformClient;
use super::types::{
    DeployReceipt, FunctionCreateBody, FunctionManifestPatch, FunctionMetaPatch,
    RemoteFunctionRecord, UpdateReceipt,
};

/// Remote CRUD and state-query operations for functions.
///
/// One instance is constructed per command invocation and passed by
/// parameter to the reconciler and the orchestrator; there is no hidden
/// process-wide client.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FunctionDirectory: Send + Sync {
    /// Fetches the records matching the given names in one batched query.
    ///
    /// Names with no remote record are simply absent from the result.
    async fn list_by_names(&self, names: Vec<String>) -> Result<Vec<RemoteFunctionRecord>>;

    /// Fetches every function record owned by the current account.
    async fn list_all(&self) -> Result<Vec<RemoteFunctionRecord>>;

    /// Creates a new function and returns the stored record.
    async fn create_function(&self, body: FunctionCreateBody) -> Result<RemoteFunctionRecord>;

    /// Applies a partial metadata update.
    async fn update_function_meta(
        &self,
        uuid: Uuid,
        patch: FunctionMetaPatch,
    ) -> Result<UpdateReceipt>;

    /// Applies a partial manifest update.
    async fn update_function_manifest(
        &self,
        uuid: Uuid,
        patch: FunctionManifestPatch,
    ) -> Result<UpdateReceipt>;

    /// Starts a deployment for the function.
    async fn deploy(&self, uuid: Uuid) -> Result<DeployReceipt>;

    /// Starts an undeployment for the function.
    async fn undeploy(&self, uuid: Uuid) -> Result<DeployReceipt>;

    /// Reads the current record for the function.
    async fn get_by_uuid(&self, uuid: Uuid) -> Result<RemoteFunctionRecord>;
}

/// HTTP-backed function directory.
#[derive(Debug, Clone)]
pub struct PlatformDirectory {
    /// Platform API client.
    client: PlatformClient,
}

impl PlatformDirectory {
    /// Creates a directory over the given client.
    #[must_use]
    pub const fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionDirectory for PlatformDirectory {
    async fn list_by_names(&self, names: Vec<String>) -> Result<Vec<RemoteFunctionRecord>> {
        self.client.list_functions_by_names(&names).await
    }

    async fn list_all(&self) -> Result<Vec<RemoteFunctionRecord>> {
        self.client.list_all_functions().await
    }

    async fn create_function(&self, body: FunctionCreateBody) -> Result<RemoteFunctionRecord> {
        self.client.create_function(&body).await
    }

    async fn update_function_meta(
        &self,
        uuid: Uuid,
        patch: FunctionMetaPatch,
    ) -> Result<UpdateReceipt> {
        self.client.update_function_meta(uuid, &patch).await
    }

    async fn update_function_manifest(
        &self,
        uuid: Uuid,
        patch: FunctionManifestPatch,
    ) -> Result<UpdateReceipt> {
        self.client.update_function_manifest(uuid, &patch).await
    }

    async fn deploy(&self, uuid: Uuid) -> Result<DeployReceipt> {
        self.client.deploy_function(uuid).await
    }

    async fn undeploy(&self, uuid: Uuid) -> Result<DeployReceipt> {
        self.client.undeploy_function(uuid).await
    }

    async fn get_by_uuid(&self, uuid: Uuid) -> Result<RemoteFunctionRecord> {
        self.client.get_function(uuid).await
    }
}
