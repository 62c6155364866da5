//! The external tools every command drives.
//!
//! The orchestrator and the site workflow only ever see these traits. The real
//! implementations shell out to `pulumi` and `aws`; tests swap in doubles.

pub mod aws;
pub mod pulumi;
#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DeployError;

pub use aws::AwsCli;
pub use pulumi::PulumiCli;

/// Whatever the infra tool printed while applying a stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutput {
    pub raw_output: String,
}

/// Whether an apply shows its preview before changing anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Preview, then apply without prompting
    WithPreview,
    /// Apply straight away
    SkipPreview,
}

/// Runs the infrastructure-as-code tool against a named stack.
///
/// A `None` stack means the stack currently selected in the working directory.
#[async_trait]
pub trait InfraApply: Send + Sync {
    /// Check the tool is installed.
    async fn ensure_available(&self) -> Result<(), DeployError>;

    /// Apply the stack. Fails with [`DeployError::ApplyFailure`] on a non-zero exit.
    async fn apply(
        &self,
        stack: Option<&str>,
        mode: ApplyMode,
    ) -> Result<ApplyOutput, DeployError>;

    /// Read one stack output. Absent or empty outputs fail with [`DeployError::OutputMissing`].
    async fn read_output(&self, stack: Option<&str>, key: &str) -> Result<String, DeployError>;

    /// Show what an apply would change, without changing anything.
    async fn preview(&self, stack: Option<&str>) -> Result<ApplyOutput, DeployError>;
}

/// Mirrors a local directory into a remote object store.
#[async_trait]
pub trait AssetPublisher: Send + Sync {
    /// Check the tool is installed and has working credentials.
    async fn ensure_available(&self) -> Result<(), DeployError>;

    /// Make `bucket` an exact copy of `local_dir`, deleting remote extras.
    async fn publish(&self, local_dir: &Path, bucket: &str, region: &str)
        -> Result<(), DeployError>;
}

/// Purges cached objects from a CDN distribution.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Returns the invalidation id when the CDN reported one.
    async fn invalidate(
        &self,
        distribution_id: &str,
        path_pattern: &str,
    ) -> Result<Option<String>, DeployError>;
}

/// The set of tools a [`crate::Bluegreen`] instance works with
#[derive(Clone)]
pub struct Tools {
    pub infra: Arc<dyn InfraApply>,
    pub publisher: Arc<dyn AssetPublisher>,
    pub invalidator: Arc<dyn CacheInvalidator>,
}
