use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::DeployError;
use crate::process::{display_command, CommandRunner, StderrMode};

use super::{AssetPublisher, CacheInvalidator};

/// [`AssetPublisher`] and [`CacheInvalidator`] backed by the `aws` CLI
pub struct AwsCli {
    runner: CommandRunner,
    binary: String,
}

impl AwsCli {
    pub fn new(runner: CommandRunner, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    async fn probe(&self, args: &[&str]) -> bool {
        self.runner
            .run(&self.binary, args, StderrMode::Discard)
            .await
            .map(|out| out.success())
            .unwrap_or(false)
    }
}

/// The part of `aws cloudfront create-invalidation` output we care about
#[derive(Deserialize)]
struct CreateInvalidationResponse {
    #[serde(rename = "Invalidation")]
    invalidation: Option<InvalidationBody>,
}

#[derive(Deserialize)]
struct InvalidationBody {
    #[serde(rename = "Id")]
    id: Option<String>,
}

pub(crate) fn parse_invalidation_id(raw: &str) -> Result<Option<String>, serde_json::Error> {
    let response: CreateInvalidationResponse = serde_json::from_str(raw)?;
    Ok(response.invalidation.and_then(|i| i.id))
}

#[async_trait]
impl AssetPublisher for AwsCli {
    async fn ensure_available(&self) -> Result<(), DeployError> {
        if !self.probe(&["--version"]).await {
            return Err(DeployError::Prerequisite(
                "AWS CLI not found. Please install and configure AWS CLI.".to_owned(),
            ));
        }
        if !self.probe(&["sts", "get-caller-identity"]).await {
            return Err(DeployError::Prerequisite(
                "AWS credentials not configured. Run 'aws configure'.".to_owned(),
            ));
        }
        Ok(())
    }

    async fn publish(
        &self,
        local_dir: &Path,
        bucket: &str,
        region: &str,
    ) -> Result<(), DeployError> {
        // trailing slash: sync the directory's contents, not the directory itself
        let source = format!("{}/", local_dir.display());
        let destination = format!("s3://{bucket}");
        let args = [
            "s3",
            "sync",
            source.as_str(),
            destination.as_str(),
            "--delete",
            "--region",
            region,
        ];
        let failure = |reason: String| DeployError::SyncFailure {
            bucket: bucket.to_owned(),
            region: region.to_owned(),
            reason,
        };

        let out = self
            .runner
            .run(&self.binary, &args, StderrMode::Inherit)
            .await
            .map_err(|e| failure(format!("could not run `{}`: {e}", self.binary)))?;

        if !out.success() {
            return Err(failure(format!(
                "`{}` exited with {}",
                display_command(&self.binary, &args),
                out.status
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CacheInvalidator for AwsCli {
    async fn invalidate(
        &self,
        distribution_id: &str,
        path_pattern: &str,
    ) -> Result<Option<String>, DeployError> {
        let args = [
            "cloudfront",
            "create-invalidation",
            "--distribution-id",
            distribution_id,
            "--paths",
            path_pattern,
        ];
        let failure = |reason: String| DeployError::InvalidationFailure {
            distribution_id: distribution_id.to_owned(),
            reason,
        };

        let out = self
            .runner
            .run(&self.binary, &args, StderrMode::Inherit)
            .await
            .map_err(|e| failure(format!("could not run `{}`: {e}", self.binary)))?;

        if !out.success() {
            return Err(failure(format!(
                "`{}` exited with {}",
                display_command(&self.binary, &args),
                out.status
            )));
        }

        match parse_invalidation_id(&out.stdout) {
            Ok(id) => Ok(id),
            Err(error) => {
                warn!(%error, "could not parse invalidation response");
                Ok(None)
            }
        }
    }
}
