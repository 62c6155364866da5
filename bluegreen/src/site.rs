//! Publishing the static site: a stack of regional buckets behind one CDN distribution.

use std::path::{Path, PathBuf};

use bluegreen_common::constants::{
    INVALIDATE_ALL_PATHS, OUTPUT_DISTRIBUTION_ID, OUTPUT_DNS_ZONE, OUTPUT_WEBSITE_URL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DeployError;
use crate::tools::{ApplyMode, ApplyOutput, Tools};

/// One regional bucket the build is mirrored into.
///
/// The bucket name is not known up front: it is read from the site stack's
/// `bucket_output` output on every publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTarget {
    pub label: String,
    pub bucket_output: String,
    pub region: String,
    #[serde(default)]
    pub endpoint_output: Option<String>,
}

impl BucketTarget {
    fn new(label: &str, bucket_output: &str, region: &str, endpoint_output: &str) -> Self {
        Self {
            label: label.to_owned(),
            bucket_output: bucket_output.to_owned(),
            region: region.to_owned(),
            endpoint_output: Some(endpoint_output.to_owned()),
        }
    }
}

pub fn default_buckets() -> Vec<BucketTarget> {
    vec![
        BucketTarget::new("US West", "bucketUSWest", "us-west-2", "usEndpoint"),
        BucketTarget::new("EU West", "bucketEUWest", "eu-west-1", "euEndpoint"),
    ]
}

/// A [`BucketTarget`] with its bucket name read from the stack
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedBucket {
    pub label: String,
    pub bucket: String,
    pub region: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub label: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub website_url: String,
    pub distribution_id: String,
    pub endpoints: Vec<Endpoint>,
    pub dns_zone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Invalidation {
    pub distribution_id: String,
    pub invalidation_id: Option<String>,
}

pub struct SiteWorkflow<'a> {
    tools: &'a Tools,
    stack: Option<&'a str>,
    build_dir: PathBuf,
    buckets: &'a [BucketTarget],
}

impl<'a> SiteWorkflow<'a> {
    pub fn new(
        tools: &'a Tools,
        stack: Option<&'a str>,
        build_dir: impl Into<PathBuf>,
        buckets: &'a [BucketTarget],
    ) -> Self {
        Self {
            tools,
            stack,
            build_dir: build_dir.into(),
            buckets,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Fail early on anything that would break a later step.
    ///
    /// The build directory is checked first since it is the cheapest and most common miss.
    pub async fn check_prerequisites(
        &self,
        needs_infra: bool,
        needs_build_dir: bool,
    ) -> Result<(), DeployError> {
        if needs_build_dir && !self.build_dir.is_dir() {
            return Err(DeployError::Prerequisite(format!(
                "Build directory {} not found. Build the site first.",
                self.build_dir.display()
            )));
        }

        self.tools.publisher.ensure_available().await?;
        if needs_infra {
            self.tools.infra.ensure_available().await?;
        }

        Ok(())
    }

    pub async fn apply(&self) -> Result<ApplyOutput, DeployError> {
        self.tools
            .infra
            .apply(self.stack, ApplyMode::SkipPreview)
            .await
    }

    pub async fn preview(&self) -> Result<ApplyOutput, DeployError> {
        self.tools.infra.preview(self.stack).await
    }

    /// Read every bucket name before anything is synced, so a missing output never
    /// leaves the regions out of step.
    pub async fn resolve_buckets(&self) -> Result<Vec<ResolvedBucket>, DeployError> {
        let mut resolved = Vec::with_capacity(self.buckets.len());
        for target in self.buckets {
            let bucket = self
                .tools
                .infra
                .read_output(self.stack, &target.bucket_output)
                .await?;
            resolved.push(ResolvedBucket {
                label: target.label.clone(),
                bucket,
                region: target.region.clone(),
            });
        }
        Ok(resolved)
    }

    pub async fn sync_bucket(&self, bucket: &ResolvedBucket) -> Result<(), DeployError> {
        info!(bucket = %bucket.bucket, region = %bucket.region, "syncing build directory");
        self.tools
            .publisher
            .publish(&self.build_dir, &bucket.bucket, &bucket.region)
            .await
    }

    pub async fn invalidate_all(&self) -> Result<Invalidation, DeployError> {
        let distribution_id = self
            .tools
            .infra
            .read_output(self.stack, OUTPUT_DISTRIBUTION_ID)
            .await?;
        let invalidation_id = self
            .tools
            .invalidator
            .invalidate(&distribution_id, INVALIDATE_ALL_PATHS)
            .await?;

        Ok(Invalidation {
            distribution_id,
            invalidation_id,
        })
    }

    pub async fn summary(&self) -> Result<SiteSummary, DeployError> {
        let website_url = self
            .tools
            .infra
            .read_output(self.stack, OUTPUT_WEBSITE_URL)
            .await?;
        let distribution_id = self
            .tools
            .infra
            .read_output(self.stack, OUTPUT_DISTRIBUTION_ID)
            .await?;

        let mut endpoints = Vec::new();
        for target in self.buckets {
            let Some(ref output) = target.endpoint_output else {
                continue;
            };
            let host = self.tools.infra.read_output(self.stack, output).await?;
            endpoints.push(Endpoint {
                label: target.label.clone(),
                url: format!("https://{host}"),
            });
        }

        // only present when a custom domain is configured for the stack
        let dns_zone = match self.tools.infra.read_output(self.stack, OUTPUT_DNS_ZONE).await {
            Ok(zone) if zone != "undefined" => Some(zone),
            Ok(_) => None,
            Err(error) => {
                debug!(%error, "no DNS zone output");
                None
            }
        };

        Ok(SiteSummary {
            website_url,
            distribution_id,
            endpoints,
            dns_zone,
        })
    }
}
