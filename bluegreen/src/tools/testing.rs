//! Recording test doubles for the tool traits.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{stack_label, DeployError};

use super::{ApplyMode, ApplyOutput, AssetPublisher, CacheInvalidator, InfraApply, Tools};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    EnsureInfra,
    Apply(Option<String>, ApplyMode),
    ReadOutput(Option<String>, String),
    Preview(Option<String>),
    EnsurePublisher,
    Publish {
        dir: PathBuf,
        bucket: String,
        region: String,
    },
    Invalidate {
        distribution_id: String,
        path_pattern: String,
    },
}

/// Shared between all doubles so tests can assert on ordering across tools
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| f(c)).count()
    }
}

#[derive(Default)]
pub struct MockInfra {
    log: CallLog,
    outputs: HashMap<(String, String), String>,
    failing_applies: HashSet<String>,
    unavailable: bool,
}

impl MockInfra {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Default::default()
        }
    }

    /// Both VM stacks fully deployed
    pub fn deployed(log: &CallLog) -> Self {
        Self::new(log)
            .with_output(Some("production"), "publicIp", "192.0.2.10")
            .with_output(
                Some("production"),
                "dnsInstructions",
                "Create an A record for @ pointing at 192.0.2.10",
            )
            .with_output(Some("staging"), "publicIp", "198.51.100.7")
            .with_output(
                Some("staging"),
                "dnsInstructions",
                "Internal staging environment deployed.",
            )
    }

    /// The static site stack, selected in the working directory
    pub fn site(log: &CallLog) -> Self {
        Self::new(log)
            .with_output(None, "bucketUSWest", "blog-us-7f3a")
            .with_output(None, "bucketEUWest", "blog-eu-91bc")
            .with_output(None, "distributionId", "E2ABC")
            .with_output(None, "websiteUrl", "https://d111111abcdef8.cloudfront.net")
            .with_output(
                None,
                "usEndpoint",
                "blog-us-7f3a.s3-website-us-west-2.amazonaws.com",
            )
            .with_output(
                None,
                "euEndpoint",
                "blog-eu-91bc.s3-website-eu-west-1.amazonaws.com",
            )
    }

    pub fn with_output(mut self, stack: Option<&str>, key: &str, value: &str) -> Self {
        self.outputs
            .insert((stack_label(stack), key.to_owned()), value.to_owned());
        self
    }

    pub fn without_output(mut self, stack: Option<&str>, key: &str) -> Self {
        self.outputs.remove(&(stack_label(stack), key.to_owned()));
        self
    }

    pub fn failing_apply(mut self, stack: Option<&str>) -> Self {
        self.failing_applies.insert(stack_label(stack));
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl InfraApply for MockInfra {
    async fn ensure_available(&self) -> Result<(), DeployError> {
        self.log.push(Call::EnsureInfra);
        if self.unavailable {
            return Err(DeployError::Prerequisite("pulumi missing".into()));
        }
        Ok(())
    }

    async fn apply(
        &self,
        stack: Option<&str>,
        mode: ApplyMode,
    ) -> Result<ApplyOutput, DeployError> {
        self.log.push(Call::Apply(stack.map(str::to_owned), mode));
        if self.failing_applies.contains(&stack_label(stack)) {
            return Err(DeployError::ApplyFailure {
                stack: stack_label(stack),
                reason: "exit status: 255".into(),
            });
        }
        Ok(ApplyOutput {
            raw_output: "Resources: 4 unchanged".into(),
        })
    }

    async fn read_output(&self, stack: Option<&str>, key: &str) -> Result<String, DeployError> {
        self.log
            .push(Call::ReadOutput(stack.map(str::to_owned), key.to_owned()));
        self.outputs
            .get(&(stack_label(stack), key.to_owned()))
            .cloned()
            .ok_or_else(|| DeployError::OutputMissing {
                stack: stack_label(stack),
                key: key.to_owned(),
                reason: "no such output".into(),
            })
    }

    async fn preview(&self, stack: Option<&str>) -> Result<ApplyOutput, DeployError> {
        self.log.push(Call::Preview(stack.map(str::to_owned)));
        Ok(ApplyOutput {
            raw_output: "Resources: 4 unchanged".into(),
        })
    }
}

#[derive(Default)]
pub struct MockPublisher {
    log: CallLog,
    failing_buckets: HashSet<String>,
}

impl MockPublisher {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Default::default()
        }
    }

    pub fn failing_bucket(mut self, bucket: &str) -> Self {
        self.failing_buckets.insert(bucket.to_owned());
        self
    }
}

#[async_trait]
impl AssetPublisher for MockPublisher {
    async fn ensure_available(&self) -> Result<(), DeployError> {
        self.log.push(Call::EnsurePublisher);
        Ok(())
    }

    async fn publish(
        &self,
        local_dir: &Path,
        bucket: &str,
        region: &str,
    ) -> Result<(), DeployError> {
        self.log.push(Call::Publish {
            dir: local_dir.to_path_buf(),
            bucket: bucket.to_owned(),
            region: region.to_owned(),
        });
        if self.failing_buckets.contains(bucket) {
            return Err(DeployError::SyncFailure {
                bucket: bucket.to_owned(),
                region: region.to_owned(),
                reason: "access denied".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockInvalidator {
    log: CallLog,
    id: Option<String>,
    fail: bool,
}

impl MockInvalidator {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            id: Some("I3XYZ".into()),
            fail: false,
        }
    }

    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl CacheInvalidator for MockInvalidator {
    async fn invalidate(
        &self,
        distribution_id: &str,
        path_pattern: &str,
    ) -> Result<Option<String>, DeployError> {
        self.log.push(Call::Invalidate {
            distribution_id: distribution_id.to_owned(),
            path_pattern: path_pattern.to_owned(),
        });
        if self.fail {
            return Err(DeployError::InvalidationFailure {
                distribution_id: distribution_id.to_owned(),
                reason: "throttled".into(),
            });
        }
        Ok(self.id.clone())
    }
}

pub fn tools(infra: MockInfra, publisher: MockPublisher, invalidator: MockInvalidator) -> Tools {
    Tools {
        infra: Arc::new(infra),
        publisher: Arc::new(publisher),
        invalidator: Arc::new(invalidator),
    }
}
