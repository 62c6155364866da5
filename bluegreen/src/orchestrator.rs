//! Blue/green promotion between two independently provisioned stacks.
//!
//! Production ("blue") and staging ("green") are each a complete standing
//! deployment, not a load-balanced pair. Nothing here swaps traffic: DNS cutover is
//! done by hand, so every operation ends in instructions for the operator.

use std::fmt;
use std::time::{Duration, Instant};

use bluegreen_common::constants::{OUTPUT_DNS_INSTRUCTIONS, OUTPUT_PUBLIC_IP};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::error::DeployError;
use crate::tools::{ApplyMode, InfraApply};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Production,
    Staging,
}

impl Role {
    pub fn colour(&self) -> &'static str {
        match self {
            Role::Production => "BLUE",
            Role::Staging => "GREEN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Production => write!(f, "production"),
            Role::Staging => write!(f, "staging"),
        }
    }
}

/// One of the two environments, each backed by its own stack
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    role: Role,
    stack: String,
}

impl DeploymentTarget {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.role.colour(), self.role)
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// The result of one apply against one target
#[derive(Clone, Debug, Serialize)]
pub struct DeploymentOutcome {
    pub target: DeploymentTarget,
    pub success: bool,
    pub public_address: Option<String>,
    pub instructions: Vec<String>,
    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
}

#[derive(Clone, Debug, Serialize)]
pub struct PromotionRecord {
    source: DeploymentTarget,
    destination: DeploymentTarget,
    requested_at: DateTime<Utc>,
}

impl PromotionRecord {
    pub fn new(
        source: DeploymentTarget,
        destination: DeploymentTarget,
    ) -> Result<Self, DeployError> {
        if source.role == destination.role || source.stack == destination.stack {
            return Err(DeployError::InvalidTargets(format!(
                "cannot promote '{}' onto itself",
                source.stack
            )));
        }

        Ok(Self {
            source,
            destination,
            requested_at: Utc::now(),
        })
    }

    pub fn source(&self) -> &DeploymentTarget {
        &self.source
    }

    pub fn destination(&self) -> &DeploymentTarget {
        &self.destination
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Promotion {
    pub record: PromotionRecord,
    /// Production's address before the apply, if it could be read
    pub previous_address: Option<String>,
    /// Exactly what [`Orchestrator::deploy_production`] returned
    pub outcome: DeploymentOutcome,
    pub reminders: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "address", rename_all = "snake_case")]
pub enum TargetState {
    NotDeployed,
    Deployed(String),
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::NotDeployed => write!(f, "Not deployed"),
            TargetState::Deployed(address) => write!(f, "Deployed({address})"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TargetStatus {
    pub target: DeploymentTarget,
    pub state: TargetState,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    pub production: TargetStatus,
    pub staging: TargetStatus,
    pub production_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RollbackPlan {
    pub summary: String,
    pub options: Vec<String>,
    pub redeploy_command: String,
}

pub struct Orchestrator<'a> {
    infra: &'a dyn InfraApply,
    production: DeploymentTarget,
    staging: DeploymentTarget,
    domain: String,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        infra: &'a dyn InfraApply,
        production_stack: &str,
        staging_stack: &str,
        domain: &str,
    ) -> Result<Self, DeployError> {
        if production_stack.trim().is_empty() || staging_stack.trim().is_empty() {
            return Err(DeployError::InvalidTargets(
                "stack names must not be empty".to_owned(),
            ));
        }
        if production_stack == staging_stack {
            return Err(DeployError::InvalidTargets(format!(
                "production and staging both use stack '{production_stack}'"
            )));
        }
        if domain.trim().is_empty() {
            return Err(DeployError::InvalidTargets(
                "production domain must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            infra,
            production: DeploymentTarget {
                role: Role::Production,
                stack: production_stack.to_owned(),
            },
            staging: DeploymentTarget {
                role: Role::Staging,
                stack: staging_stack.to_owned(),
            },
            domain: domain.to_owned(),
        })
    }

    pub fn production(&self) -> &DeploymentTarget {
        &self.production
    }

    pub fn staging(&self) -> &DeploymentTarget {
        &self.staging
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn production_url(&self) -> String {
        format!("https://{}", self.domain)
    }

    /// Apply a target's stack and read back its address and DNS notes.
    async fn apply_target(
        &self,
        target: &DeploymentTarget,
    ) -> Result<(String, String, Duration), DeployError> {
        let started = Instant::now();
        info!(stack = target.stack(), "applying {target}");

        let applied = self
            .infra
            .apply(Some(target.stack()), ApplyMode::WithPreview)
            .await?;
        debug!(stack = target.stack(), output = %applied.raw_output, "apply finished");

        let address = self
            .infra
            .read_output(Some(target.stack()), OUTPUT_PUBLIC_IP)
            .await?;
        let dns_instructions = self
            .infra
            .read_output(Some(target.stack()), OUTPUT_DNS_INSTRUCTIONS)
            .await?;

        Ok((address, dns_instructions, started.elapsed()))
    }

    pub async fn deploy_staging(&self) -> Result<DeploymentOutcome, DeployError> {
        let (address, dns_instructions, duration) = self.apply_target(&self.staging).await?;

        Ok(DeploymentOutcome {
            target: self.staging.clone(),
            success: true,
            instructions: vec![
                format!("Internal staging IP: {address}"),
                "This is internal staging: test it over the cloud provider's network".to_owned(),
                dns_instructions.trim().to_owned(),
            ],
            public_address: Some(address),
            duration,
        })
    }

    pub async fn deploy_production(&self) -> Result<DeploymentOutcome, DeployError> {
        let (address, dns_instructions, duration) = self.apply_target(&self.production).await?;
        let domain = &self.domain;

        Ok(DeploymentOutcome {
            target: self.production.clone(),
            success: true,
            instructions: vec![
                dns_instructions.trim().to_owned(),
                format!("Point the A record for {domain} (host @) at {address}, TTL 300"),
                format!("Production will be served at https://{domain}"),
                "If HTTPS is not up once DNS has propagated, run ~/setup-ssl.sh on the instance \
                 to issue the certificate"
                    .to_owned(),
            ],
            public_address: Some(address),
            duration,
        })
    }

    /// Re-run production's own apply.
    ///
    /// Staging's build is *not* carried over: production ends up serving whatever its
    /// own stack configuration points at. The two only match when both stacks pin the
    /// same externally managed image tag.
    pub async fn promote(&self) -> Result<Promotion, DeployError> {
        let record = PromotionRecord::new(self.staging.clone(), self.production.clone())?;

        let previous_address = match self
            .infra
            .read_output(Some(self.production.stack()), OUTPUT_PUBLIC_IP)
            .await
        {
            Ok(address) => Some(address),
            Err(error) => {
                debug!(%error, "production address unknown before promotion");
                None
            }
        };

        let outcome = self.deploy_production().await?;

        let mut reminders = vec![format!(
            "https://{} now serves the promoted environment",
            self.domain
        )];
        match (&previous_address, &outcome.public_address) {
            (Some(old), Some(new)) if old != new => reminders.push(format!(
                "Production address changed from {old} to {new}: update the A record for {}",
                self.domain
            )),
            (Some(_), Some(_)) => {
                reminders.push("Production address unchanged, no DNS update needed".to_owned())
            }
            _ => reminders.push(format!(
                "Remember to update the A record for {} if the address changed",
                self.domain
            )),
        }

        Ok(Promotion {
            record,
            previous_address,
            outcome,
            reminders,
        })
    }

    /// Operator options for reverting production. Changes nothing.
    pub fn rollback(&self) -> RollbackPlan {
        Self::rollback_plan(self.production.stack(), self.staging.stack())
    }

    /// The rollback options for a pair of stacks. Needs no valid targets and runs no tools.
    pub fn rollback_plan(production_stack: &str, staging_stack: &str) -> RollbackPlan {
        RollbackPlan {
            summary: "Rollback requires manual restoration: in this setup it means redeploying \
                      a previous version to production"
                .to_owned(),
            options: vec![
                format!(
                    "Redeploy a previous container image tag to production (stack '{}')",
                    production_stack
                ),
                "Restore from an infrastructure backup".to_owned(),
                format!(
                    "Keep current production and fix the issues in staging (stack '{}') first",
                    staging_stack
                ),
            ],
            redeploy_command: "bluegreen deploy-blue".to_owned(),
        }
    }

    /// Read both targets one after the other. A target whose address cannot be read
    /// is reported as not deployed.
    pub async fn status(&self) -> StatusReport {
        let production = self.target_status(&self.production).await;
        let staging = self.target_status(&self.staging).await;

        StatusReport {
            production,
            staging,
            production_url: self.production_url(),
        }
    }

    async fn target_status(&self, target: &DeploymentTarget) -> TargetStatus {
        let state = match self
            .infra
            .read_output(Some(target.stack()), OUTPUT_PUBLIC_IP)
            .await
        {
            Ok(address) => TargetState::Deployed(address),
            Err(error) => {
                debug!(%error, stack = target.stack(), "treating target as not deployed");
                TargetState::NotDeployed
            }
        };

        TargetStatus {
            target: target.clone(),
            state,
        }
    }
}
