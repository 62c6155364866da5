//! Errors surfaced by the external tools the deployment commands drive.

/// Label used in messages when a command targets the currently selected stack.
pub const SELECTED_STACK: &str = "<selected stack>";

pub(crate) fn stack_label(stack: Option<&str>) -> String {
    stack.unwrap_or(SELECTED_STACK).to_owned()
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("apply failed for stack '{stack}': {reason}")]
    ApplyFailure { stack: String, reason: String },

    #[error("output '{key}' is missing for stack '{stack}': {reason}")]
    OutputMissing {
        stack: String,
        key: String,
        reason: String,
    },

    #[error("preview failed for stack '{stack}': {reason}")]
    PreviewFailure { stack: String, reason: String },

    #[error("sync to bucket '{bucket}' in {region} failed: {reason}")]
    SyncFailure {
        bucket: String,
        region: String,
        reason: String,
    },

    #[error("invalidation of distribution '{distribution_id}' failed: {reason}")]
    InvalidationFailure {
        distribution_id: String,
        reason: String,
    },

    #[error("prerequisite check failed: {0}")]
    Prerequisite(String),

    #[error("invalid deployment targets: {0}")]
    InvalidTargets(String),
}
