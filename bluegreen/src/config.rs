use std::path::PathBuf;

use anyhow::{Context, Result};
use bluegreen_common::{
    config::{ConfigManager, GlobalConfigManager, LocalConfigManager},
    constants::{
        APP_NAME, DEFAULT_PRODUCTION_STACK, DEFAULT_SITE_BUILD_DIR, DEFAULT_STAGING_STACK,
        LOCAL_CONFIG_FILE, LOCAL_INTERNAL_CONFIG_DIR,
    },
    Secret,
};
use serde::{Deserialize, Serialize};

use crate::{
    args::{GlobalArgs, OutputMode},
    site::{default_buckets, BucketTarget},
};

/// Domain the production stack serves when nothing else is configured
pub const DEFAULT_DOMAIN: &str = "m4nuel.blog";

/// Schema for each config file. Everything is optional.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct BluegreenConfig {
    pub debug: Option<bool>,
    pub output_mode: Option<OutputMode>,
    pub production_stack: Option<String>,
    pub staging_stack: Option<String>,
    pub domain: Option<String>,
    pub passphrase: Option<Secret<String>>,
    pub site_stack: Option<String>,
    pub site_build_dir: Option<PathBuf>,
    pub site_buckets: Option<Vec<BucketTarget>>,
    pub pulumi_bin: Option<String>,
    pub aws_bin: Option<String>,
}

impl BluegreenConfig {
    /// `Default::default()` is used for all-None config. This is used for default values when none are set.
    pub fn default_values() -> Self {
        Self {
            debug: Some(false),
            output_mode: Some(OutputMode::Normal),
            production_stack: Some(DEFAULT_PRODUCTION_STACK.to_owned()),
            staging_stack: Some(DEFAULT_STAGING_STACK.to_owned()),
            domain: Some(DEFAULT_DOMAIN.to_owned()),
            passphrase: None,
            site_stack: None,
            site_build_dir: Some(PathBuf::from(DEFAULT_SITE_BUILD_DIR)),
            site_buckets: Some(default_buckets()),
            pulumi_bin: Some("pulumi".to_owned()),
            aws_bin: Some("aws".to_owned()),
        }
    }

    /// Create a new [`BluegreenConfig`] with the values in `other` overriding the values in `self`
    pub fn merge_with(self, other: BluegreenConfig) -> Self {
        Self {
            debug: other.debug.or(self.debug),
            output_mode: other.output_mode.or(self.output_mode),
            production_stack: other.production_stack.or(self.production_stack),
            staging_stack: other.staging_stack.or(self.staging_stack),
            domain: other.domain.or(self.domain),
            passphrase: other.passphrase.or(self.passphrase),
            site_stack: other.site_stack.or(self.site_stack),
            site_build_dir: other.site_build_dir.or(self.site_build_dir),
            site_buckets: other.site_buckets.or(self.site_buckets),
            pulumi_bin: other.pulumi_bin.or(self.pulumi_bin),
            aws_bin: other.aws_bin.or(self.aws_bin),
        }
    }

    /// Assume all non-optional fields have been set and convert to more convenient type
    pub fn into_resolved(self) -> Result<ResolvedConfig> {
        Ok(ResolvedConfig {
            debug: self.debug.context("missing debug when resolving config")?,
            output_mode: self
                .output_mode
                .context("missing output_mode when resolving config")?,
            production_stack: self
                .production_stack
                .context("missing production_stack when resolving config")?,
            staging_stack: self
                .staging_stack
                .context("missing staging_stack when resolving config")?,
            domain: self.domain.context("missing domain when resolving config")?,
            passphrase: self.passphrase,
            site_stack: self.site_stack,
            site_build_dir: self
                .site_build_dir
                .context("missing site_build_dir when resolving config")?,
            site_buckets: self
                .site_buckets
                .context("missing site_buckets when resolving config")?,
            pulumi_bin: self
                .pulumi_bin
                .context("missing pulumi_bin when resolving config")?,
            aws_bin: self.aws_bin.context("missing aws_bin when resolving config")?,
            working_directory: PathBuf::from("."),
        })
    }
}

/// Same as [`BluegreenConfig`], but all non-optional fields are not options
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub debug: bool,
    pub output_mode: OutputMode,
    pub production_stack: String,
    pub staging_stack: String,
    pub domain: String,
    pub passphrase: Option<Secret<String>>,
    pub site_stack: Option<String>,
    pub site_build_dir: PathBuf,
    pub site_buckets: Vec<BucketTarget>,
    pub pulumi_bin: String,
    pub aws_bin: String,
    /// Where the stacks' projects live. Relative paths in the config resolve against it.
    pub working_directory: PathBuf,
}

impl ResolvedConfig {
    /// The site build directory, anchored at the working directory
    pub fn site_build_path(&self) -> PathBuf {
        self.working_directory.join(&self.site_build_dir)
    }
}

pub struct ConfigHandler {
    resolved: ResolvedConfig,
}

impl ConfigHandler {
    pub fn new(global_args: GlobalArgs) -> Result<Self> {
        let global = GlobalConfigManager::new(APP_NAME.to_owned(), global_args.config_env.clone())?;
        let local_internal = LocalConfigManager::new(
            global_args.working_directory.join(LOCAL_INTERNAL_CONFIG_DIR),
            "config.toml".to_owned(),
        );
        let local = LocalConfigManager::new(
            global_args.working_directory.clone(),
            LOCAL_CONFIG_FILE.to_owned(),
        );
        let working_directory = global_args.working_directory.clone();

        let mut resolved =
            Self::resolve_config(&global, &local, &local_internal, global_args.into_config())?;
        resolved.working_directory = working_directory;

        Ok(Self { resolved })
    }

    /// Read and resolve config values in the order:
    /// - Global config (~/.config/bluegreen/config.toml)
    /// - Local config (Bluegreen.toml)
    /// - Local "internal" config (.bluegreen/config.toml)
    /// - Env vars
    /// - CLI args
    fn resolve_config(
        global: &impl ConfigManager,
        local: &impl ConfigManager,
        local_internal: &impl ConfigManager,
        args_config: BluegreenConfig,
    ) -> Result<ResolvedConfig> {
        let mut config = BluegreenConfig::default_values();

        let layers = [
            open_layer(global)?,
            open_layer(local)?,
            open_layer(local_internal)?,
        ];
        for layer in layers.into_iter().flatten() {
            config = config.merge_with(layer);
        }

        config = config.merge_with(args_config);
        let resolved = config.into_resolved()?;

        tracing::debug!(config = ?resolved, "resolved config");

        Ok(resolved)
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.resolved
    }
}

/// Open one config layer. Missing files are skipped, a file that does not parse is an error.
fn open_layer(manager: &impl ConfigManager) -> Result<Option<BluegreenConfig>> {
    if !manager.exists() {
        return Ok(None);
    }
    tracing::debug!(file = %manager.path().display(), "Reading config file");

    manager.open::<BluegreenConfig>().map(Some)
}
