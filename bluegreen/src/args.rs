use std::{
    ffi::OsString,
    io::{self, ErrorKind},
    path::PathBuf,
};

use bluegreen_common::Secret;
use clap::{
    builder::{OsStringValueParser, TypedValueParser},
    Args, Parser, Subcommand, ValueEnum,
};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::config::BluegreenConfig;

#[derive(Parser)]
#[command(version, disable_help_subcommand = true)]
pub struct BluegreenArgs {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Normal,
    Json,
}

#[derive(Args, Clone)]
#[command(next_help_heading = "Global options")]
pub struct GlobalArgs {
    /// Turn on tracing output. (WARNING: can print sensitive data)
    #[arg(global = true, long, env = "BLUEGREEN_DEBUG")]
    pub debug: bool,
    /// What format to print output in
    #[arg(
        global = true,
        long = "output",
        env = "BLUEGREEN_OUTPUT_MODE",
        default_value = "normal"
    )]
    pub output_mode: OutputMode,
    /// Stack backing the production (blue) environment
    #[arg(global = true, long, env = "BLUEGREEN_PRODUCTION_STACK")]
    pub production_stack: Option<String>,
    /// Stack backing the staging (green) environment
    #[arg(global = true, long, env = "BLUEGREEN_STAGING_STACK")]
    pub staging_stack: Option<String>,
    /// Domain production is served on
    #[arg(global = true, long, env = "BLUEGREEN_DOMAIN")]
    pub domain: Option<String>,
    /// Passphrase for the stacks' encrypted config
    #[arg(global = true, long, env = "PULUMI_CONFIG_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
    /// Stack backing the static site (defaults to the selected stack)
    #[arg(global = true, long, env = "BLUEGREEN_SITE_STACK")]
    pub site_stack: Option<String>,
    /// Directory holding the built static site
    #[arg(global = true, long, env = "BLUEGREEN_SITE_BUILD_DIR")]
    pub site_build_dir: Option<PathBuf>,
    /// Infra-as-code binary to invoke
    #[arg(global = true, long, env = "BLUEGREEN_PULUMI_BIN", hide = true)]
    pub pulumi_bin: Option<String>,
    /// Cloud CLI binary to invoke
    #[arg(global = true, long, env = "BLUEGREEN_AWS_BIN", hide = true)]
    pub aws_bin: Option<String>,

    /// Utility for knowing which of the above config fields were given as args, not used for parsing
    #[arg(skip)]
    pub arg_provided_fields: Vec<&'static str>,

    // Global args that can't be modified in config:
    #[arg(global = true, long, visible_alias = "wd", default_value = ".", value_parser = OsStringValueParser::new().try_map(parse_path))]
    pub working_directory: PathBuf,
    /// Load config.<ENV>.toml from the global config directory instead of config.toml
    #[arg(global = true, long, env = "BLUEGREEN_ENV", hide = true)]
    pub config_env: Option<String>,
    #[arg(global = true, long, short = 'v', env = "BLUEGREEN_VERBOSE")]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn into_config(self) -> BluegreenConfig {
        // For args that have default values in clap:
        //   Only set them to Some() if a value was given on the command line or env,
        //   so that the default value is not mistaken as an explicitly given arg and overrides config from files.
        BluegreenConfig {
            debug: self
                .arg_provided_fields
                .contains(&"debug")
                .then_some(self.debug),
            output_mode: self
                .arg_provided_fields
                .contains(&"output_mode")
                .then_some(self.output_mode),
            production_stack: self.production_stack,
            staging_stack: self.staging_stack,
            domain: self.domain,
            passphrase: self.passphrase.map(Secret::new),
            site_stack: self.site_stack,
            site_build_dir: self.site_build_dir,
            site_buckets: None,
            pulumi_bin: self.pulumi_bin,
            aws_bin: self.aws_bin,
        }
    }
}

/// Blue/green promotion for the blog's VM stacks, and publishing for its static site.
///
/// Production ("blue") and staging ("green") are two independent stacks. DNS cutover
/// is manual: every deploy prints the record to point at the new address.
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the staging (green) environment
    #[command(visible_alias = "deploy-green")]
    Deploy,
    /// Deploy the production (blue) environment
    #[command(visible_alias = "deploy-production")]
    DeployBlue,
    /// Promote staging to production by re-applying the production stack
    Promote,
    /// Show the options for reverting production (changes nothing)
    Rollback,
    /// Show the state of both environments
    #[command(visible_alias = "s")]
    Status,
    /// Deploy the static site: apply, sync every bucket, invalidate the CDN
    Publish,
    /// Sync the site build to every bucket
    Sync,
    /// Invalidate the whole CDN cache
    Invalidate,
    /// Preview changes to the static site stack
    Preview,
    /// Generate shell completions
    #[command(subcommand, visible_alias = "gen")]
    Generate(GenerateCommand),
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

#[derive(Subcommand)]
pub enum GenerateCommand {
    /// Generate shell completions
    Shell {
        /// The shell to generate shell completion for
        shell: Shell,
        /// Output to a file (stdout by default)
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
}

/// Helper function to parse and return the absolute path
pub fn parse_path(path: OsString) -> Result<PathBuf, io::Error> {
    dunce::canonicalize(&path).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("could not turn {path:?} into a real path: {e}"),
        )
    })
}
