pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod site;
pub mod tools;
pub mod ui;

use std::sync::Arc;

use anyhow::Result;
use indoc::printdoc;
use tracing_subscriber::{fmt, prelude::*, registry, reload, EnvFilter, Registry};

use crate::{
    args::{Command, GenerateCommand, GlobalArgs},
    config::{ConfigHandler, ResolvedConfig},
    orchestrator::{DeploymentOutcome, Orchestrator, Promotion, RollbackPlan, StatusReport},
    process::CommandRunner,
    site::{Invalidation, ResolvedBucket, SiteSummary, SiteWorkflow},
    tools::{AwsCli, PulumiCli, Tools},
    ui::Ui,
};

pub use crate::error::DeployError;

pub type EnvFilterHandle = reload::Handle<EnvFilter, Registry>;

/// What a command produced, for callers that want more than the printed output
#[derive(Debug)]
pub enum CommandOutput {
    Deployment(Box<DeploymentOutcome>),
    Promotion(Box<Promotion>),
    Rollback(RollbackPlan),
    Status(Box<StatusReport>),
    Published {
        invalidation: Invalidation,
        summary: Option<SiteSummary>,
    },
    Synced(Vec<ResolvedBucket>),
    Invalidated(Invalidation),
    Previewed,
    None,
}

pub struct Bluegreen {
    config: ResolvedConfig,
    verbose: bool,
    tools: Tools,
}

impl Bluegreen {
    pub fn new(global_args: GlobalArgs, env_filter_handle: Option<EnvFilterHandle>) -> Result<Self> {
        let verbose = global_args.verbose;
        let config = ConfigHandler::new(global_args)?.config().clone();

        // Load config files and refresh the env filter based on the potentially new debug value
        if let Some(ref handle) = env_filter_handle {
            reload_env_filter(handle, config.debug);
        }

        let runner = CommandRunner::new(config.passphrase.clone())
            .with_working_dir(&config.working_directory);
        let aws = Arc::new(AwsCli::new(runner.clone(), &config.aws_bin));
        let tools = Tools {
            infra: Arc::new(PulumiCli::new(runner, &config.pulumi_bin)),
            publisher: aws.clone(),
            invalidator: aws,
        };

        Ok(Self::with_tools(config, verbose, tools))
    }

    pub fn with_tools(config: ResolvedConfig, verbose: bool, tools: Tools) -> Self {
        Self {
            config,
            verbose,
            tools,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub async fn run(&self, command: Command) -> Result<CommandOutput> {
        use Command::*;

        tracing::debug!(
            production = %self.config.production_stack,
            staging = %self.config.staging_stack,
            "dispatching command"
        );

        match command {
            Deploy => self.deploy_staging().await,
            DeployBlue => self.deploy_production().await,
            Promote => self.promote().await,
            Rollback => self.rollback(),
            Status => self.status().await,
            Publish => self.publish().await,
            Sync => self.sync().await,
            Invalidate => self.invalidate().await,
            Preview => self.preview().await,
            Generate(cmd) => match cmd {
                GenerateCommand::Shell { shell, output_file } => {
                    self.generate_completions(shell, output_file)
                }
            },
            Unknown(args) => {
                tracing::debug!(?args, "unrecognized command");
                print_usage();
                Ok(CommandOutput::None)
            }
        }
    }

    pub(crate) fn ui(&self) -> Ui {
        Ui::new(&self.config.output_mode, self.verbose)
    }

    pub(crate) fn orchestrator(&self) -> Result<Orchestrator<'_>, DeployError> {
        Orchestrator::new(
            self.tools.infra.as_ref(),
            &self.config.production_stack,
            &self.config.staging_stack,
            &self.config.domain,
        )
    }

    pub(crate) fn site(&self) -> SiteWorkflow<'_> {
        SiteWorkflow::new(
            &self.tools,
            self.config.site_stack.as_deref(),
            self.config.site_build_path(),
            &self.config.site_buckets,
        )
    }
}

/// Printed when no command, or an unknown one, is given
pub fn print_usage() {
    printdoc! {"
        Blue-Green Deployment Manager
        =============================
        Usage:
          bluegreen deploy        Deploy to GREEN (staging)
          bluegreen deploy-blue   Deploy to BLUE (production)
          bluegreen promote       Promote GREEN to BLUE
          bluegreen rollback      Rollback options
          bluegreen status        Show current status

          bluegreen publish       Deploy the static site (apply, sync, invalidate)
          bluegreen sync          Sync the site build to every bucket
          bluegreen invalidate    Invalidate the CDN cache
          bluegreen preview       Preview static site stack changes

        Workflow:
          1. deploy        -> Deploy to internal staging
          2. Test the staging environment internally
          3. deploy-blue   -> Deploy to production (or promote)
          4. Point the domain's A record at the production IP
          5. https://<domain> serves production

        Run `bluegreen --help` for all options.
    "};
}

fn env_filter(debug: bool) -> EnvFilter {
    // let the user override RUST_LOG if they want to
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("info,bluegreen=trace,bluegreen_common=trace")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for JSON output.
pub fn setup_tracing(debug: bool) -> EnvFilterHandle {
    let (filter_layer, handle) = reload::Layer::new(env_filter(debug));

    registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    handle
}

pub fn reload_env_filter(handle: &EnvFilterHandle, debug: bool) {
    if let Err(error) = handle.reload(env_filter(debug)) {
        eprintln!("Failed to reload log filter: {error}");
    }
}
