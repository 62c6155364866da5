use anyhow::Result;
use bluegreen::args::BluegreenArgs;
use bluegreen::{print_usage, reload_env_filter, setup_tracing, Bluegreen};
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // set up tracing with debug off. debug flag can't be enabled this early
    let env_filter_handle = setup_tracing(false);

    let matches = BluegreenArgs::command().get_matches();
    let mut args = BluegreenArgs::from_arg_matches(&matches)?;
    // store which of the args with default values were explicitly given
    for arg in ["debug", "output_mode"] {
        if matches!(
            matches.value_source(arg),
            Some(ValueSource::CommandLine | ValueSource::EnvVariable)
        ) {
            args.globals.arg_provided_fields.push(arg);
        }
    }

    // reload to enable debugging asap if given as arg or env var
    reload_env_filter(&env_filter_handle, args.globals.debug);
    tracing::debug!("bluegreen starting");

    let Some(cmd) = args.cmd else {
        print_usage();
        return Ok(());
    };

    Bluegreen::new(args.globals, Some(env_filter_handle))?
        .run(cmd)
        .await
        .map(|_| ())
}
