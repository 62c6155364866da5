use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use bluegreen_common::constants::APP_NAME;
use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::{args::BluegreenArgs, Bluegreen, CommandOutput};

impl Bluegreen {
    pub fn generate_completions(
        &self,
        shell: Shell,
        output_file: Option<PathBuf>,
    ) -> Result<CommandOutput> {
        let mut app = BluegreenArgs::command();
        let mut output = Vec::new();

        generate(shell, &mut app, APP_NAME, &mut output);
        match output_file {
            Some(path) => fs::File::create(&path)
                .and_then(|mut f| f.write_all(&output))
                .with_context(|| format!("failed to write completions to {}", path.display()))?,
            None => io::stdout().write_all(&output)?,
        };

        Ok(CommandOutput::None)
    }
}
