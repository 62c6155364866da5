use anyhow::Result;

use crate::{
    commands::common::{print_json, print_outcome},
    Bluegreen, CommandOutput,
};

impl Bluegreen {
    pub async fn deploy_staging(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let orchestrator = self.orchestrator()?;
        ui.header("Deploy GREEN (staging)");
        ui.step("🚀", format!("Applying stack '{}'", orchestrator.staging().stack()));

        let outcome = orchestrator.deploy_staging().await?;

        print_outcome(&ui, &outcome);
        print_json(&self.config.output_mode, &outcome)?;

        Ok(CommandOutput::Deployment(Box::new(outcome)))
    }

    pub async fn deploy_production(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let orchestrator = self.orchestrator()?;
        ui.header("Deploy BLUE (production)");
        ui.step(
            "🔄",
            format!("Applying stack '{}'", orchestrator.production().stack()),
        );

        let outcome = orchestrator.deploy_production().await?;

        print_outcome(&ui, &outcome);
        print_json(&self.config.output_mode, &outcome)?;

        Ok(CommandOutput::Deployment(Box::new(outcome)))
    }
}
