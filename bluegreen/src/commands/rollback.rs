use anyhow::Result;

use crate::{commands::common::print_json, orchestrator::Orchestrator, Bluegreen, CommandOutput};

impl Bluegreen {
    pub fn rollback(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let plan =
            Orchestrator::rollback_plan(&self.config.production_stack, &self.config.staging_stack);

        ui.header("Rollback");
        ui.warn(&plan.summary);
        ui.step("📋", "Rollback options:");
        for (i, option) in plan.options.iter().enumerate() {
            ui.step("  ", format!("{}. {option}", i + 1));
        }
        ui.step("🔄", format!("To roll back, run: {}", plan.redeploy_command));
        ui.info("(after making sure the previous good state is ready)");
        print_json(&self.config.output_mode, &plan)?;

        Ok(CommandOutput::Rollback(plan))
    }
}
