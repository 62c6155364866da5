use anyhow::Result;

use crate::{
    commands::common::{print_json, print_outcome},
    Bluegreen, CommandOutput,
};

impl Bluegreen {
    pub async fn promote(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let orchestrator = self.orchestrator()?;
        ui.header("Promote GREEN to BLUE");
        ui.warn("This replaces the current production deployment!");
        // TODO: pass staging's image tag to the production stack once both stacks read it from config
        ui.step(
            "📦",
            format!(
                "Re-applying production stack '{}'",
                orchestrator.production().stack()
            ),
        );

        let promotion = orchestrator.promote().await?;

        print_outcome(&ui, &promotion.outcome);
        ui.success(format!(
            "✅ {} promoted to {}",
            promotion.record.source(),
            promotion.record.destination()
        ));
        for reminder in &promotion.reminders {
            ui.step("📝", reminder);
        }
        ui.verbose(
            "🕒",
            format!("Requested at {}", promotion.record.requested_at().to_rfc3339()),
        );
        print_json(&self.config.output_mode, &promotion)?;

        Ok(CommandOutput::Promotion(Box::new(promotion)))
    }
}
