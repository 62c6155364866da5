use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};

use crate::{
    args::OutputMode,
    commands::common::{make_spinner, print_json},
    orchestrator::{Role, StatusReport, TargetState, TargetStatus},
    Bluegreen, CommandOutput,
};

fn status_row(status: &TargetStatus, production_url: &str) -> Vec<Cell> {
    let (colour, serves) = match status.target.role() {
        Role::Production => (Color::Blue, production_url.to_owned()),
        Role::Staging => (Color::Green, "internal only".to_owned()),
    };
    let state = match status.state {
        TargetState::Deployed(_) => Cell::new(&status.state).fg(Color::Green),
        TargetState::NotDeployed => Cell::new(&status.state).fg(Color::DarkGrey),
    };

    vec![
        Cell::new(status.target.to_string()).fg(colour),
        Cell::new(status.target.stack()),
        state,
        Cell::new(serves),
    ]
}

pub fn status_table(report: &StatusReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Environment").add_attribute(Attribute::Bold),
            Cell::new("Stack").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Serves").add_attribute(Attribute::Bold),
        ]);
    table.add_row(status_row(&report.production, &report.production_url));
    table.add_row(status_row(&report.staging, &report.production_url));
    table
}

impl Bluegreen {
    pub async fn status(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let orchestrator = self.orchestrator()?;
        ui.header("Blue-Green Deployment Status");

        let spinner = make_spinner(&self.config.output_mode, "Reading stack outputs...");
        let report = orchestrator.status().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if self.config.output_mode == OutputMode::Json {
            print_json(&self.config.output_mode, &report)?;
        } else {
            println!("{}", status_table(&report));
            ui.step("🌐", format!("Production: {}", report.production_url));
        }

        Ok(CommandOutput::Status(Box::new(report)))
    }
}
