use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::json;

use crate::{
    args::OutputMode,
    commands::common::{elapsed, make_spinner, print_json},
    error::DeployError,
    site::{Invalidation, ResolvedBucket, SiteSummary, SiteWorkflow},
    ui::Ui,
    Bluegreen, CommandOutput,
};

impl Bluegreen {
    /// Full static site deploy: prerequisites, apply, sync, invalidate, summary
    pub async fn publish(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let site = self.site();
        let started = Instant::now();
        ui.header("Publish static site");

        let result = self.publish_steps(&ui, &site).await;
        let (invalidation, summary) = match result {
            Ok(done) => done,
            Err(error) => {
                ui.failure(format!("Deployment failed after {}", elapsed(started)));
                return Err(error);
            }
        };

        ui.done(&format!(
            "Deployment completed successfully in {}",
            elapsed(started)
        ));
        print_json(
            &self.config.output_mode,
            &json!({ "invalidation": invalidation, "summary": summary }),
        )?;

        Ok(CommandOutput::Published {
            invalidation,
            summary,
        })
    }

    async fn publish_steps(
        &self,
        ui: &Ui,
        site: &SiteWorkflow<'_>,
    ) -> Result<(Invalidation, Option<SiteSummary>)> {
        ui.step("🔍", "Checking prerequisites...");
        site.check_prerequisites(true, true).await?;
        ui.success("✅ Prerequisites check passed");

        ui.step("☁️", "Deploying infrastructure...");
        site.apply().await?;
        ui.success("✅ Infrastructure deployment complete");

        let buckets = self.read_buckets(ui, site).await?;
        self.sync_buckets(ui, site, buckets).await?;

        let invalidation = self.create_invalidation(ui, site).await?;

        // outputs are informational once everything is live
        let summary = match site.summary().await {
            Ok(summary) => {
                print_summary(ui, &summary);
                Some(summary)
            }
            Err(error) => {
                ui.warn(format!("Failed to read deployment outputs: {error}"));
                None
            }
        };

        Ok((invalidation, summary))
    }

    pub async fn sync(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let site = self.site();
        let started = Instant::now();
        ui.header("Sync static site");

        let synced = async {
            site.check_prerequisites(false, true).await?;
            let buckets = self
                .read_buckets(&ui, &site)
                .await
                .context("run a deployment first")?;
            self.sync_buckets(&ui, &site, buckets).await
        }
        .await
        .inspect_err(|_| ui.failure(format!("Sync failed after {}", elapsed(started))))?;

        ui.done(&format!("Sync completed in {}", elapsed(started)));
        print_json(&self.config.output_mode, &synced)?;

        Ok(CommandOutput::Synced(synced))
    }

    pub async fn invalidate(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let site = self.site();
        ui.header("Invalidate CDN cache");

        site.check_prerequisites(false, false).await?;
        let invalidation = self.create_invalidation(&ui, &site).await?;
        print_json(&self.config.output_mode, &invalidation)?;

        Ok(CommandOutput::Invalidated(invalidation))
    }

    pub async fn preview(&self) -> Result<CommandOutput> {
        let ui = self.ui();
        let site = self.site();
        ui.header("Preview static site changes");

        site.check_prerequisites(true, true).await?;
        let preview = site.preview().await?;

        if self.config.output_mode == OutputMode::Json {
            print_json(
                &self.config.output_mode,
                &json!({ "preview": preview.raw_output }),
            )?;
        } else {
            print!("{}", preview.raw_output);
        }

        Ok(CommandOutput::Previewed)
    }

    async fn read_buckets(
        &self,
        ui: &Ui,
        site: &SiteWorkflow<'_>,
    ) -> Result<Vec<ResolvedBucket>, DeployError> {
        ui.step("📦", "Syncing files to buckets...");

        let spinner = make_spinner(&self.config.output_mode, "Reading bucket names...");
        let buckets = site.resolve_buckets().await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        buckets
    }

    async fn sync_buckets(
        &self,
        ui: &Ui,
        site: &SiteWorkflow<'_>,
        buckets: Vec<ResolvedBucket>,
    ) -> Result<Vec<ResolvedBucket>> {
        for bucket in &buckets {
            ui.step(
                "  ",
                format!(
                    "Syncing {} to {} bucket {} ({})",
                    site.build_dir().display(),
                    bucket.label,
                    bucket.bucket,
                    bucket.region
                ),
            );
            site.sync_bucket(bucket).await?;
        }
        ui.success("✅ Bucket sync complete");

        Ok(buckets)
    }

    async fn create_invalidation(&self, ui: &Ui, site: &SiteWorkflow<'_>) -> Result<Invalidation> {
        ui.step("🔄", "Creating CDN invalidation...");
        let invalidation = site.invalidate_all().await?;

        match invalidation.invalidation_id {
            Some(ref id) => {
                ui.step("📝", format!("Invalidation ID: {id}"));
                ui.info("Invalidation may take 10-15 minutes to complete globally");
            }
            None => ui.warn("Could not read the invalidation id (this is not critical)"),
        }
        ui.success("✅ CDN invalidation created");

        Ok(invalidation)
    }
}

fn print_summary(ui: &Ui, summary: &SiteSummary) {
    ui.header("Deployment Summary");
    ui.step("🌐", format!("Website URL: {}", summary.website_url));
    ui.step("📡", format!("CDN distribution: {}", summary.distribution_id));
    for endpoint in &summary.endpoints {
        ui.step("  ", format!("{} endpoint: {}", endpoint.label, endpoint.url));
    }
    if let Some(ref zone) = summary.dns_zone {
        ui.step("🛡️", format!("DNS zone: {zone}"));
    }
}
