//! Rename pipeline.
//!
//! list files -> build prompt -> request plan -> show plan -> confirm ->
//! create links. Network clients and the confirmation step are passed in,
//! so the same pipeline runs against stubs in tests.

use crate::core::confirm::Confirmation;
use crate::core::executor::{apply_plan, ApplyReport, LinkMode};
use crate::core::prompt::{Prompt, PromptHints};
use crate::core::requester::PlanRequester;
use crate::core::scanner::{list_files, FileList};
use crate::models::config::Config;
use crate::models::metadata::SeriesMetadata;
use crate::models::plan::RenamePlan;
use crate::Result;
use colored::Colorize;

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The input directory had no matching files; nothing was requested.
    NoFiles,
    /// The operator declined the plan.
    Cancelled(RenamePlan),
    /// The plan was applied.
    Applied {
        plan: RenamePlan,
        report: ApplyReport,
    },
}

/// Inputs of one run, taken from the resolved configuration.
pub struct Pipeline<'a> {
    config: &'a Config,
    requester: &'a dyn PlanRequester,
    confirmation: &'a dyn Confirmation,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        requester: &'a dyn PlanRequester,
        confirmation: &'a dyn Confirmation,
    ) -> Self {
        Self {
            config,
            requester,
            confirmation,
        }
    }

    fn hints(&self) -> PromptHints {
        PromptHints {
            series_name: self.config.series_name.clone(),
            year: self.config.year,
            tmdb_id: self.config.tmdb_id,
            tvdb_id: self.config.tvdb_id,
        }
    }

    /// Run every stage against the input directory.
    pub async fn run(&self, metadata: Option<&SeriesMetadata>) -> Result<Outcome> {
        let files = list_files(&self.config.input, &self.config.exts)?;
        if files.is_empty() {
            println!(
                "{} no files with extensions {} in {}",
                "[WARN]".yellow(),
                self.config.exts.join(", "),
                self.config.input.display()
            );
            return Ok(Outcome::NoFiles);
        }

        let prompt = Prompt::build(
            &self.config.input.display().to_string(),
            &files,
            metadata,
            &self.hints(),
        )?;
        tracing::debug!("User prompt:\n{}", prompt.user);

        println!("{}", "[AI] Requesting rename plan...".bold().cyan());
        let plan = self.requester.request_plan(&prompt).await?;

        println!();
        print_plan(&files, &plan);
        warn_missing(&files, &plan);
        println!();

        if !self.confirmation.confirm("Continue?").await? {
            println!("{}", "Cancelled, no links created.".yellow());
            return Ok(Outcome::Cancelled(plan));
        }

        let report = apply_plan(
            &self.config.input,
            &files,
            &plan,
            &self.config.output,
            LinkMode::from_hardlink_flag(self.config.hardlink),
        )?;

        println!(
            "{} {} links created in {}",
            "[OK]".green(),
            report.created.len(),
            self.config.output.display()
        );

        Ok(Outcome::Applied { plan, report })
    }
}

/// Print `original -> new` for every plan entry.
pub fn print_plan(files: &FileList, plan: &RenamePlan) {
    println!("{}", "[Rename Plan]".bold().green());
    for entry in &plan.files {
        match files.get(entry.index) {
            Some(original) => println!("  {} -> {}", original, entry.name.cyan()),
            None => println!(
                "  {} -> {}",
                format!("<invalid index {}>", entry.index).red(),
                entry.name
            ),
        }
    }
}

/// Warn about files the plan leaves out. They are not linked.
fn warn_missing(files: &FileList, plan: &RenamePlan) {
    let missing = plan.missing_indices(files.len());
    if missing.is_empty() {
        return;
    }

    tracing::warn!("{} files are not covered by the plan", missing.len());
    println!(
        "{}",
        format!("[WARN] {} files have no new name and will be skipped:", missing.len())
            .bold()
            .yellow()
    );
    for index in missing {
        if let Some(name) = files.get(index) {
            println!("  - {}", name);
        }
    }
}
