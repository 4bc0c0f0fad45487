//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use humantime_serde::re::humantime;
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use zrotate_domain::{Dataset, Tier, TierHistory, Topology};
use zrotate_engine::{RunReport, TierHistories};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of a run.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(report
                .destroyed
                .iter()
                .map(|name| format!("-{}", name))
                .chain(report.created.iter().map(|name| format!("+{}", name)))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_report_table(&self, report: &RunReport) -> String {
        let verb = |done: &'static str, planned: &'static str| if report.dry_run { planned } else { done };

        let actions = report.destroyed.len()
            + report.created.len()
            + report.scrubs_started.len()
            + report.scrubs_running.len();

        let mut builder = Builder::default();
        builder.push_record(["Action", "Target"]);
        for name in &report.destroyed {
            builder.push_record([verb("destroyed", "would destroy"), name.as_str()]);
        }
        for name in &report.created {
            builder.push_record([verb("created", "would create"), name.as_str()]);
        }
        for pool in &report.scrubs_started {
            builder.push_record([verb("scrub started", "would scrub"), pool.as_str()]);
        }
        for pool in &report.scrubs_running {
            builder.push_record(["scrub running", pool.as_str()]);
        }

        let mut sections = Vec::new();
        if actions > 0 {
            sections.push(self.table(builder));
        } else {
            sections.push(self.info("Nothing to do."));
        }

        for message in &report.schedule_errors {
            sections.push(self.warning(&format!("Schedule skipped: {}", message)));
        }
        for failure in &report.failures {
            sections.push(self.error(&format!(
                "{} {} failed: {}",
                failure.operation, failure.target, failure.reason
            )));
        }

        let totals = format!(
            "{} created, {} destroyed, {} scrub(s) started in {}ms",
            report.total_created(),
            report.total_destroyed(),
            report.scrubs_started.len(),
            report.runtime_ms
        );
        if report.has_failures() {
            sections.push(self.warning(&format!("{} ({} failure(s))", totals, report.failures.len())));
        } else {
            sections.push(self.success(&totals));
        }

        sections.join("\n")
    }

    /// Format the configured datasets, tiers and pools.
    pub fn format_topology(&self, topology: &Topology, problems: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "datasets": topology.datasets().iter().map(|d| json!({
                        "id": d.id,
                        "name": d.name,
                        "recursive": d.recursive,
                    })).collect::<Vec<_>>(),
                    "tiers": topology.tiers().iter().map(|t| json!({
                        "name": t.name,
                        "snapshot": t.naming.as_str(),
                        "format": t.schedule.format(),
                        "time": t.schedule.time(),
                        "keep": t.keep,
                        "interval_secs": t.interval.as_secs(),
                        "datasets": t.datasets,
                    })).collect::<Vec<_>>(),
                    "pools": topology.pools().iter().map(|p| json!({
                        "name": p.name,
                        "format": p.scrub.format(),
                        "time": p.scrub.time(),
                    })).collect::<Vec<_>>(),
                    "problems": problems,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(problems.join("\n")),
            OutputFormat::Table => {
                let mut sections = Vec::new();

                let mut datasets = Builder::default();
                datasets.push_record(["Id", "Dataset", "Recursive"]);
                for dataset in topology.datasets() {
                    datasets.push_record([
                        dataset.id.as_str(),
                        dataset.name.as_str(),
                        if dataset.recursive { "yes" } else { "no" },
                    ]);
                }
                sections.push(self.table(datasets));

                let mut tiers = Builder::default();
                tiers.push_record(["Tier", "Snapshot", "Schedule", "Keep", "Interval", "Datasets"]);
                for tier in topology.tiers() {
                    tiers.push_record([
                        tier.name.clone(),
                        tier.naming.to_string(),
                        format!("{} = {}", tier.schedule.format(), tier.schedule.time()),
                        tier.keep.to_string(),
                        humantime::format_duration(tier.interval).to_string(),
                        tier.datasets.join(", "),
                    ]);
                }
                sections.push(self.table(tiers));

                if !topology.pools().is_empty() {
                    let mut pools = Builder::default();
                    pools.push_record(["Pool", "Scrub"]);
                    for pool in topology.pools() {
                        pools.push_record([
                            pool.name.clone(),
                            format!("{} = {}", pool.scrub.format(), pool.scrub.time()),
                        ]);
                    }
                    sections.push(self.table(pools));
                }

                if problems.is_empty() {
                    sections.push(self.success("Configuration is valid."));
                } else {
                    for problem in problems {
                        sections.push(self.error(problem));
                    }
                }

                Ok(sections.join("\n"))
            }
        }
    }

    /// Format the resolved tier histories.
    pub fn format_histories(&self, topology: &Topology, histories: &TierHistories) -> Result<String> {
        let rows = history_rows(topology, histories);

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&histories_value(&rows))?),
            OutputFormat::Quiet => Ok(rows
                .iter()
                .flat_map(|(_, _, history)| history.iter().map(|s| s.full_name()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No tiers configured.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Tier", "Dataset", "Count", "Keep", "Oldest", "Latest"]);
                for (tier, dataset, history) in &rows {
                    let count = if history.len() > tier.keep {
                        self.colorize(&history.len().to_string(), "red")
                    } else {
                        history.len().to_string()
                    };
                    builder.push_record([
                        tier.name.clone(),
                        dataset.name.clone(),
                        count,
                        tier.keep.to_string(),
                        history.oldest().map(|s| s.tag.clone()).unwrap_or_else(|| "-".to_string()),
                        history.latest().map(|s| s.tag.clone()).unwrap_or_else(|| "-".to_string()),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format the histories together with the planned run.
    pub fn format_status(&self, topology: &Topology, histories: &TierHistories, plan: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "histories": histories_value(&history_rows(topology, histories)),
                    "plan": plan,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table | OutputFormat::Quiet => {
                let sections = [
                    self.format_histories(topology, histories)?,
                    self.format_report(plan)?,
                ];
                Ok(sections
                    .into_iter()
                    .filter(|section| !section.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

type HistoryRow<'a> = (&'a Tier, &'a Dataset, &'a TierHistory);

fn history_rows<'a>(topology: &'a Topology, histories: &'a TierHistories) -> Vec<HistoryRow<'a>> {
    let mut rows = Vec::new();
    for tier in topology.tiers() {
        for dataset in topology.tier_datasets(tier) {
            if let Some(history) = histories.get(&tier.name, &dataset.name) {
                rows.push((tier, dataset, history));
            }
        }
    }
    rows
}

fn histories_value(rows: &[HistoryRow<'_>]) -> serde_json::Value {
    rows.iter()
        .map(|(tier, dataset, history)| {
            json!({
                "tier": tier.name,
                "dataset": dataset.name,
                "keep": tier.keep,
                "snapshots": history.iter().map(|s| json!({
                    "tag": s.tag,
                    "timestamp": s.timestamp,
                })).collect::<Vec<_>>(),
            })
        })
        .collect()
}
