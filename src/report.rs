//! Scan report: the persisted JSON artifact and the console summary
//!
//! Field names and nesting are stable across runs for the same account
//! and configuration; only resource state and `scan_timestamp` vary.
//! Findings inside `waste_items` keep aggregation order (declared kind
//! order, classifier order within a kind), so two reports against
//! unchanged provider state diff cleanly.

use crate::aggregate::{Aggregated, ScanWarning, SavingsSummary};
use crate::error::Result;
use crate::finding::WasteFinding;
use crate::provider::AccountInfo;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};
use console::style;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub account_info: AccountInfo,
    pub region: String,
    pub savings_summary: SavingsSummary,
    pub waste_items: Vec<WasteFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanWarning>,
    pub price_table_version: String,
    /// ISO-8601, UTC.
    pub scan_timestamp: String,
}

impl ScanReport {
    pub fn new(
        account_info: AccountInfo,
        region: impl Into<String>,
        aggregated: Aggregated,
        price_table_version: impl Into<String>,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_info,
            region: region.into(),
            savings_summary: aggregated.summary,
            waste_items: aggregated.findings,
            warnings: aggregated.warnings,
            price_table_version: price_table_version.into(),
            scan_timestamp: scanned_at.to_rfc3339(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Render the human summary to stdout.
    pub fn print_console(&self) {
        println!(
            "\n{} account {} ({})",
            style("Scan complete:").bold(),
            style(&self.account_info.account_id).cyan(),
            self.region
        );

        if self.waste_items.is_empty() {
            println!("{}", style("No waste found.").green().bold());
        } else {
            let mut table = Table::new();
            table.set_header(vec!["Kind", "Count", "Monthly"]);
            for (kind, slice) in &self.savings_summary.breakdown {
                let cost_cell = if slice.monthly_cost == 0.0 {
                    Cell::new("$0.00").fg(comfy_table::Color::Grey)
                } else {
                    Cell::new(format!("${:.2}", slice.monthly_cost))
                };
                table.add_row(vec![
                    Cell::new(kind.describe()),
                    Cell::new(slice.count),
                    cost_cell,
                ]);
            }
            println!("{table}");

            println!(
                "\n{} {} potential monthly savings ({} annually) across {} findings",
                style("Total:").bold(),
                style(format!("${:.2}", self.savings_summary.total_monthly_savings))
                    .green()
                    .bold(),
                style(format!("${:.2}", self.savings_summary.total_annual_savings)).green(),
                self.waste_items.len()
            );
        }

        for warning in &self.warnings {
            println!("{} {}", style("WARNING:").yellow().bold(), warning.message);
        }
    }
}
