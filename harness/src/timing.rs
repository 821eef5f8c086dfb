// File: harness/src/timing.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::timing::{NAME_WIDTH, RULE_WIDTH};

/// Per-metric timing counters as reported by the agent's `/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    #[serde(default)]
    pub count: BTreeMap<String, u64>,
    #[serde(default)]
    pub total: BTreeMap<String, f64>,
    #[serde(default)]
    pub avg: BTreeMap<String, f64>,
    #[serde(default)]
    pub min: BTreeMap<String, f64>,
    #[serde(default)]
    pub max: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct TimingRow {
    name: String,
    count: u64,
    total: f64,
    avg: f64,
    min: f64,
    max: f64,
}

impl TimingReport {
    fn rows(&self) -> Vec<TimingRow> {
        let stat = |map: &BTreeMap<String, f64>, name: &str| map.get(name).copied().unwrap_or(0.0);

        let mut rows: Vec<TimingRow> = self
            .count
            .iter()
            .map(|(name, &count)| TimingRow {
                name: name.chars().take(NAME_WIDTH).collect(),
                count,
                total: stat(&self.total, name),
                avg: stat(&self.avg, name),
                min: stat(&self.min, name),
                max: stat(&self.max, name),
            })
            .collect();

        rows.sort_by(|a, b| b.total.total_cmp(&a.total));
        rows
    }
}

/// Render a timing report as a fixed-width table, heaviest metric first
pub fn format_timing(report: &TimingReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.count.len() + 3);

    lines.push(format!(
        "{:<w$} | {:>12} {:>12} {:>10} {:>10} {:>10}",
        "",
        "count",
        "total",
        "avg",
        "min",
        "max",
        w = NAME_WIDTH
    ));
    lines.push("=".repeat(RULE_WIDTH));

    for row in report.rows() {
        lines.push(format!(
            "{:<w$} | {:>12} {:>12.3} {:>10.3} {:>10.3} {:>10.3}",
            row.name,
            row.count,
            row.total,
            row.avg,
            row.min,
            row.max,
            w = NAME_WIDTH
        ));
    }

    lines.push(String::new());
    lines
}
