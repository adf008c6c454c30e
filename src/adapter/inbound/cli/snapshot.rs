//! Handler for the `snapshot` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::{operator, output};
use crate::domain::{BreakdownEntry, Confidence, RegimeLabel, Snapshot};
use crate::error::{Error, Result};

#[derive(Tabled)]
pub(super) struct BreakdownRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    raw: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Source")]
    source: &'static str,
}

impl From<&BreakdownEntry> for BreakdownRow {
    fn from(entry: &BreakdownEntry) -> Self {
        let source = match (entry.confidence, entry.is_fallback) {
            (Confidence::Low, _) => "unavailable",
            (_, true) => "backup",
            (_, false) => "primary",
        };
        Self {
            metric: entry.metric_name.to_string(),
            raw: output::format_raw(entry.raw_value),
            score: output::format_score(entry.score),
            confidence: entry.confidence.to_string(),
            source,
        }
    }
}

/// Render a breakdown as a table string.
pub(super) fn breakdown_table(entries: &[BreakdownEntry]) -> String {
    Table::new(entries.iter().map(BreakdownRow::from)).to_string()
}

/// Color a regime label by direction.
pub(super) fn label_text(label: RegimeLabel) -> String {
    match label {
        RegimeLabel::Bull => output::positive(label),
        RegimeLabel::Bear => output::negative(label),
        RegimeLabel::Neutral => output::highlight(label),
    }
}

/// Execute the snapshot command: one full fetch cycle.
pub async fn execute() -> Result<()> {
    let service = operator::operator()?;

    let pb = output::spinner(&format!("Fetching {} metrics", service.metric_count()));
    let result = service.snapshot().await;
    match &result {
        Ok(_) => output::spinner_success(&pb, "Cycle complete"),
        Err(Error::Interrupted) => output::spinner_fail(&pb, "Interrupted"),
        Err(e) => output::spinner_fail(&pb, &format!("Cycle failed: {e}")),
    }

    render(&result?)
}

fn render(snapshot: &Snapshot) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "snapshot",
            "snapshot": serde_json::to_value(snapshot).map_err(Error::Json)?,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        println!("{} {:+.2}", snapshot.label, snapshot.total_score);
        return Ok(());
    }

    output::header(&snapshot.engine_version);
    output::field("Regime", label_text(snapshot.label));
    output::field(
        "Score",
        output::signed(snapshot.total_score, output::format_score(snapshot.total_score)),
    );
    output::field("Confidence", confidence_text(snapshot.confidence));
    output::field("Timestamp", snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));

    output::section("Breakdown");
    output::lines(&breakdown_table(&snapshot.breakdown));

    let degraded = snapshot
        .breakdown
        .iter()
        .filter(|e| e.confidence == Confidence::Low)
        .count();
    if degraded > 0 {
        output::warning(&format!(
            "{degraded} of {} metrics unavailable, scored as neutral",
            snapshot.breakdown.len()
        ));
        output::hint(&format!(
            "run {} to see the last error per source",
            output::highlight("regimewatch health")
        ));
    }
    Ok(())
}

pub(super) fn confidence_text(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => output::positive(confidence),
        Confidence::Medium => confidence.to_string(),
        Confidence::Low => output::negative(confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricId;

    fn entry(confidence: Confidence, is_fallback: bool) -> BreakdownEntry {
        BreakdownEntry {
            metric_name: MetricId::new("funding_rate"),
            score: -1.5,
            raw_value: Some(0.0002),
            confidence,
            is_fallback,
        }
    }

    #[test]
    fn rows_name_the_source_tier() {
        assert_eq!(BreakdownRow::from(&entry(Confidence::High, false)).source, "primary");
        assert_eq!(BreakdownRow::from(&entry(Confidence::Medium, true)).source, "backup");
        assert_eq!(BreakdownRow::from(&entry(Confidence::Low, true)).source, "unavailable");
    }

    #[test]
    fn table_lists_every_metric() {
        let table = breakdown_table(&[entry(Confidence::High, false)]);
        assert!(table.contains("Metric"));
        assert!(table.contains("funding_rate"));
        assert!(table.contains("-1.50"));
    }
}
