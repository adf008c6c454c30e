//! File export of replayed history.
//!
//! `.json` paths get the same records as `history --json`; anything else is
//! written as CSV with one row per day and a score/raw column pair per metric.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::{DailyRegime, MetricId};
use crate::error::{Error, Result};

/// On-disk layout chosen from the export path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Write `regimes` to `path`, replacing any existing file.
pub fn write(path: &Path, regimes: &[DailyRegime]) -> Result<ExportFormat> {
    let format = ExportFormat::for_path(path);
    let body = match format {
        ExportFormat::Json => serde_json::to_string_pretty(regimes).map_err(Error::Json)?,
        ExportFormat::Csv => render_csv(regimes),
    };
    fs::write(path, body)?;
    Ok(format)
}

/// Render days as CSV. Metric columns follow first appearance across days;
/// a metric missing from a day leaves its cells empty.
#[must_use]
pub fn render_csv(regimes: &[DailyRegime]) -> String {
    let mut metrics: Vec<&MetricId> = Vec::new();
    for entry in regimes.iter().flat_map(|day| &day.breakdown) {
        if !metrics.contains(&&entry.metric_name) {
            metrics.push(&entry.metric_name);
        }
    }

    let mut header = vec![
        "day".to_string(),
        "label".to_string(),
        "score".to_string(),
        "confidence".to_string(),
    ];
    for metric in &metrics {
        header.push(format!("score_{metric}"));
        header.push(format!("raw_{metric}"));
    }

    let mut out = String::new();
    push_row(&mut out, &header);
    for day in regimes {
        let mut row = vec![
            day.day.to_string(),
            day.label.to_string(),
            format!("{:.4}", day.total_score),
            day.confidence.as_str().to_string(),
        ];
        for metric in &metrics {
            match day.breakdown.iter().find(|e| &e.metric_name == *metric) {
                Some(entry) => {
                    row.push(format!("{:.4}", entry.score));
                    row.push(entry.raw_value.map(|v| v.to_string()).unwrap_or_default());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        push_row(&mut out, &row);
    }
    out
}

fn push_row(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(out, "{line}");
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{BreakdownEntry, Confidence, RegimeLabel};

    fn entry(metric: &str, score: f64, raw: Option<f64>) -> BreakdownEntry {
        BreakdownEntry {
            metric_name: MetricId::new(metric),
            score,
            raw_value: raw,
            confidence: Confidence::High,
            is_fallback: false,
        }
    }

    fn day(d: u32, label: RegimeLabel, breakdown: Vec<BreakdownEntry>) -> DailyRegime {
        DailyRegime {
            day: NaiveDate::from_ymd_opt(2026, 10, d).unwrap(),
            total_score: 0.5,
            label,
            confidence: Confidence::Medium,
            breakdown,
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::for_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::for_path(Path::new("OUT.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::for_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::for_path(Path::new("out")), ExportFormat::Csv);
    }

    #[test]
    fn csv_has_a_column_pair_per_metric() {
        let days = vec![
            day(
                16,
                RegimeLabel::Bull,
                vec![entry("fear_greed_index", 1.0, Some(23.0))],
            ),
            day(
                17,
                RegimeLabel::Neutral,
                vec![
                    entry("hash_rate", -1.0, None),
                    entry("fear_greed_index", 0.0, Some(50.0)),
                ],
            ),
        ];

        let csv = render_csv(&days);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "day,label,score,confidence,score_fear_greed_index,raw_fear_greed_index,score_hash_rate,raw_hash_rate"
        );
        assert_eq!(lines[1], "2026-10-16,BULL,0.5000,MEDIUM,1.0000,23,,");
        assert_eq!(lines[2], "2026-10-17,NEUTRAL,0.5000,MEDIUM,0.0000,50,-1.0000,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_history_is_header_only() {
        assert_eq!(render_csv(&[]), "day,label,score,confidence\n");
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn write_replaces_the_target_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "stale").unwrap();

        let days = vec![day(18, RegimeLabel::Bear, vec![])];
        assert_eq!(write(&path, &days).unwrap(), ExportFormat::Json);

        let parsed: Vec<DailyRegime> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, days);
    }
}
