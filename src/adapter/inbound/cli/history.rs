//! Handler for the `history` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::HistoryArgs;
use crate::adapter::inbound::cli::snapshot::{confidence_text, label_text};
use crate::adapter::inbound::cli::{export, operator, output};
use crate::domain::DailyRegime;
use crate::error::{Error, Result};

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Regime")]
    label: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Metrics")]
    metrics: usize,
}

impl From<&DailyRegime> for DayRow {
    fn from(day: &DailyRegime) -> Self {
        Self {
            day: day.day.to_string(),
            score: output::format_score(day.total_score),
            label: label_text(day.label),
            confidence: confidence_text(day.confidence),
            metrics: day.breakdown.len(),
        }
    }
}

/// Execute the history command over the trailing `args.days`.
pub fn execute(args: &HistoryArgs) -> Result<()> {
    let days = args.days;
    let regimes = operator::operator()?.history(days)?;

    if let Some(path) = &args.export {
        let format = export::write(path, &regimes)?;
        if output::is_json() {
            output::json_output(json!({
                "command": "history",
                "days": days,
                "exported": path.display().to_string(),
                "format": format.as_str(),
                "count": regimes.len(),
            }));
        } else {
            output::success(&format!(
                "Exported {} days to {}",
                regimes.len(),
                path.display()
            ));
        }
        return Ok(());
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "history",
            "days": days,
            "regimes": serde_json::to_value(&regimes).map_err(Error::Json)?,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&format!("Last {days} days"));

    if regimes.is_empty() {
        output::note("No recorded history in this window.");
        output::hint(&format!(
            "run {} to start recording",
            output::highlight("regimewatch snapshot")
        ));
        return Ok(());
    }

    output::lines(&Table::new(regimes.iter().map(DayRow::from)).to_string());
    Ok(())
}
