//! Handler for the `health` command.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::{operator, output};
use crate::domain::trailing_hours;
use crate::error::Result;
use crate::port::outbound::MetricStatus;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Last Tier")]
    tier: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "OK / Failed")]
    counts: String,
    #[tabled(rename = "Last Error")]
    error: String,
}

impl From<&MetricStatus> for StatusRow {
    fn from(status: &MetricStatus) -> Self {
        Self {
            metric: status.metric.to_string(),
            tier: status.tier.to_string(),
            result: if status.success {
                output::positive("ok")
            } else {
                output::negative("failed")
            },
            latency: format!("{}ms", status.latency.as_millis()),
            counts: format!("{} / {}", status.successes, status.failures),
            error: status.error.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn status_json(status: &MetricStatus) -> serde_json::Value {
    json!({
        "metric": status.metric.as_str(),
        "tier": status.tier.as_str(),
        "success": status.success,
        "latency_ms": u64::try_from(status.latency.as_millis()).unwrap_or(u64::MAX),
        "error": status.error,
        "at": status.at.to_rfc3339(),
        "successes": status.successes,
        "failures": status.failures,
    })
}

/// Execute the health command over the trailing `hours` of audit rows.
pub fn execute(hours: u32) -> Result<()> {
    let since = trailing_hours(Utc::now(), hours);
    let statuses = operator::operator()?.health(since)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "health",
            "hours": hours,
            "metrics": statuses.iter().map(status_json).collect::<Vec<_>>(),
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&format!("Source health (last {hours}h)"));

    if statuses.is_empty() {
        output::note("No fetch attempts recorded in this window.");
        return Ok(());
    }

    output::lines(&Table::new(statuses.iter().map(StatusRow::from)).to_string());

    let failing = statuses.iter().filter(|s| !s.success).count();
    if failing > 0 {
        output::warning(&format!("{failing} metrics failed on their last attempt"));
    }
    Ok(())
}
