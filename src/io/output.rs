use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::heuristics::DurationBucket;
use crate::models::{AnalyticsSummary, CallExecutionRecord};

/// Write any serializable value as pretty JSON
fn write_pretty_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Write the analytics summary as pretty JSON
pub fn write_summary_json(summary: &AnalyticsSummary, path: &Path) -> Result<()> {
    write_pretty_json(summary, path)
}

/// Downloadable analytics snapshot for one agent
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsExport<'a> {
    /// Export time, RFC 3339 in UTC
    pub timestamp: String,
    pub agent_id: &'a str,
    pub summary: &'a AnalyticsSummary,
}

impl<'a> AnalyticsExport<'a> {
    pub fn new(agent_id: &'a str, summary: &'a AnalyticsSummary, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            agent_id,
            summary,
        }
    }

    /// Default file name, `analytics-{agent}-{YYYY-MM-DD}.json`
    pub fn file_name(agent_id: &str, now: DateTime<Utc>) -> String {
        format!("analytics-{}-{}.json", agent_id, now.format("%Y-%m-%d"))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_pretty_json(self, path)
    }
}

/// Default file name for a raw dump of every execution of an agent
pub fn executions_file_name(agent_id: &str) -> String {
    format!("all-executions-{}.json", agent_id)
}

/// Default file name for a single execution dump
pub fn execution_file_name(execution_id: &str) -> String {
    format!("execution-{}.json", execution_id)
}

/// Write raw provider executions as pretty JSON
pub fn write_executions_json(executions: &[Value], path: &Path) -> Result<()> {
    write_pretty_json(executions, path)
}

/// Write one raw provider execution as pretty JSON
pub fn write_execution_json(execution: &Value, path: &Path) -> Result<()> {
    write_pretty_json(execution, path)
}

/// Human-readable analytics report
pub struct SummaryReport<'a> {
    summary: &'a AnalyticsSummary,
}

impl<'a> SummaryReport<'a> {
    pub fn new(summary: &'a AnalyticsSummary) -> Self {
        Self { summary }
    }

    /// Rated calls implied by the response rate, as shown on the insights card
    fn rating_responses(&self) -> usize {
        (self.summary.total_calls as f64 * self.summary.response_rate as f64 / 100.0).round()
            as usize
    }

    pub fn format(&self) -> String {
        let s = self.summary;
        let mut output = String::new();

        output.push_str("Survey Analytics\n");
        output.push_str("================\n");
        output.push_str(&format!("Total calls: {}\n", s.total_calls));
        output.push_str(&format!("Average NPS: {}/10\n", s.average_rating));
        output.push_str(&format!("Satisfaction rate: {}%\n", s.satisfaction_rate));
        output.push_str(&format!("Response rate: {}%\n", s.response_rate));

        if s.total_calls == 0 {
            output.push_str("\nNo completed calls found\n");
            return output;
        }

        output.push_str("\nNPS Rating Breakdown\n");
        output.push_str("--------------------\n");
        let rated: Vec<_> = s.rating_histogram.iter().filter(|b| b.count > 0).collect();
        if rated.is_empty() {
            output.push_str("No ratings found\n");
        }
        for bucket in rated {
            output.push_str(&format!(
                "{:>2}: {} calls ({}%)\n",
                bucket.rating, bucket.count, bucket.percent
            ));
        }

        output.push_str("\nFeedback by Category\n");
        output.push_str("--------------------\n");
        for tally in s.topic_tallies.iter().filter(|t| t.total > 0) {
            output.push_str(&format!(
                "{}: {} positive, {} negative, {} neutral ({} total)\n",
                tally.name.name(),
                tally.positive,
                tally.negative,
                tally.neutral,
                tally.total
            ));
        }

        output.push_str("\nCall Duration\n");
        output.push_str("-------------\n");
        let durations = [
            (DurationBucket::Short, s.duration_buckets.short),
            (DurationBucket::Medium, s.duration_buckets.medium),
            (DurationBucket::Long, s.duration_buckets.long),
        ];
        for (bucket, count) in durations {
            output.push_str(&format!("{}: {}\n", bucket.label(), count));
        }

        output.push_str("\nResponse Insights\n");
        output.push_str("-----------------\n");
        output.push_str(&format!("Total responses: {}\n", s.total_calls));
        output.push_str(&format!("Rating responses: {}\n", self.rating_responses()));
        output.push_str(&format!(
            "Language mix: {}E, {}H, {}B\n",
            s.language_usage.english, s.language_usage.hindi, s.language_usage.both
        ));
        output.push_str(&format!(
            "Typical call duration: {}\n",
            s.typical_duration_label()
        ));

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// One line per execution: id, phone, status, date and duration
pub fn format_call_log(records: &[CallExecutionRecord]) -> String {
    let mut output = String::new();
    for record in records {
        let date = record
            .created_at_utc()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .or_else(|| record.created_at.clone())
            .unwrap_or_else(|| "Unknown date".to_string());
        let duration = record
            .duration_seconds
            .map(format_duration)
            .unwrap_or_else(|| "--:--".to_string());
        output.push_str(&format!(
            "{}  {}  {}  {}  {}\n",
            if record.id.is_empty() { "-" } else { record.id.as_str() },
            record.phone_number.as_deref().unwrap_or("-"),
            record.status.as_str(),
            date,
            duration
        ));
    }
    output
}

/// Format seconds as MM:SS
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
