//! Glucose summaries and the merged report timeline.
//!
//! Pure functions over already-decrypted records; feeds the report and
//! export layers, which handle all rendering themselves. The clock is a
//! parameter so window math is testable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordType};

/// Per-owner glucose thresholds, normally read from the
/// [`SETTING_DOCTOR_TARGETS`](crate::settings::SETTING_DOCTOR_TARGETS)
/// setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlucoseTargets {
    pub target_low: f64,
    pub target_high: f64,
    pub hypo: f64,
    pub hyper: f64,
}

impl Default for GlucoseTargets {
    fn default() -> Self {
        Self { target_low: 70.0, target_high: 180.0, hypo: 70.0, hyper: 250.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSummary {
    pub avg_7d: Option<f64>,
    pub avg_14d: Option<f64>,
    pub avg_30d: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub in_range_pct: f64,
    pub hypo_count: usize,
    pub hyper_count: usize,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Summarise glucose records against the given targets.
///
/// Records without a numeric `value_mg_dl` field are ignored; window
/// averages are relative to `now`.
pub fn summarize_glucose(
    records: &[Record],
    targets: &GlucoseTargets,
    now: DateTime<Utc>,
) -> GlucoseSummary {
    let samples: Vec<(DateTime<Utc>, f64)> = records
        .iter()
        .filter(|r| r.record_type == RecordType::Glucose)
        .filter_map(|r| r.number("value_mg_dl").map(|v| (r.recorded_at, v)))
        .collect();

    if samples.is_empty() {
        return GlucoseSummary {
            avg_7d: None,
            avg_14d: None,
            avg_30d: None,
            minimum: None,
            maximum: None,
            in_range_pct: 0.0,
            hypo_count: 0,
            hyper_count: 0,
        };
    }

    let within = |days: i64| -> Vec<f64> {
        let start = now - Duration::days(days);
        samples
            .iter()
            .filter(|(at, _)| *at >= start)
            .map(|(_, v)| *v)
            .collect()
    };

    let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
    let in_range = values
        .iter()
        .filter(|v| (targets.target_low..=targets.target_high).contains(*v))
        .count();

    GlucoseSummary {
        avg_7d: mean(&within(7)),
        avg_14d: mean(&within(14)),
        avg_30d: mean(&within(30)),
        minimum: values.iter().cloned().reduce(f64::min),
        maximum: values.iter().cloned().reduce(f64::max),
        in_range_pct: in_range as f64 / values.len() as f64 * 100.0,
        hypo_count: values.iter().filter(|v| **v < targets.hypo).count(),
        hyper_count: values.iter().filter(|v| **v > targets.hyper).count(),
    }
}

/// One line of the merged report timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub recorded_at: DateTime<Utc>,
    pub kind: String,
    pub detail: String,
    pub notes: String,
}

/// Merge glucose, hba1c and event records into one timeline, newest first.
pub fn build_timeline(records: &[Record]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = records
        .iter()
        .map(|r| {
            let (kind, detail) = match r.record_type {
                RecordType::Glucose => {
                    let value = r.number("value_mg_dl").unwrap_or(0.0);
                    let context = r.text("context");
                    ("Glucose".to_string(), format!("{value} mg/dL | {context}"))
                }
                RecordType::Hba1c => {
                    let value = r.number("value_pct").unwrap_or(0.0);
                    ("HbA1c".to_string(), format!("{value} %"))
                }
                _ => {
                    let title = r.text("title");
                    let kind = if title.is_empty() { "Event" } else { title };
                    (kind.to_string(), r.text("notes").to_string())
                }
            };
            TimelineEntry {
                recorded_at: r.recorded_at,
                kind,
                detail,
                notes: r.text("notes").to_string(),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    entries
}
