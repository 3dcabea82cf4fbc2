use serde::{Deserialize, Serialize};
use crate::knowledge::Severity;
use super::AdvisoryReport;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    pub n_cases: usize,
    pub interactions: SeverityCounts,
    pub dose_issues: usize,
    pub missing_info: usize,
    pub clear_cases: usize,
    pub latency_ms_mean: f64,
    pub latency_ms_max: f64,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[AdvisoryReport]) -> Self {
        let mut interactions = SeverityCounts::default();
        for finding in reports.iter().flat_map(|r| &r.interactions) {
            match finding.severity {
                Severity::Low => interactions.low += 1,
                Severity::Moderate => interactions.moderate += 1,
                Severity::High => interactions.high += 1,
            }
        }
        
        let latencies: Vec<f64> = reports.iter()
            .map(|r| r.meta.latency_ms)
            .collect();
        
        Self {
            n_cases: reports.len(),
            interactions,
            dose_issues: reports.iter().map(|r| r.dose_issues.len()).sum(),
            missing_info: reports.iter().map(|r| r.missing_info.len()).sum(),
            clear_cases: reports.iter().filter(|r| r.is_clear()).count(),
            latency_ms_mean: mean(&latencies),
            latency_ms_max: latencies.iter().cloned().fold(0.0, f64::max),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
