use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::knowledge::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionFinding {
    pub drugs: Vec<String>,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseFinding {
    pub drug: String,
    pub issue: String,
    pub recommendation: String,
}

/// Everything a strategy observed about one request, before metadata is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub interactions: Vec<InteractionFinding>,
    pub dose_issues: Vec<DoseFinding>,
    pub missing_info: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryReport {
    pub interactions: Vec<InteractionFinding>,
    pub dose_issues: Vec<DoseFinding>,
    pub missing_info: Vec<String>,
    pub meta: ReportMeta,
}

impl AdvisoryReport {
    pub fn from_findings(findings: Findings, meta: ReportMeta) -> Self {
        Self {
            interactions: findings.interactions,
            dose_issues: findings.dose_issues,
            missing_info: findings.missing_info,
            meta,
        }
    }
    
    /// Compares findings only; timestamps and latency are ignored.
    pub fn findings_eq(&self, other: &AdvisoryReport) -> bool {
        self.interactions == other.interactions
            && self.dose_issues == other.dose_issues
            && self.missing_info == other.missing_info
    }
    
    pub fn highest_severity(&self) -> Option<Severity> {
        self.interactions.iter().map(|i| i.severity).max()
    }
    
    pub fn is_clear(&self) -> bool {
        self.interactions.is_empty() && self.dose_issues.is_empty() && self.missing_info.is_empty()
    }
}

/// Round to two decimal places and clamp at zero.
pub fn round_latency(ms: f64) -> f64 {
    ((ms * 100.0).round() / 100.0).max(0.0)
}
