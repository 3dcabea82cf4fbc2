use serde::{Deserialize, Serialize};
use log::debug;
use crate::knowledge::normalize;
use crate::request::MedicationEntry;
use super::report::DoseFinding;

pub const DEFAULT_STRENGTH_THRESHOLD: f64 = 1000.0;

/// A single per-medication dose check. Rules are evaluated in sequence and never see each other.
pub trait DoseRule: Send + Sync {
    fn check(&self, medication: &MedicationEntry, normalized_name: &str, patient_age: u8) -> Option<DoseFinding>;
}

/// Flags a sedative whose name contains `substring` when the patient is at least `min_age`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SedativeRule {
    pub substring: String,
    pub min_age: u8,
}

impl SedativeRule {
    pub fn new(substring: &str, min_age: u8) -> Self {
        Self {
            substring: normalize(substring),
            min_age,
        }
    }
}

impl DoseRule for SedativeRule {
    fn check(&self, medication: &MedicationEntry, normalized_name: &str, patient_age: u8) -> Option<DoseFinding> {
        let needle = normalize(&self.substring);
        if patient_age < self.min_age || !normalized_name.contains(needle.as_str()) {
            return None;
        }
        
        debug!("Sedative rule '{}' fired for {} at age {}", needle, medication.name, patient_age);
        Some(DoseFinding {
            drug: medication.name.clone(),
            issue: "Sedative in an older adult".to_string(),
            recommendation: format!(
                "Review need for {} in patients ≥{} years; consider non-pharmacologic sleep hygiene first.",
                needle, self.min_age
            ),
        })
    }
}

/// Flags a stated strength whose leading number exceeds `threshold`. Units are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthRule {
    pub threshold: f64,
}

impl Default for StrengthRule {
    fn default() -> Self {
        Self { threshold: DEFAULT_STRENGTH_THRESHOLD }
    }
}

impl DoseRule for StrengthRule {
    fn check(&self, medication: &MedicationEntry, _normalized_name: &str, _patient_age: u8) -> Option<DoseFinding> {
        let value = parse_leading_number(&medication.strength)?;
        if value <= self.threshold {
            return None;
        }
        
        debug!("Strength {} for {} exceeds {}", value, medication.name, self.threshold);
        Some(DoseFinding {
            drug: medication.name.clone(),
            issue: "Unusually high stated strength".to_string(),
            recommendation: format!(
                "Double-check the prescribed strength; values above {} mg often require divided doses.",
                self.threshold
            ),
        })
    }
}

/// Best-effort parse of the number a free-text strength starts with.
///
/// Leading whitespace is skipped, then the longest prefix of the form
/// `[+-]digits[.digits][(e|E)[+-]digits]` is read. `,` is never a decimal
/// separator, so `"1,500 mg"` reads as 1. Returns `None` when no digits lead.
/// Non-finite values (`"Infinity"`, or `"1e400"` which overflows) are also
/// `None`, so such strengths are skipped rather than flagged.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start().as_bytes();
    let mut end = 0;
    
    if end < s.len() && (s[end] == b'+' || s[end] == b'-') {
        end += 1;
    }
    
    let int_start = end;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    
    if end < s.len() && s[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < s.len() && s[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    
    if digits == 0 {
        return None;
    }
    
    // Exponent only counts when digits follow it
    if end < s.len() && (s[end] == b'e' || s[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < s.len() && (s[exp_end] == b'+' || s[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < s.len() && s[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    
    let prefix = std::str::from_utf8(&s[..end]).ok()?;
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Age-based checks first, then strength checks, per medication in list order.
pub fn find_dose_issues(
    rules: &[Box<dyn DoseRule>],
    medications: &[MedicationEntry],
    patient_age: u8,
) -> Vec<DoseFinding> {
    let mut issues = Vec::new();
    
    for medication in medications {
        let normalized = normalize(&medication.name);
        issues.extend(rules.iter().filter_map(|rule| rule.check(medication, &normalized, patient_age)));
    }
    
    issues
}
