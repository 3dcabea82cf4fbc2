use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{AdvisoryError, AdvisoryResult, ValidationIssue};

pub const MAX_PATIENT_AGE: i64 = 120;

/// One prescribed medication as entered by the caller. All fields are free text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationEntry {
    pub name: String,
    pub strength: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
    pub duration: String,
}

impl MedicationEntry {
    #[cfg(test)]
    pub fn new(name: &str, strength: &str, dose: &str, route: &str, frequency: &str, duration: &str) -> Self {
        Self {
            name: name.to_string(),
            strength: strength.to_string(),
            dose: dose.to_string(),
            route: route.to_string(),
            frequency: frequency.to_string(),
            duration: duration.to_string(),
        }
    }
    
    fn validate(&self, index: usize, issues: &mut Vec<ValidationIssue>) {
        let fields = [
            ("name", &self.name, "Medication name is required"),
            ("strength", &self.strength, "Medication strength is required"),
            ("dose", &self.dose, "Dose information is required"),
            ("route", &self.route, "Route is required"),
            ("frequency", &self.frequency, "Frequency is required"),
            ("duration", &self.duration, "Duration is required"),
        ];
        
        for (field, value, message) in fields {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(format!("medications[{}].{}", index, field), message));
            }
        }
    }
}

/// Wire shape of a request, before boundary validation.
///
/// Every field is optional here so that a missing or non-integer value
/// surfaces as a `ValidationIssue` rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvaluationRequest {
    #[serde(default)]
    pub patient_age: Option<f64>,
    #[serde(default)]
    pub patient_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Option<Vec<MedicationEntry>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawEvaluationRequest {
    pub fn validate(self) -> AdvisoryResult<EvaluationRequest> {
        let mut issues = Vec::new();
        
        let patient_age = match self.patient_age {
            None => {
                issues.push(ValidationIssue::new("patientAge", "Patient age is required"));
                None
            }
            Some(age) if !age.is_finite() || age.fract() != 0.0 => {
                issues.push(ValidationIssue::new("patientAge", "Patient age must be an integer"));
                None
            }
            Some(age) => Some(age as i64),
        };
        
        if self.medications.is_none() {
            issues.push(ValidationIssue::new("medications", "Medications are required"));
        }
        
        match (patient_age, self.medications) {
            (Some(age), Some(medications)) if issues.is_empty() => {
                EvaluationRequest::new(age, self.patient_conditions, medications, self.notes)
            }
            (age, medications) => {
                EvaluationRequest::build(age, self.patient_conditions, medications, self.notes, issues)
            }
        }
    }
}

/// A validated, immutable evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    patient_age: u8,
    patient_conditions: Vec<String>,
    medications: Vec<MedicationEntry>,
    notes: Option<String>,
}

impl EvaluationRequest {
    /// Collects every problem with the input instead of stopping at the first one.
    pub fn new(
        patient_age: i64,
        patient_conditions: Vec<String>,
        medications: Vec<MedicationEntry>,
        notes: Option<String>,
    ) -> AdvisoryResult<Self> {
        Self::build(Some(patient_age), patient_conditions, Some(medications), notes, Vec::new())
    }
    
    /// `None` fields have already been reported in `issues` by the caller.
    fn build(
        patient_age: Option<i64>,
        patient_conditions: Vec<String>,
        medications: Option<Vec<MedicationEntry>>,
        notes: Option<String>,
        mut issues: Vec<ValidationIssue>,
    ) -> AdvisoryResult<Self> {
        if let Some(age) = patient_age {
            if !(0..=MAX_PATIENT_AGE).contains(&age) {
                issues.push(ValidationIssue::new(
                    "patientAge",
                    format!("Patient age must be between 0 and {}", MAX_PATIENT_AGE),
                ));
            }
        }
        
        for (index, condition) in patient_conditions.iter().enumerate() {
            if condition.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    format!("patientConditions[{}]", index),
                    "Condition must not be empty",
                ));
            }
        }
        
        if let Some(medications) = &medications {
            if medications.is_empty() {
                issues.push(ValidationIssue::new("medications", "At least one medication is required"));
            }
            for (index, medication) in medications.iter().enumerate() {
                medication.validate(index, &mut issues);
            }
        }
        
        match (patient_age, medications) {
            (Some(age), Some(medications)) if issues.is_empty() => Ok(Self {
                patient_age: age as u8,
                patient_conditions,
                medications,
                notes,
            }),
            _ => Err(AdvisoryError::InvalidRequest { issues }),
        }
    }
    
    pub fn patient_age(&self) -> u8 {
        self.patient_age
    }
    
    pub fn patient_conditions(&self) -> &[String] {
        &self.patient_conditions
    }
    
    pub fn medications(&self) -> &[MedicationEntry] {
        &self.medications
    }
    
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Convert one case of a request file. Shape errors become issues of that case only.
pub fn validate_case(case: serde_json::Value) -> AdvisoryResult<EvaluationRequest> {
    let raw: RawEvaluationRequest = serde_json::from_value(case).map_err(|e| AdvisoryError::InvalidRequest {
        issues: vec![ValidationIssue::new("$", format!("Malformed case: {}", e))],
    })?;
    raw.validate()
}

/// Parse either a single request object or an array of cases, validating each case on its own.
pub fn parse_requests(content: &str) -> AdvisoryResult<Vec<AdvisoryResult<EvaluationRequest>>> {
    let cases = match serde_json::from_str::<serde_json::Value>(content)? {
        serde_json::Value::Array(cases) => cases,
        case @ serde_json::Value::Object(_) => vec![case],
        _ => return Err(AdvisoryError::Validation(
            "Request file must hold a request object or an array of them".to_string()
        )),
    };
    
    Ok(cases.into_iter().map(validate_case).collect())
}

pub fn load_requests<P: AsRef<Path>>(path: P) -> AdvisoryResult<Vec<AdvisoryResult<EvaluationRequest>>> {
    let content = std::fs::read_to_string(path)?;
    parse_requests(&content)
}
