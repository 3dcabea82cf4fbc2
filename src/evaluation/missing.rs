use crate::request::EvaluationRequest;

pub const MISSING_NOTES: &str = "Clinical notes not provided. Include rationale or monitoring plan.";
pub const MISSING_COMORBIDITIES: &str = "No comorbidities recorded. Confirm if the patient has notable history.";

pub fn find_missing_info(request: &EvaluationRequest) -> Vec<String> {
    let mut missing = Vec::new();
    
    if request.notes().map_or(true, |notes| notes.trim().is_empty()) {
        missing.push(MISSING_NOTES.to_string());
    }
    
    if request.patient_conditions().is_empty() {
        missing.push(MISSING_COMORBIDITIES.to_string());
    }
    
    missing
}
