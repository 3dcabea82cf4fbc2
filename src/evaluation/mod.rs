pub mod dose;
pub mod interactions;
pub mod missing;
pub mod report;
pub mod summary;

use std::time::Instant;
use chrono::Utc;
use log::debug;
use crate::config::EngineConfig;
use crate::error::AdvisoryResult;
use crate::knowledge::KnowledgeTable;
use crate::request::EvaluationRequest;

pub use dose::DoseRule;
pub use report::*;
pub use summary::*;

/// An evaluation strategy. Implementations must be pure functions of the request.
pub trait AdvisoryStrategy: Send + Sync {
    fn identifier(&self) -> &str;
    fn assess(&self, request: &EvaluationRequest) -> Findings;
}

/// The static-rules strategy: knowledge-table interactions, dose rules and missing-information checks.
pub struct RuleEngine {
    model: String,
    table: KnowledgeTable,
    dose_rules: Vec<Box<dyn DoseRule>>,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> AdvisoryResult<Self> {
        config.validate()?;
        
        let table = KnowledgeTable::new(config.interactions)?;
        
        // Age-based rules run before strength rules for each medication
        let mut dose_rules: Vec<Box<dyn DoseRule>> = Vec::new();
        for sedative in config.sedatives {
            dose_rules.push(Box::new(sedative));
        }
        dose_rules.push(Box::new(config.strength));
        
        debug!(
            "Rule engine '{}' ready: {} interaction rule(s), {} dose rule(s)",
            config.model, table.len(), dose_rules.len()
        );
        
        Ok(Self {
            model: config.model,
            table,
            dose_rules,
        })
    }
    
    pub fn table(&self) -> &KnowledgeTable {
        &self.table
    }
}

impl AdvisoryStrategy for RuleEngine {
    fn identifier(&self) -> &str {
        &self.model
    }
    
    fn assess(&self, request: &EvaluationRequest) -> Findings {
        Findings {
            interactions: interactions::find_interactions(&self.table, request.medications()),
            dose_issues: dose::find_dose_issues(&self.dose_rules, request.medications(), request.patient_age()),
            missing_info: missing::find_missing_info(request),
        }
    }
}

/// Run one strategy against one request and attach timing metadata.
pub fn evaluate(strategy: &dyn AdvisoryStrategy, request: &EvaluationRequest) -> AdvisoryReport {
    let started = Instant::now();
    let findings = strategy.assess(request);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    
    let meta = ReportMeta {
        generated_at: Utc::now(),
        model: strategy.identifier().to_string(),
        latency_ms: round_latency(elapsed_ms),
    };
    
    debug!(
        "Evaluated {} medication(s) in {:.2} ms: {} interaction(s), {} dose issue(s), {} missing",
        request.medications().len(),
        meta.latency_ms,
        findings.interactions.len(),
        findings.dose_issues.len(),
        findings.missing_info.len()
    );
    
    AdvisoryReport::from_findings(findings, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{InteractionRule, Severity};
    use crate::request::MedicationEntry;
    use super::interactions::DUPLICATE_THERAPY_DESCRIPTION;
    use super::missing::{MISSING_COMORBIDITIES, MISSING_NOTES};
    
    fn med(name: &str, strength: &str) -> MedicationEntry {
        MedicationEntry::new(name, strength, "1 tab", "oral", "bd", "7 days")
    }
    
    fn engine() -> RuleEngine {
        RuleEngine::new(EngineConfig::default()).unwrap()
    }
    
    fn request(age: i64, meds: Vec<MedicationEntry>) -> EvaluationRequest {
        EvaluationRequest::new(age, vec!["CKD stage 3".to_string()], meds, Some("Reviewed on ward round.".to_string())).unwrap()
    }
    
    #[test]
    fn test_full_report() {
        let engine = engine();
        let request = EvaluationRequest::new(
            72,
            vec![],
            vec![
                med("Aspirin", "75"),
                med("Warfarin", "5"),
                med("Zopiclone", "7.5"),
                med("Paracetamol", "500"),
                med("paracetamol", "1500"),
            ],
            None,
        ).unwrap();
        
        let report = evaluate(&engine, &request);
        
        assert_eq!(report.interactions.len(), 2);
        assert_eq!(report.interactions[0].severity, Severity::High);
        assert_eq!(report.interactions[1].drugs, vec!["paracetamol"]);
        assert_eq!(report.interactions[1].description, DUPLICATE_THERAPY_DESCRIPTION);
        
        let dose: Vec<&str> = report.dose_issues.iter().map(|d| d.drug.as_str()).collect();
        assert_eq!(dose, vec!["Zopiclone", "paracetamol"]);
        
        assert_eq!(report.missing_info, vec![MISSING_NOTES, MISSING_COMORBIDITIES]);
        assert_eq!(report.meta.model, "static-rules-v1 (stubbed)");
        assert!(report.meta.latency_ms >= 0.0);
    }
    
    #[test]
    fn test_clean_request_yields_clear_report() {
        let report = evaluate(&engine(), &request(40, vec![med("Amoxicillin", "500")]));
        assert!(report.is_clear());
    }
    
    #[test]
    fn test_deterministic_and_idempotent() {
        let engine = engine();
        let request = request(68, vec![
            med("Ibuprofen", "400"), med("Metformin", "2000"), med("Ibuprofen", "400"), med("zopiclone", "3.75"),
        ]);
        let first = evaluate(&engine, &request);
        let second = evaluate(&engine, &request);
        assert!(first.findings_eq(&second));
        assert_eq!(engine.assess(&request), engine.assess(&request));
    }
    
    #[test]
    fn test_engines_with_different_tables_coexist() {
        let mut config = EngineConfig::default();
        config.model = "ward-7".to_string();
        config.interactions = vec![
            InteractionRule::new(&["sertraline", "tramadol"], Severity::High, "Serotonin syndrome risk."),
        ];
        let custom = RuleEngine::new(config).unwrap();
        let standard = engine();
        
        let request = request(30, vec![med("Sertraline", "50"), med("Tramadol", "50"), med("Aspirin", "75"), med("Warfarin", "5")]);
        
        let custom_report = evaluate(&custom, &request);
        assert_eq!(custom_report.meta.model, "ward-7");
        assert_eq!(custom_report.interactions.len(), 1);
        assert_eq!(custom_report.interactions[0].drugs, vec!["sertraline", "tramadol"]);
        
        let standard_report = evaluate(&standard, &request);
        assert_eq!(standard_report.interactions.len(), 1);
        assert_eq!(standard_report.interactions[0].drugs, vec!["aspirin", "warfarin"]);
    }
    
    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.interactions.push(InteractionRule::new(&["warfarin", "ASPIRIN"], Severity::Low, "Again."));
        assert!(RuleEngine::new(config).is_err());
    }
    
    #[test]
    fn test_concurrent_evaluations_are_independent() {
        let engine = engine();
        let requests: Vec<EvaluationRequest> = (0..8)
            .map(|i| request(60 + i, vec![med("Zopiclone", "7.5"), med("Aspirin", "75"), med("Warfarin", "5")]))
            .collect();
        let expected: Vec<AdvisoryReport> = requests.iter().map(|r| evaluate(&engine, r)).collect();
        
        let reports: Vec<AdvisoryReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = requests.iter()
                .map(|r| {
                    let engine = &engine;
                    scope.spawn(move || evaluate(engine, r))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        
        for (report, expected) in reports.iter().zip(&expected) {
            assert!(report.findings_eq(expected));
        }
        // Patients aged 65 and over get the sedative flag
        assert_eq!(reports[5].dose_issues.len(), 1);
        assert!(reports[5].dose_issues[0].recommendation.contains("zopiclone"));
        assert!(reports[0].dose_issues.is_empty());
    }
}
