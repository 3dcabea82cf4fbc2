use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use crate::error::{AdvisoryError, AdvisoryResult};

/// Clinical concern attached to an interaction finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and lower-case a drug name before any comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub drugs: Vec<String>,
    pub severity: Severity,
    pub description: String,
}

impl InteractionRule {
    pub fn new(drugs: &[&str], severity: Severity, description: &str) -> Self {
        Self {
            drugs: drugs.iter().map(|d| d.to_string()).collect(),
            severity,
            description: description.to_string(),
        }
    }
    
    /// True when every drug in the rule appears among `names`.
    pub fn matches(&self, names: &BTreeSet<String>) -> bool {
        self.drugs.iter().all(|drug| names.contains(drug))
    }
}

/// Read-only catalogue of multi-drug interaction rules, in table order.
#[derive(Debug, Clone)]
pub struct KnowledgeTable {
    rules: Vec<InteractionRule>,
}

impl KnowledgeTable {
    /// Normalizes every drug name and rejects empty or duplicated drug sets.
    pub fn new(rules: Vec<InteractionRule>) -> AdvisoryResult<Self> {
        let mut seen: Vec<BTreeSet<String>> = Vec::with_capacity(rules.len());
        let mut normalized = Vec::with_capacity(rules.len());
        
        for (index, rule) in rules.into_iter().enumerate() {
            let mut drugs: Vec<String> = Vec::with_capacity(rule.drugs.len());
            for drug in &rule.drugs {
                let name = normalize(drug);
                if name.is_empty() {
                    return Err(AdvisoryError::InvalidConfig(
                        format!("Interaction rule {} contains a blank drug name", index)
                    ));
                }
                if !drugs.contains(&name) {
                    drugs.push(name);
                }
            }
            
            if drugs.is_empty() {
                return Err(AdvisoryError::InvalidConfig(
                    format!("Interaction rule {} has no drugs", index)
                ));
            }
            
            if rule.description.trim().is_empty() {
                return Err(AdvisoryError::InvalidConfig(
                    format!("Interaction rule {} has no description", index)
                ));
            }
            
            let key: BTreeSet<String> = drugs.iter().cloned().collect();
            if seen.contains(&key) {
                return Err(AdvisoryError::InvalidConfig(
                    format!("Duplicate interaction rule for drug set [{}]", drugs.join(", "))
                ));
            }
            seen.push(key);
            
            normalized.push(InteractionRule {
                drugs,
                severity: rule.severity,
                description: rule.description,
            });
        }
        
        Ok(Self { rules: normalized })
    }
    
    pub fn rules(&self) -> &[InteractionRule] {
        &self.rules
    }
    
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// The built-in illustrative rule set.
pub fn default_rules() -> Vec<InteractionRule> {
    vec![
        InteractionRule::new(
            &["ibuprofen", "metformin"],
            Severity::Moderate,
            "Combined use may reduce renal perfusion. Consider monitoring kidney function, especially in renally impaired patients.",
        ),
        InteractionRule::new(
            &["aspirin", "warfarin"],
            Severity::High,
            "Dual anticoagulation increases bleeding risk. Ensure clear indication and monitor INR and bleeding signs closely.",
        ),
        InteractionRule::new(
            &["azithromycin", "hydroxychloroquine"],
            Severity::Moderate,
            "Both agents can prolong QT interval. Baseline ECG and electrolyte monitoring are recommended.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_severity_is_ordered() {
        assert!(Severity::Low < Severity::Moderate);
        assert!(Severity::Moderate < Severity::High);
        assert_eq!(serde_json::to_string(&Severity::Moderate).unwrap(), "\"moderate\"");
    }
    
    #[test]
    fn test_default_table_loads() {
        let table = KnowledgeTable::new(default_rules()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rules()[1].severity, Severity::High);
    }
    
    #[test]
    fn test_rule_names_are_normalized() {
        let table = KnowledgeTable::new(vec![
            InteractionRule::new(&["  Sertraline ", "TRAMADOL", "tramadol"], Severity::High, "Serotonin syndrome risk."),
        ]).unwrap();
        assert_eq!(table.rules()[0].drugs, vec!["sertraline", "tramadol"]);
    }
    
    #[test]
    fn test_duplicate_drug_sets_rejected() {
        let result = KnowledgeTable::new(vec![
            InteractionRule::new(&["aspirin", "warfarin"], Severity::High, "First."),
            InteractionRule::new(&["Warfarin", "aspirin"], Severity::Low, "Second."),
        ]);
        assert!(matches!(result, Err(AdvisoryError::InvalidConfig(_))));
    }
    
    #[test]
    fn test_subset_rules_allowed() {
        let table = KnowledgeTable::new(vec![
            InteractionRule::new(&["aspirin", "warfarin"], Severity::High, "Pair."),
            InteractionRule::new(&["aspirin", "warfarin", "clopidogrel"], Severity::High, "Triple."),
        ]).unwrap();
        assert_eq!(table.len(), 2);
    }
    
    #[test]
    fn test_empty_or_blank_rules_rejected() {
        assert!(KnowledgeTable::new(vec![InteractionRule::new(&[], Severity::Low, "x")]).is_err());
        assert!(KnowledgeTable::new(vec![InteractionRule::new(&["  "], Severity::Low, "x")]).is_err());
        assert!(KnowledgeTable::new(vec![InteractionRule::new(&["aspirin"], Severity::Low, " ")]).is_err());
    }
}
