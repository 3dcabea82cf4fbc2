use std::collections::{BTreeSet, HashMap};
use log::debug;
use crate::knowledge::{normalize, KnowledgeTable, Severity};
use crate::request::MedicationEntry;
use super::report::InteractionFinding;

pub const DUPLICATE_THERAPY_DESCRIPTION: &str =
    "Duplicate therapy detected. Verify that duplicate entries are intentional.";

/// Rule matches in table order, then duplicate-therapy findings in order of first appearance.
pub fn find_interactions(table: &KnowledgeTable, medications: &[MedicationEntry]) -> Vec<InteractionFinding> {
    let names: Vec<String> = medications.iter()
        .map(|med| normalize(&med.name))
        .collect();
    
    let mut findings = match_rules(table, &names);
    findings.extend(find_duplicates(&names));
    findings
}

fn match_rules(table: &KnowledgeTable, names: &[String]) -> Vec<InteractionFinding> {
    let present: BTreeSet<String> = names.iter().cloned().collect();
    
    table.rules().iter()
        .filter(|rule| rule.matches(&present))
        .map(|rule| {
            debug!("Interaction rule fired for [{}] ({})", rule.drugs.join(", "), rule.severity);
            InteractionFinding {
                drugs: rule.drugs.clone(),
                severity: rule.severity,
                description: rule.description.clone(),
            }
        })
        .collect()
}

fn find_duplicates(names: &[String]) -> Vec<InteractionFinding> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    
    for name in names {
        let count = counts.entry(name.as_str()).or_insert(0);
        if *count == 0 {
            order.push(name.as_str());
        }
        *count += 1;
    }
    
    order.into_iter()
        .filter(|name| counts[name] > 1)
        .map(|name| {
            debug!("Duplicate therapy: {} listed {} times", name, counts[name]);
            InteractionFinding {
                drugs: vec![name.to_string()],
                severity: Severity::Low,
                description: DUPLICATE_THERAPY_DESCRIPTION.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{default_rules, InteractionRule};
    
    fn med(name: &str) -> MedicationEntry {
        MedicationEntry::new(name, "500", "1 tab", "oral", "bd", "7 days")
    }
    
    fn table() -> KnowledgeTable {
        KnowledgeTable::new(default_rules()).unwrap()
    }
    
    #[test]
    fn test_ibuprofen_metformin_moderate() {
        let findings = find_interactions(&table(), &[med("Ibuprofen"), med("Metformin")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].drugs, vec!["ibuprofen", "metformin"]);
        assert_eq!(findings[0].severity, Severity::Moderate);
    }
    
    #[test]
    fn test_aspirin_warfarin_high_with_messy_names() {
        let findings = find_interactions(&table(), &[med("  WARFARIN"), med("aspirin ")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }
    
    #[test]
    fn test_duplicate_therapy() {
        let findings = find_interactions(&table(), &[med("Paracetamol"), med("paracetamol")]);
        assert_eq!(findings, vec![InteractionFinding {
            drugs: vec!["paracetamol".to_string()],
            severity: Severity::Low,
            description: DUPLICATE_THERAPY_DESCRIPTION.to_string(),
        }]);
    }
    
    #[test]
    fn test_no_duplicate_for_distinct_or_single() {
        assert!(find_interactions(&table(), &[med("Paracetamol")]).is_empty());
        assert!(find_interactions(&table(), &[med("Paracetamol"), med("Amoxicillin")]).is_empty());
    }
    
    #[test]
    fn test_rule_findings_precede_duplicates_in_appearance_order() {
        let meds = [
            med("Warfarin"), med("Omeprazole"), med("Aspirin"),
            med("omeprazole"), med("Warfarin"), med("Ibuprofen"), med("Metformin"),
        ];
        let findings = find_interactions(&table(), &meds);
        let drugs: Vec<Vec<String>> = findings.iter().map(|f| f.drugs.clone()).collect();
        assert_eq!(drugs, vec![
            vec!["ibuprofen".to_string(), "metformin".to_string()],
            vec!["aspirin".to_string(), "warfarin".to_string()],
            vec!["warfarin".to_string()],
            vec!["omeprazole".to_string()],
        ]);
    }
    
    #[test]
    fn test_subset_rules_both_fire() {
        let table = KnowledgeTable::new(vec![
            InteractionRule::new(&["aspirin", "warfarin", "clopidogrel"], Severity::High, "Triple therapy."),
            InteractionRule::new(&["aspirin", "warfarin"], Severity::Moderate, "Pair."),
        ]).unwrap();
        let findings = find_interactions(&table, &[med("Clopidogrel"), med("Aspirin"), med("Warfarin")]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].description, "Triple therapy.");
        assert_eq!(findings[1].description, "Pair.");
    }
    
    #[test]
    fn test_permutation_keeps_finding_set() {
        let forward = find_interactions(&table(), &[med("Aspirin"), med("Zinc"), med("Warfarin"), med("zinc")]);
        let reversed = find_interactions(&table(), &[med("zinc"), med("Warfarin"), med("Zinc"), med("Aspirin")]);
        assert_eq!(forward, reversed);
    }
}
