use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{AdvisoryError, AdvisoryResult};
use crate::evaluation::dose::{SedativeRule, StrengthRule};
use crate::knowledge::{default_rules, InteractionRule, KnowledgeTable};

pub const DEFAULT_MODEL: &str = "static-rules-v1 (stubbed)";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Label stamped into every report's metadata
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_rules")]
    pub interactions: Vec<InteractionRule>,
    #[serde(default = "default_sedatives")]
    pub sedatives: Vec<SedativeRule>,
    #[serde(default)]
    pub strength: StrengthRule,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_sedatives() -> Vec<SedativeRule> {
    vec![SedativeRule::new("zopiclone", 65)]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            interactions: default_rules(),
            sedatives: default_sedatives(),
            strength: StrengthRule::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> AdvisoryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
    
    pub fn validate(&self) -> AdvisoryResult<()> {
        if self.model.trim().is_empty() {
            return Err(AdvisoryError::InvalidConfig(
                "Model identifier must not be blank".to_string()
            ));
        }
        
        // Duplicate or empty drug sets surface here
        KnowledgeTable::new(self.interactions.clone())?;
        
        self.validate_dose_rules()?;
        
        Ok(())
    }
    
    fn validate_dose_rules(&self) -> AdvisoryResult<()> {
        for (index, sedative) in self.sedatives.iter().enumerate() {
            if sedative.substring.trim().is_empty() {
                return Err(AdvisoryError::InvalidConfig(
                    format!("Sedative rule {} has a blank substring", index)
                ));
            }
            if sedative.min_age > 120 {
                return Err(AdvisoryError::InvalidConfig(
                    format!("Sedative rule {} has minimum age {} above 120", index, sedative.min_age)
                ));
            }
        }
        
        let threshold = self.strength.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AdvisoryError::InvalidConfig(
                format!("Strength threshold must be a non-negative number, got {}", threshold)
            ));
        }
        
        Ok(())
    }
}
