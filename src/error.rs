use thiserror::Error;
use serde::Serialize;
use std::fmt;

/// A single field-level problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    
    #[error("Invalid payload: {} issue(s)", .issues.len())]
    InvalidRequest { issues: Vec<ValidationIssue> },
    
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
    
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AdvisoryError {
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            AdvisoryError::InvalidRequest { issues } => issues,
            _ => &[],
        }
    }
}

pub type AdvisoryResult<T> = Result<T, AdvisoryError>;
