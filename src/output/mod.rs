use crate::evaluation::{AdvisoryReport, BatchSummary};
use crate::error::AdvisoryResult;
use serde::Serialize;
use std::path::Path;
use std::fs::File;
use log::info;

/// A report tagged with the position of its case in the request file.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub case: usize,
    #[serde(flatten)]
    pub report: AdvisoryReport,
}

pub fn save_reports<P: AsRef<Path>>(reports: &[CaseReport], output_dir: P) -> AdvisoryResult<()> {
    let output_path = output_dir.as_ref();
    
    save_json(reports, &output_path.join("advisory_reports.json"))?;
    save_interactions(reports, &output_path.join("interactions.csv"))?;
    save_dose_issues(reports, &output_path.join("dose_issues.csv"))?;
    save_missing_info(reports, &output_path.join("missing_info.csv"))?;
    
    let plain: Vec<AdvisoryReport> = reports.iter().map(|r| r.report.clone()).collect();
    let summary = BatchSummary::from_reports(&plain);
    save_json(&summary, &output_path.join("batch_summary.json"))?;
    
    info!("All reports saved to {:?}", output_path);
    Ok(())
}

fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> AdvisoryResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn save_interactions<P: AsRef<Path>>(reports: &[CaseReport], path: P) -> AdvisoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["CASE", "DRUGS", "SEVERITY", "DESCRIPTION"])?;
    
    for case in reports {
        for finding in &case.report.interactions {
            writer.write_record([
                case.case.to_string(),
                finding.drugs.join("+"),
                finding.severity.to_string(),
                finding.description.clone(),
            ])?;
        }
    }
    
    writer.flush()?;
    Ok(())
}

fn save_dose_issues<P: AsRef<Path>>(reports: &[CaseReport], path: P) -> AdvisoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["CASE", "DRUG", "ISSUE", "RECOMMENDATION"])?;
    
    for case in reports {
        for issue in &case.report.dose_issues {
            writer.write_record([
                case.case.to_string(),
                issue.drug.clone(),
                issue.issue.clone(),
                issue.recommendation.clone(),
            ])?;
        }
    }
    
    writer.flush()?;
    Ok(())
}

fn save_missing_info<P: AsRef<Path>>(reports: &[CaseReport], path: P) -> AdvisoryResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["CASE", "MESSAGE"])?;
    
    for case in reports {
        for message in &case.report.missing_info {
            writer.write_record([case.case.to_string(), message.clone()])?;
        }
    }
    
    writer.flush()?;
    Ok(())
}

/// Render every report as a Markdown document for reviewers.
pub fn render_markdown(reports: &[CaseReport]) -> String {
    let mut out = String::from("# Medication Advisory Report\n");
    
    for case in reports {
        let report = &case.report;
        out.push_str(&format!("\n## Case {}\n", case.case));
        out.push_str(&format!(
            "- **Generated**: {}\n- **Model**: {}\n- **Latency**: {:.2} ms\n",
            report.meta.generated_at.to_rfc3339(),
            report.meta.model,
            report.meta.latency_ms,
        ));
        
        out.push_str("\n### Interactions\n");
        if report.interactions.is_empty() {
            out.push_str("None detected.\n");
        }
        for finding in &report.interactions {
            out.push_str(&format!(
                "- **{}** ({}): {}\n",
                finding.drugs.join(" + "), finding.severity, finding.description
            ));
        }
        
        out.push_str("\n### Dose issues\n");
        if report.dose_issues.is_empty() {
            out.push_str("None detected.\n");
        }
        for issue in &report.dose_issues {
            out.push_str(&format!("- **{}**: {}. {}\n", issue.drug, issue.issue, issue.recommendation));
        }
        
        out.push_str("\n### Missing information\n");
        if report.missing_info.is_empty() {
            out.push_str("Nothing missing.\n");
        }
        for message in &report.missing_info {
            out.push_str(&format!("- {}\n", message));
        }
    }
    
    out.push_str("\n---\nAdvisory output from a static rule set. Not a substitute for clinical judgement.\n");
    out
}

pub fn generate_report<P: AsRef<Path>>(reports: &[CaseReport], output_dir: P) -> AdvisoryResult<()> {
    let report_path = output_dir.as_ref().join("advisory_report.md");
    std::fs::write(report_path, render_markdown(reports))?;
    Ok(())
}
