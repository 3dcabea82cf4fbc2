use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, info, warn, error};
use std::path::PathBuf;

mod config;
mod knowledge;
mod request;
mod evaluation;
mod output;
mod error;

use crate::config::EngineConfig;
use crate::error::AdvisoryError;
use crate::evaluation::{evaluate, AdvisoryStrategy, RuleEngine};
use crate::output::CaseReport;

#[derive(Parser)]
#[command(name = "med_advisor")]
#[command(about = "Rule-based medication advisory engine")]
struct Cli {
    /// Request file: one request object or an array of cases
    #[arg(short, long)]
    request: PathBuf,
    
    /// Engine configuration file (built-in rules when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    
    /// Output directory; reports are printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    
    /// Also write a Markdown rendering of the reports
    #[arg(short, long)]
    markdown: bool,
    
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    
    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
    
    let config = match &cli.config {
        Some(path) => {
            let config = EngineConfig::from_file(path)
                .with_context(|| format!("Failed to load engine configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => EngineConfig::default(),
    };
    
    let engine = RuleEngine::new(config)?;
    info!("Using model '{}' with {} interaction rule(s)", engine.identifier(), engine.table().len());
    
    let cases = request::load_requests(&cli.request)
        .with_context(|| format!("Failed to read requests from {:?}", cli.request))?;
    info!("Loaded {} case(s) from {:?}", cases.len(), cli.request);
    
    let mut reports: Vec<CaseReport> = Vec::with_capacity(cases.len());
    let mut rejected = 0;
    
    for (case, validated) in cases.into_iter().enumerate() {
        match validated {
            Ok(request) => {
                let report = evaluate(&engine, &request);
                if let Some(severity) = report.highest_severity() {
                    info!("Case {}: highest interaction severity {}", case, severity);
                }
                if let Some(earlier) = reports.iter().find(|r| r.report.findings_eq(&report)) {
                    debug!("Case {} has the same findings as case {}", case, earlier.case);
                }
                reports.push(CaseReport { case, report });
            }
            Err(e) => {
                rejected += 1;
                warn!("Case {} rejected: {}", case, e);
                for issue in e.issues() {
                    error!("  case {}: {}", case, issue);
                }
            }
        }
    }
    
    if reports.is_empty() {
        bail!(AdvisoryError::Validation(format!("No valid cases to evaluate ({} rejected)", rejected)));
    }
    info!("Evaluated {} case(s), rejected {}", reports.len(), rejected);
    
    match &cli.output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;
            output::save_reports(&reports, dir)?;
            if cli.markdown {
                output::generate_report(&reports, dir)?;
            }
            info!("Reports saved to {:?}", dir);
        }
        None => {
            if cli.markdown {
                println!("{}", output::render_markdown(&reports));
            } else {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }
    }
    
    Ok(())
}
