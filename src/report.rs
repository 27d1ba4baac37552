//! Rendering of mining results for the command line

use anyhow::Result;
use serde::Serialize;

use crate::config::MiningConfig;
use crate::matrix::ProbabilityMatrix;
use crate::mining::{MiningReport, PairwiseStatistic, RankedRule};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}' (text, json)", other)),
        }
    }
}

/// JSON envelope around a mining report
#[derive(Debug, Serialize)]
struct ReportEnvelope<'a> {
    generated_at: String,
    config: &'a MiningConfig,
    #[serde(flatten)]
    report: &'a MiningReport,
}

/// Render a mining report
pub fn render_report(report: &MiningReport, config: &MiningConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let envelope = ReportEnvelope {
                generated_at: chrono::Utc::now().to_rfc3339(),
                config,
                report,
            };
            Ok(serde_json::to_string_pretty(&envelope)?)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for edge in &report.edges {
                out.push_str(&format!("{} -> {}\n", edge.from, edge.to));
            }
            Ok(out)
        }
    }
}

/// Human-readable explanation of how the edges were reached
pub fn render_summary(report: &MiningReport) -> String {
    let mut out = String::new();
    out.push_str("Prerequisite Discovery\n");
    out.push_str("======================\n");
    out.push_str(&format!(
        "Input: {} learners x {} skills\n",
        report.learner_count, report.skill_count
    ));
    out.push_str(&format!("Defined pairs: {}\n", report.defined_pairs));
    out.push_str(&format!("Candidate rules: {}\n", report.candidate_rules));
    out.push_str(&format!("Oriented relations: {}\n", report.oriented_relations));
    out.push_str(&format!("Edges: {}\n", report.edges.len()));
    for edge in &report.cycle_breaks {
        out.push_str(&format!("  cycle break: {} -> {}\n", edge.from, edge.to));
    }
    for edge in &report.redundant_edges {
        out.push_str(&format!("  redundant:   {} -> {}\n", edge.from, edge.to));
    }
    out
}

/// Render ranked rules
pub fn render_ranking(rules: &[RankedRule], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rules)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for rule in rules {
                out.push_str(&format!(
                    "{} => {}  probability: {:.6}  confidence: {:.4}  support: {:.2}\n",
                    rule.antecedent, rule.consequent, rule.probability, rule.confidence, rule.joint_support
                ));
            }
            Ok(out)
        }
    }
}

#[derive(Debug, Serialize)]
struct NamedStatistic<'a> {
    antecedent: &'a str,
    consequent: &'a str,
    support_antecedent: f64,
    support_consequent: f64,
    joint_support: f64,
    co_observed: usize,
    confidence: Option<f64>,
}

/// Render the pairwise statistics table
pub fn render_statistics(
    matrix: &ProbabilityMatrix,
    stats: &[PairwiseStatistic],
    format: OutputFormat,
) -> Result<String> {
    let skills = matrix.skills();
    match format {
        OutputFormat::Json => {
            let named: Vec<NamedStatistic> = stats
                .iter()
                .map(|s| NamedStatistic {
                    antecedent: &skills[s.antecedent],
                    consequent: &skills[s.consequent],
                    support_antecedent: s.support_antecedent,
                    support_consequent: s.support_consequent,
                    joint_support: s.joint_support,
                    co_observed: s.co_observed,
                    confidence: s.confidence,
                })
                .collect();
            Ok(serde_json::to_string_pretty(&named)?)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for s in stats {
                let confidence = s
                    .confidence
                    .map(|c| format!("{:.4}", c))
                    .unwrap_or_else(|| "undefined".to_string());
                out.push_str(&format!(
                    "{} => {}  support: {:.2}/{:.2}  joint: {:.2}  confidence: {}\n",
                    skills[s.antecedent],
                    skills[s.consequent],
                    s.support_antecedent,
                    s.support_consequent,
                    s.joint_support,
                    confidence
                ));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PrerequisiteEdge;

    fn sample_report() -> MiningReport {
        MiningReport {
            edges: vec![PrerequisiteEdge {
                from: "A".into(),
                to: "B".into(),
            }],
            learner_count: 10,
            skill_count: 2,
            defined_pairs: 2,
            candidate_rules: 1,
            oriented_relations: 1,
            cycle_breaks: vec![],
            redundant_edges: vec![],
        }
    }

    #[test]
    fn test_text_report() {
        let text = render_report(&sample_report(), &MiningConfig::new(1.0, 0.5), OutputFormat::Text)
            .unwrap();
        assert_eq!(text, "A -> B\n");
    }

    #[test]
    fn test_json_report_is_valid() {
        let json = render_report(&sample_report(), &MiningConfig::new(1.0, 0.5), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["edges"][0]["from"], "A");
        assert_eq!(value["config"]["joint"], "product");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_summary_mentions_counts() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("Candidate rules: 1"));
        assert!(summary.contains("Edges: 1"));
    }
}
