//! Deterministic local report used when the completion service fails.
//!
//! The renderer re-parses the payload block that was about to be sent over
//! the wire, splitting on the known label prefixes, rather than receiving the
//! typed values directly. Keep it that way: the fallback must render from
//! exactly what would have reached the completion service.

use super::prompt::{COMPANY_NAME_LABEL, ESG_SCORE_LABEL, RISK_PROBABILITY_LABEL};
use crate::workflows::prediction::domain::{ReadinessBand, RiskBand};

const UNKNOWN_COMPANY: &str = "Unknown Company";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedPayload {
    pub(crate) company_name: String,
    pub(crate) esg_score: f64,
    pub(crate) risk_probability: f64,
}

pub(crate) fn parse(payload: &str) -> ParsedPayload {
    let mut company_name = UNKNOWN_COMPANY.to_string();
    let mut esg_score = 0.0;
    let mut risk_probability = 0.0;

    for line in payload.lines() {
        if let Some(rest) = split_after(line, COMPANY_NAME_LABEL) {
            if !rest.is_empty() {
                company_name = rest.to_string();
            }
        } else if let Some(rest) = split_after(line, ESG_SCORE_LABEL) {
            esg_score = rest.parse().unwrap_or(0.0);
        } else if let Some(rest) = split_after(line, RISK_PROBABILITY_LABEL) {
            risk_probability = parse_risk(rest);
        }
    }

    ParsedPayload {
        company_name,
        esg_score,
        risk_probability,
    }
}

fn split_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.find(label)
        .map(|index| line[index + label.len()..].trim())
}

/// The risk value occasionally arrives as a probability array dump
/// (`[0.42 0.58]`); take the class-1 entry in that case. Malformed values
/// default to an uninformative 0.5.
fn parse_risk(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.contains('[') {
        trimmed
            .trim_matches(|c| c == '[' || c == ']')
            .split_whitespace()
            .nth(1)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0.5)
    } else {
        trimmed.parse().unwrap_or(0.5)
    }
}

/// Render the nine-section markdown report from a payload block. Total: any
/// malformed payload still produces a complete document with defaults.
pub(crate) fn render(payload: &str) -> String {
    let parsed = parse(payload);
    let readiness = ReadinessBand::from_score(parsed.esg_score);
    let risk = RiskBand::from_probability(parsed.risk_probability);

    format!(
        "### {company} Green Finance Investment Report\n\
         \n\
         #### 1. **Company Overview**\n\
         - **Name**: {company}\n\
         - **Location**: Location information not available\n\
         - **Industry**: Industry information not available\n\
         - **Products/Services**: Detailed information not available\n\
         \n\
         ---\n\
         \n\
         #### 2. **ESG Score and Green Finance Readiness**\n\
         - **ESG Score (out of 100)**: **{esg_score:.1}**\n\
         - **Readiness**: **{readiness}**\n\
         \n\
         ---\n\
         \n\
         #### 3. **ML Risk Probability**\n\
         - **Risk Probability**: **{risk_pct:.1}%**\n\
         - **Interpretation**: **{risk} Risk**\n\
         \n\
         ---\n\
         \n\
         #### 4. **Sustainability Impact Areas**\n\
         - **Community**: Requires further analysis\n\
         - **Environment**: Requires further analysis\n\
         - **Customers**: Requires further analysis\n\
         - **Governance**: Requires further analysis\n\
         \n\
         ---\n\
         \n\
         #### 5. **Key Strengths**\n\
         - This report was generated locally because the completion service was unavailable\n\
         \n\
         ---\n\
         \n\
         #### 6. **Areas for Improvement**\n\
         - Consider enhancing sustainability practices across all impact areas\n\
         \n\
         ---\n\
         \n\
         #### 7. **Certification Recommendations**\n\
         - **Recommended Certifications**: ISO 14001, B Corp\n\
         - **Timeline**: Within the next 12-18 months\n\
         \n\
         ---\n\
         \n\
         #### 8. **Benefits of Green Finance Alignment**\n\
         - Improved ESG profile and potential access to sustainable financing options\n\
         \n\
         ---\n\
         \n\
         #### 9. **Next Steps**\n\
         - Conduct a comprehensive sustainability assessment\n\
         - Develop a strategic roadmap for ESG improvements\n",
        company = parsed.company_name,
        esg_score = parsed.esg_score,
        readiness = readiness.label(),
        risk_pct = parsed.risk_probability * 100.0,
        risk = risk.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "\
Green Finance Report:

**ESG Score:** 72

**ML Model Risk Probability:** 0.28

Company Name: Solaria Energy
Place: Spain
";

    #[test]
    fn parses_known_labels() {
        let parsed = parse(PAYLOAD);
        assert_eq!(parsed.company_name, "Solaria Energy");
        assert_eq!(parsed.esg_score, 72.0);
        assert_eq!(parsed.risk_probability, 0.28);
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let parsed = parse("no labels here");
        assert_eq!(parsed.company_name, "Unknown Company");
        assert_eq!(parsed.esg_score, 0.0);
        assert_eq!(parsed.risk_probability, 0.0);
    }

    #[test]
    fn malformed_risk_defaults_to_half() {
        let parsed = parse("**ML Model Risk Probability:** not-a-number\n");
        assert_eq!(parsed.risk_probability, 0.5);
    }

    #[test]
    fn array_shaped_risk_takes_class_one_entry() {
        let parsed = parse("**ML Model Risk Probability:** [0.42 0.58]\n");
        assert_eq!(parsed.risk_probability, 0.58);
    }

    #[test]
    fn rendered_report_keeps_section_order_and_buckets() {
        let report = render(PAYLOAD);
        assert!(report.starts_with("### Solaria Energy Green Finance Investment Report"));
        assert!(report.contains("**ESG Score (out of 100)**: **72.0**"));
        assert!(report.contains("- **Readiness**: **Good**"));
        assert!(report.contains("- **Risk Probability**: **28.0%**"));
        assert!(report.contains("**Low Risk**"));

        let sections: Vec<usize> = (1..=9)
            .map(|n| report.find(&format!("#### {n}. ")).expect("section present"))
            .collect();
        assert!(sections.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn poor_and_fair_buckets_render() {
        let fair = render("**ESG Score:** 55\n**ML Model Risk Probability:** 0.75\n");
        assert!(fair.contains("**Fair**"));
        assert!(fair.contains("**High Risk**"));

        let poor = render("**ESG Score:** 45\n**ML Model Risk Probability:** 0.1\n");
        assert!(poor.contains("**Poor**"));
        assert!(poor.contains("**Low Risk**"));
    }
}
