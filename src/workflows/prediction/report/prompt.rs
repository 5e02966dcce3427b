//! Prompt construction for the Green Finance Advisor persona.
//!
//! The payload block is shared between the remote path and the local
//! fallback: the fallback re-parses these exact label prefixes, so their
//! wording is load-bearing.

use super::ReportInputs;

pub(crate) const COMPANY_NAME_LABEL: &str = "Company Name:";
pub(crate) const ESG_SCORE_LABEL: &str = "**ESG Score:**";
pub(crate) const RISK_PROBABILITY_LABEL: &str = "**ML Model Risk Probability:**";

/// Structured payload embedded into the instructional prompt.
pub(crate) fn payload(inputs: &ReportInputs<'_>) -> String {
    let details = inputs.details;
    let scores = inputs.scores;
    format!(
        "Green Finance Report:\n\n\
         {ESG_SCORE_LABEL} {esg_score}\n\n\
         {RISK_PROBABILITY_LABEL} {risk_probability}\n\n\
         {COMPANY_NAME_LABEL} {company_name}\n\
         Place: {country}\n\
         Industry Category: {industry_category}\n\
         Sector: {sector}\n\
         Industry: {industry}\n\
         Products and Services: {products_and_services}\n\
         Description: {description}\n\
         Impact Area Community Value: {community}\n\
         Impact Area Environment Value: {environment}\n\
         Impact Area Customers Value: {customers}\n\
         Impact Area Governance Value: {governance}\n\
         Certification Cycle: {certification_cycle}\n",
        esg_score = inputs.esg_score,
        risk_probability = inputs.risk_probability,
        company_name = details.company_name,
        country = details.country,
        industry_category = details.industry_category,
        sector = details.sector,
        industry = details.industry,
        products_and_services = details.products_and_services,
        description = details.description,
        community = scores.community,
        environment = scores.environment,
        customers = scores.customers,
        governance = scores.governance,
        certification_cycle = scores.certification_cycle,
    )
}

/// Full single-turn instruction sent to the completion service. The output
/// format skeleton below defines the nine-section report layout that both
/// the remote report and the local fallback must follow.
pub(crate) fn instructional(payload: &str) -> String {
    format!(
        r#"You are a Green Finance Advisor specializing in evaluating companies based on sustainability impact areas, ESG scores, and risk probabilities predicted by an ML model. Your task is to generate a detailed and actionable Green Finance Diagnostic Report for investors, based on the provided data.

**Instructions:**
1. Analyze the ESG Score (out of 100) and ML Model's Risk Probability.
2. Use ESG weightage metrics:
   - **Environment**: 50%
   - **Social**: 30%
   - **Governance**: 20%
3. Provide a clear, concise, and investor-friendly report with key insights.
4. Only return the response in markdown compatible plain text without any additional explanations and external sentences or details.

**Input Data**:
{payload}

**Output Format:**

### [Company Name] Green Finance Investment Report

#### 1. **Company Overview**
- **Name**: [Company Name]
- **Location**: [Location]
- **Industry**: [Industry]
- **Products/Services**: [Brief description of the company's offerings, including any sustainability-focused products or initiatives.]

---

#### 2. **ESG Score and Green Finance Readiness**
- **ESG Score (out of 100)**: **[ESG Score]**
- **Readiness**:
  - **Good (70-100)**: The company demonstrates strong commitment to sustainability, indicating favorable potential for green finance investments.
  - **Fair (50-69)**: The company has moderate sustainability practices. While it shows progress, there are areas for improvement to be fully aligned with green finance goals.
  - **Poor (Below 50)**: The company needs substantial improvement in its sustainability efforts to be considered a viable candidate for green finance investments.

---

#### 3. **ML Risk Probability**
- **Risk Probability**: **[Risk Probability]**
- **Interpretation**:
  - **High**: The company faces significant risks, which may include regulatory, environmental, or market challenges. Immediate attention to risk management is recommended.
  - **Moderate**: There are some identifiable risks, but they are manageable with focused efforts on risk mitigation strategies.
  - **Low**: The company demonstrates robust risk management practices, with low probability of facing major risks in the near future.

---

#### 4. **Sustainability Impact Areas**
- **Community**:
  - [Provide insights into the company's community-focused initiatives, such as local impact projects, support for underserved communities, or efforts to enhance social well-being.]

- **Environment**:
  - [Summarize the company's environmental initiatives, including energy efficiency, carbon footprint reduction, waste management, and use of renewable resources.]

- **Customers**:
  - [Detail how the company engages with customers through sustainable product offerings, ethical sourcing, or customer education on sustainability issues.]

- **Governance**:
  - [Discuss the company's governance practices, transparency, ethical standards, and policies regarding executive compensation, board diversity, and shareholder rights.]

---

#### 5. **Key Strengths**
- [List the company's main strengths related to sustainability, such as leadership in environmental practices, strong governance policies, positive social impact, or alignment with global sustainability standards.]

---

#### 6. **Areas for Improvement**
- [Provide actionable suggestions for improvement, including potential areas where the company can enhance its sustainability practices, improve risk management, or optimize its ESG score.]

---

#### 7. **Certification Recommendations**
- **Recommended Certifications**:
  - [List relevant certifications or standards the company should pursue, such as B Corp, ISO 14001, GRI, LEED, or Fair Trade.]

- **Timeline**:
  - [Suggest a feasible timeline for achieving these certifications, such as "Within the next 12 months."]

---

#### 8. **Benefits of Green Finance Alignment**
- [Describe the key benefits for investors, including enhanced marketability, access to sustainable investment funds, alignment with ESG goals, improved risk mitigation, and long-term financial performance.]

---

#### 9. **Next Steps**
- [Actionable next steps for investors to engage with the company in terms of green finance investments, such as "Evaluate the company's sustainability reports for deeper insights" or "Initiate a due diligence process to assess risk exposure."]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::prediction::domain::{CompanyDetails, ImpactScores};

    fn inputs(details: &CompanyDetails, scores: &ImpactScores) -> String {
        payload(&ReportInputs {
            details,
            scores,
            esg_score: 72.0,
            risk_probability: 0.28,
        })
    }

    #[test]
    fn payload_carries_every_labelled_field() {
        let details = CompanyDetails {
            company_name: "Solaria Energy".to_string(),
            country: "Spain".to_string(),
            ..CompanyDetails::default()
        };
        let scores = ImpactScores {
            community: 60.0,
            environment: 80.0,
            customers: 55.0,
            governance: 70.0,
            certification_cycle: 2,
        };

        let payload = inputs(&details, &scores);
        assert!(payload.contains("Company Name: Solaria Energy"));
        assert!(payload.contains("**ESG Score:** 72"));
        assert!(payload.contains("**ML Model Risk Probability:** 0.28"));
        assert!(payload.contains("Impact Area Customers Value: 55"));
        assert!(payload.contains("Certification Cycle: 2"));
    }

    #[test]
    fn instructional_prompt_embeds_payload_and_output_skeleton() {
        let details = CompanyDetails::default();
        let scores = ImpactScores {
            community: 0.0,
            environment: 0.0,
            customers: 0.0,
            governance: 0.0,
            certification_cycle: 0,
        };
        let prompt = instructional(&inputs(&details, &scores));
        assert!(prompt.contains("Green Finance Advisor"));
        assert!(prompt.contains("Green Finance Report:"));
        assert!(prompt.contains("#### 9. **Next Steps**"));
    }
}
