//! LLM prompt engineering for record extraction

use crate::schema::record_schema;

/// Builds the extraction prompt for one article or chunk
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let schema = serde_json::to_string_pretty(&record_schema()).unwrap_or_default();

        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + schema.len() + self.text.len() + 128,
        );

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt.push_str("\n\nHere is the output schema:\n");
        prompt.push_str(&schema);
        prompt.push_str("\n\n");

        prompt.push_str("Article:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n");

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert in extracting data about solar power plants and their financing from news articles.
Read the article below and extract the following details:

- newsUrl: link of the original article.
- title: the title of the news article.
- newsUpdateType: one of
    - "Funding Update": a project, organization or other entity received funding
    - "M&A Update": a project or organization was acquired or purchased
    - "General Update": any update that is neither funding nor M&A
    - "Other"
- receiverCategory: what received the investment, one of
    - "Project": a solar project funded by one or more organizations
    - "Organization": an organization funded by one or more organizations
    - "Other": anything else
- textOfArticle: the complete text of the article, preferably more than 300 words.
- receiverCountry: list of country names of the receiver. Countries only, never a region or continent.
- date: date of the update, formatted "dd/mm/yyyy".
- projectFinanced: only when receiverCategory is "Project", otherwise null.
    - id: any unique id
    - name: usually "<Name> Solar Project"; for a company-owned plant give the company name and size
- projectStatus: only for projects, otherwise null. One of "Planning", "Commissioned", "Construction", "Operational", or "n/a" if not stated.
- projectStatusDate: only for projects, otherwise null. "n/a" if not stated.
- technologyAndGridSystem: only for projects, otherwise null. One of "PV", "PV-Diesel-Storage Hybrid", "PV-Storage", "n/a".
- typeOfInstallation: only for projects, otherwise null. One of "C&I", "Utility", "Mini-grid", "n/a".
- gridType: only for projects, otherwise null. One of "On-grid", "Off-Grid", "n/a".
- pvSize: only for projects, otherwise null. Installed capacity as a number, or "n/a".
- organizationFinanced: only when receiverCategory is "Organization", otherwise null.
    - id: any unique id
    - name: the organization that received the investment
    - role: one of "Government", "Utility", "Financing Vehicle", "E-Mobility", "PAYG SHS"
- totalAmount: total funding received, as a full figure (e.g. 1500000, not "1.5m"), or "n/a".
- subUpdates: one entry per party involved, in article order.
    - organization: name of the party
    - role: one of "EPC Contractor", "Financier", "Supplier", "Off-taker", "Fund Manager", "Owner"
    - instrument: financiers only. One of "Debt", "Grant", "Equity", "n/a"
    - amount: financiers only. The amount provided as a number, or "n/a"
    - financingStructure: financiers only. Free text, or "n/a"

Rules:
- There can be several subUpdates, one per company involved.
- When a subUpdate role is not "Financier", instrument, amount and financingStructure must be null or "n/a".
- At most one of projectFinanced and organizationFinanced is set, and it must match receiverCategory.
- null means the field does not apply. "n/a" means the field applies but the article does not give the value."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with a single JSON object that conforms to the schema below.
Return ONLY valid JSON, no markdown code blocks, no explanations."#;
