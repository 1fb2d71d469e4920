//! Record module - the structured result of extracting one article
//!
//! [`ExtractedRecord`] mirrors the JSON object the model is asked to produce.
//! Field names are camelCase on the wire. A `None` field serializes as `null`
//! and means "does not apply to this record"; a `NotAvailable` value
//! serializes as `"n/a"` and means "applies, but the article does not say".

use crate::figure::Figure;
use crate::vocabulary::{
    GridType, Instrument, NewsUpdateType, OrganizationRole, ProjectStatus, ReceiverCategory,
    SubUpdateRole, TechnologyAndGridSystem, TypeOfInstallation, NOT_AVAILABLE,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format of `date` (dd/mm/yyyy)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Region and continent names that must not appear in `receiverCountry`
const NON_COUNTRY_REGIONS: &[&str] = &[
    "africa",
    "sub-saharan africa",
    "east africa",
    "west africa",
    "southern africa",
    "north africa",
    "asia",
    "southeast asia",
    "south asia",
    "europe",
    "north america",
    "south america",
    "latin america",
    "middle east",
    "oceania",
    "antarctica",
    "mena",
    "global",
];

/// Generate an identifier for a financed project or organization
pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// The project that received investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFinanced {
    /// Generated identifier
    #[serde(default = "generate_id")]
    pub id: String,

    /// Project name, e.g. "Kenhardt Solar Project"
    pub name: String,
}

/// The organization that received investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationFinanced {
    /// Generated identifier
    #[serde(default = "generate_id")]
    pub id: String,

    /// Organization name
    pub name: String,

    /// Role of the organization
    pub role: OrganizationRole,
}

/// A party involved in the update and what it contributed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubUpdate {
    /// Name of the party
    pub organization: String,

    /// Role of the party
    pub role: SubUpdateRole,

    /// Financing instrument (financiers only)
    #[serde(default)]
    pub instrument: Option<Instrument>,

    /// Amount provided (financiers only)
    #[serde(default)]
    pub amount: Option<Figure>,

    /// Financing structure (financiers only)
    #[serde(default)]
    pub financing_structure: Option<String>,
}

impl SubUpdate {
    /// Check the financier-only rule
    ///
    /// `instrument`, `amount` and `financingStructure` carry a concrete value
    /// only when the role is Financier; other roles may leave them null or `"n/a"`.
    pub fn validate(&self) -> Result<(), String> {
        if self.organization.trim().is_empty() {
            return Err("subUpdate organization is empty".to_string());
        }
        if self.role == SubUpdateRole::Financier {
            return Ok(());
        }

        let concrete_instrument =
            matches!(self.instrument, Some(i) if i != Instrument::NotAvailable);
        let concrete_amount = matches!(self.amount, Some(Figure::Value(_)));
        let concrete_structure = self
            .financing_structure
            .as_deref()
            .map(|s| !is_not_available(s))
            .unwrap_or(false);

        if concrete_instrument || concrete_amount || concrete_structure {
            return Err(format!(
                "subUpdate '{}' has role {} but carries financing details",
                self.organization, self.role
            ));
        }
        Ok(())
    }
}

/// The structured record extracted from one solar financing article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// Link of the original article
    pub news_url: String,

    /// Title of the article
    pub title: String,

    /// Category of the update
    pub news_update_type: NewsUpdateType,

    /// Whether a project or an organization received the investment
    pub receiver_category: ReceiverCategory,

    /// Full article text (soft target: 300 words or more)
    pub text_of_article: String,

    /// Countries of the receiver; country names only
    pub receiver_country: Vec<String>,

    /// Date of the update, dd/mm/yyyy or "n/a"
    pub date: String,

    /// Present only when the receiver is a project
    #[serde(default)]
    pub project_financed: Option<ProjectFinanced>,

    /// Project only
    #[serde(default)]
    pub project_status: Option<ProjectStatus>,

    /// Project only
    #[serde(default)]
    pub project_status_date: Option<String>,

    /// Project only
    #[serde(default)]
    pub technology_and_grid_system: Option<TechnologyAndGridSystem>,

    /// Project only
    #[serde(default)]
    pub type_of_installation: Option<TypeOfInstallation>,

    /// Project only
    #[serde(default)]
    pub grid_type: Option<GridType>,

    /// Project only; installed capacity
    #[serde(default, alias = "PV_Size")]
    pub pv_size: Option<Figure>,

    /// Present only when the receiver is an organization
    #[serde(default)]
    pub organization_financed: Option<OrganizationFinanced>,

    /// Total funding received
    #[serde(default, alias = "totalAmmount")]
    pub total_amount: Option<Figure>,

    /// Parties involved, in article order
    pub sub_updates: Vec<SubUpdate>,
}

impl ExtractedRecord {
    /// Validate the cross-field invariants of the record
    ///
    /// Field types and value sets are already enforced by deserialization;
    /// this checks the rules that span several fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is empty".to_string());
        }

        self.validate_financed_entity()?;
        self.validate_project_fields()?;
        self.validate_countries()?;

        if !is_valid_date(&self.date) {
            return Err(format!("date '{}' is not dd/mm/yyyy", self.date));
        }

        for sub_update in &self.sub_updates {
            sub_update.validate()?;
        }

        Ok(())
    }

    /// Number of whitespace-separated words in `textOfArticle`
    pub fn article_word_count(&self) -> usize {
        self.text_of_article.split_whitespace().count()
    }

    /// Name of the financed project or organization, if any
    pub fn financed_name(&self) -> Option<&str> {
        self.project_financed
            .as_ref()
            .map(|p| p.name.as_str())
            .or_else(|| self.organization_financed.as_ref().map(|o| o.name.as_str()))
    }

    fn validate_financed_entity(&self) -> Result<(), String> {
        let project = self.project_financed.is_some();
        let organization = self.organization_financed.is_some();

        if project && organization {
            return Err("projectFinanced and organizationFinanced are both set".to_string());
        }

        match self.receiver_category {
            ReceiverCategory::Project if !project => {
                Err("receiverCategory is Project but projectFinanced is null".to_string())
            }
            ReceiverCategory::Organization if !organization => Err(
                "receiverCategory is Organization but organizationFinanced is null".to_string(),
            ),
            ReceiverCategory::Other if project || organization => {
                Err("receiverCategory is Other but a financed entity is set".to_string())
            }
            _ => Ok(()),
        }
    }

    fn validate_project_fields(&self) -> Result<(), String> {
        if self.receiver_category == ReceiverCategory::Project {
            return Ok(());
        }

        let set: Vec<&str> = [
            ("projectStatus", self.project_status.is_some()),
            ("projectStatusDate", self.project_status_date.is_some()),
            ("technologyAndGridSystem", self.technology_and_grid_system.is_some()),
            ("typeOfInstallation", self.type_of_installation.is_some()),
            ("gridType", self.grid_type.is_some()),
            ("pvSize", self.pv_size.is_some()),
        ]
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();

        if set.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "project-only fields set for receiverCategory {}: {}",
                self.receiver_category,
                set.join(", ")
            ))
        }
    }

    fn validate_countries(&self) -> Result<(), String> {
        for country in &self.receiver_country {
            let name = country.trim();
            if name.is_empty() {
                return Err("receiverCountry contains an empty name".to_string());
            }
            if NON_COUNTRY_REGIONS.contains(&name.to_lowercase().as_str()) {
                return Err(format!("receiverCountry '{}' is a region, not a country", name));
            }
        }
        Ok(())
    }
}

/// Whether a string is the `"n/a"` marker (case-insensitive)
pub fn is_not_available(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case(NOT_AVAILABLE)
}

/// Whether a string is a dd/mm/yyyy date or the `"n/a"` marker
pub fn is_valid_date(s: &str) -> bool {
    let s = s.trim();
    if is_not_available(s) {
        return true;
    }
    s.len() == 10 && NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}
