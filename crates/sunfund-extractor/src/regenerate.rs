//! Article regeneration from an extracted record

use serde::{Deserialize, Serialize};
use sunfund_domain::ExtractedRecord;

/// Target length of a regenerated article, in words
pub const ARTICLE_WORDS: usize = 600;

/// A newly written article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegeneratedArticle {
    /// Title of the source record
    pub title: String,

    /// Generated article body
    pub content: String,
}

/// Build the prompt asking the model to write an article from the record
pub fn regeneration_prompt(record: &ExtractedRecord) -> String {
    let project = record
        .project_financed
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("Unknown");
    let organization = record
        .organization_financed
        .as_ref()
        .map(|o| o.name.as_str())
        .unwrap_or("Unknown");

    let countries = if record.receiver_country.is_empty() {
        "Unknown".to_string()
    } else {
        record.receiver_country.join(", ")
    };

    let mut prompt = format!(
        "You are an expert at writing news articles about solar power financing. \
         Using the extracted data below, write an article of about {words} words.\n\n\
         Title: {title}\n\
         News Update Type: {update_type}\n\
         Receiver Category: {category}\n\
         Receiver Country: {countries}\n\
         Date: {date}\n\
         Project Financed: {project}\n\
         Organization Financed: {organization}\n",
        words = ARTICLE_WORDS,
        title = record.title,
        update_type = record.news_update_type,
        category = record.receiver_category,
        countries = countries,
        date = record.date,
        project = project,
        organization = organization,
    );

    if !record.sub_updates.is_empty() {
        prompt.push_str("Parties Involved:\n");
        for sub in &record.sub_updates {
            prompt.push_str(&format!("- {} ({})\n", sub.organization, sub.role));
        }
    }

    prompt.push_str(&format!(
        "\nMake the article clear and informative, and keep it within {} words. \
         Respond with the article text only.",
        ARTICLE_WORDS
    ));

    prompt
}
