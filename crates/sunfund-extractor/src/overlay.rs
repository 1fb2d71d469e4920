//! Auxiliary overlay of country, date and amount
//!
//! A narrower scrape asks only for `receiverCountry`, `date` and
//! `totalAmount`. Each usable value replaces the primary record's field; a
//! missing, sentinel or malformed value leaves the primary field as it was,
//! and a failed scrape changes nothing.

use serde_json::{Map, Value};
use sunfund_domain::{is_valid_date, ExtractedRecord, FieldScraper, FieldSpec, Figure};
use tracing::{debug, info, warn};

/// Scraped values that mean "nothing found"
const SENTINELS: &[&str] = &["na", "n/a", "unknown", "none", "null"];

/// The three fields the overlay requests
pub fn overlay_field_spec() -> FieldSpec {
    FieldSpec::default()
        .with_field(
            "receiverCountry",
            "Country of the project or organization receiving the investment. \
             Several countries may be listed, separated by commas. Countries only, \
             never a region or continent.",
        )
        .with_field("date", "Date of the news update, formatted \"dd/mm/yyyy\".")
        .with_field(
            "totalAmount",
            "Total funding amount as an integer or float; the full figure, not abbreviated.",
        )
}

/// Usable values taken from a scrape result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayValues {
    /// Receiver countries
    pub receiver_country: Option<Vec<String>>,

    /// Date, dd/mm/yyyy
    pub date: Option<String>,

    /// Total amount
    pub total_amount: Option<Figure>,
}

impl OverlayValues {
    /// Pick the usable values out of a scrape result
    pub fn from_scrape(scraped: &Map<String, Value>) -> Self {
        Self {
            receiver_country: scraped.get("receiverCountry").and_then(countries),
            date: scraped.get("date").and_then(date),
            total_amount: scraped.get("totalAmount").and_then(amount),
        }
    }

    /// Whether no field is usable
    pub fn is_empty(&self) -> bool {
        self.receiver_country.is_none() && self.date.is_none() && self.total_amount.is_none()
    }
}

fn is_sentinel(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || SENTINELS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

fn countries(value: &Value) -> Option<Vec<String>> {
    let names: Vec<String> = match value {
        Value::String(s) if is_sentinel(s) => return None,
        Value::String(s) if s.contains(',') => s.split(',').map(|c| c.trim().to_string()).collect(),
        Value::String(s) => vec![s.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|c| c.trim().to_string())
            .collect(),
        _ => return None,
    };

    let names: Vec<String> = names.into_iter().filter(|c| !is_sentinel(c)).collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn date(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if is_sentinel(s) || !is_valid_date(s) {
        return None;
    }
    Some(s.to_string())
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₦', '₹', '₵', '₱', '₩', '₪'];

fn amount(value: &Value) -> Option<Figure> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if is_sentinel(s) => return None,
        Value::String(s) => {
            // Currency prefix and thousands separators only; "1.5m" is not a full figure
            let cleaned: String = s
                .trim()
                .trim_start_matches(|c: char| {
                    c.is_alphabetic() || c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c)
                })
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if !cleaned.starts_with(|c: char| c.is_ascii_digit())
                || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
            {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if parsed.is_finite() && parsed >= 0.0 {
        Some(Figure::Value(parsed))
    } else {
        None
    }
}

/// Overwrite record fields with the usable overlay values
///
/// A value that would make the record invalid (a region in place of a
/// country, for instance) is skipped. Returns the names of the fields that
/// were replaced.
pub fn apply_overlay(record: &mut ExtractedRecord, values: &OverlayValues) -> Vec<&'static str> {
    let mut applied = Vec::new();

    if let Some(countries) = &values.receiver_country {
        let mut candidate = record.clone();
        candidate.receiver_country = countries.clone();
        if candidate.validate().is_ok() {
            *record = candidate;
            applied.push("receiverCountry");
        } else {
            debug!(?countries, "overlay countries rejected");
        }
    }

    if let Some(date) = &values.date {
        record.date = date.clone();
        applied.push("date");
    }

    if let Some(amount) = values.total_amount {
        record.total_amount = Some(amount);
        applied.push("totalAmount");
    }

    applied
}

/// Run the scrape and apply whatever it yields
///
/// Best effort: a scrape failure is logged and the record is left untouched.
pub async fn run_overlay<S>(
    scraper: &S,
    source: &str,
    record: &mut ExtractedRecord,
) -> Vec<&'static str>
where
    S: FieldScraper + ?Sized,
{
    let scraped = match scraper.scrape(source, &overlay_field_spec()).await {
        Ok(scraped) => scraped,
        Err(e) => {
            warn!("Overlay scrape failed, keeping primary values: {}", e);
            return Vec::new();
        }
    };

    let values = OverlayValues::from_scrape(&scraped);
    let applied = apply_overlay(record, &values);
    info!(?applied, "Overlay applied");
    applied
}
