//! Structured opportunity records pulled from a page.

use serde::{Deserialize, Serialize};

use crate::validate::de;

/// A file attached to an opportunity (spec sheet, addendum, form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub url: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

/// One procurement opportunity as read off the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedOpportunity {
    #[serde(deserialize_with = "de::non_blank")]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,

    /// RFP, RFQ, ITB, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,

    /// Verbatim page text the record was derived from
    pub raw_text: String,

    #[serde(deserialize_with = "de::unit_interval")]
    pub confidence: f64,
}

/// Everything one extraction call produced.
///
/// The two flags are hints for the crawl loop; the analyzer never acts on
/// them. Both are required on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub opportunities: Vec<ExtractedOpportunity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_notes: Option<String>,

    /// The page likely holds more opportunities than were visible
    pub has_more_opportunities: bool,

    /// Scroll before extracting again
    pub needs_scroll: bool,
}

impl ExtractedData {
    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    /// Records at or above a confidence floor.
    pub fn confident(&self, min_confidence: f64) -> impl Iterator<Item = &ExtractedOpportunity> {
        self.opportunities
            .iter()
            .filter(move |o| o.confidence >= min_confidence)
    }
}
