//! Per-call crawl state handed to the analyzer.

use serde::{Deserialize, Serialize};

/// What the crawl loop knows when it asks about one page.
///
/// The counters here belong to the crawl loop. They are reported to the
/// model as-is; the analyzer never enforces `page_number <= max_pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysisContext {
    pub current_url: String,

    /// 1-based index of the page being analyzed
    pub page_number: u32,

    /// Highest page index the crawl may reach
    pub max_pages: u32,

    /// Opportunities collected so far in this crawl
    pub opportunities_found: usize,

    /// Human description of the action that led to this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_action: Option<String>,

    pub goal: String,
}

impl PageAnalysisContext {
    /// Context for the first page of a crawl.
    pub fn new(current_url: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            current_url: current_url.into(),
            page_number: 1,
            max_pages: 1,
            opportunities_found: 0,
            previous_action: None,
            goal: goal.into(),
        }
    }

    pub fn with_page(mut self, page_number: u32, max_pages: u32) -> Self {
        self.page_number = page_number;
        self.max_pages = max_pages;
        self
    }

    pub fn with_opportunities_found(mut self, count: usize) -> Self {
        self.opportunities_found = count;
        self
    }

    pub fn with_previous_action(mut self, action: impl Into<String>) -> Self {
        self.previous_action = Some(action.into());
        self
    }

    /// Whether the crawl's own page budget allows another page after this one.
    pub fn has_page_budget(&self) -> bool {
        self.page_number < self.max_pages
    }
}
