//! LLM prompts for the page analyzer.
//!
//! Each entry point has a fixed system instruction describing the exact JSON
//! shape expected back. The user message is built in one pass with
//! `format!`, so page text that happens to contain `{...}` is never
//! substituted again.

use crate::types::context::PageAnalysisContext;

/// System instruction for classifying a page and choosing the next action.
pub const ANALYZE_SYSTEM_PROMPT: &str = r#"You are a web navigation agent collecting procurement opportunities (bids, RFPs, RFQs, tenders, solicitations) from government and institutional portals.

You receive a screenshot of the rendered page, its markup, and the state of the crawl. Classify the page and decide the single next action.

Respond with ONE JSON object and nothing else:
{
    "pageType": "list" | "detail" | "login" | "error" | "captcha" | "unknown",
    "hasOpportunities": boolean,
    "opportunityCount": integer or null,
    "hasPagination": boolean,
    "paginationType": "numbered" | "next_prev" | "load_more" | "infinite_scroll" | null,
    "currentPageNumber": integer or null,
    "totalPages": integer or null,
    "recommendedAction": {
        "action": "extract" | "click" | "scroll" | "navigate" | "fill" | "wait" | "done" | "error",
        "target": {
            "selector": "CSS selector or null",
            "description": "what the element is",
            "coordinates": {"x": number, "y": number} or null
        } or null,
        "value": "text to fill or URL to navigate to, or null",
        "reason": "why this action",
        "expectedOutcome": "what should be visible after the action succeeds"
    },
    "confidence": number between 0 and 1,
    "notes": "anything unusual, or null"
}

Rules:
- If hasOpportunities is false, opportunityCount must be null or 0.
- If hasPagination is false, paginationType must be null.
- currentPageNumber and totalPages are what the page's own pagination shows, not the crawl counters.
- Use "extract" when opportunities are visible and have not been collected yet.
- "click" and "fill" need a target with a selector or coordinates.
- "fill" puts the text in value and "navigate" puts the URL in value (or gives a target to follow). Leave value null when a person has to supply it, such as login credentials.
- On login, captcha or error pages use "error", or a fill/navigate action describing how to proceed.
- Use "done" when no further opportunities remain or the page budget is spent."#;

/// System instruction for pulling structured records off a page.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You extract procurement opportunities from a web page. Use the screenshot and the markup together; the markup may be truncated.

Respond with ONE JSON object and nothing else:
{
    "opportunities": [
        {
            "title": "required, non-empty",
            "referenceNumber": "string or null",
            "opportunityType": "RFP, RFQ, ITB, ... or null",
            "status": "string or null",
            "postedDate": "string or null",
            "closingDate": "string or null",
            "description": "string or null",
            "category": "string or null",
            "department": "string or null",
            "estimatedValue": "string or null",
            "contactName": "string or null",
            "contactEmail": "string or null",
            "contactPhone": "string or null",
            "detailUrl": "absolute URL or null",
            "documents": [{"name": "string", "url": "string", "type": "string or null"}] or null,
            "rawText": "the verbatim page text this record came from",
            "confidence": number between 0 and 1
        }
    ],
    "extractionNotes": "string or null",
    "hasMoreOpportunities": boolean,
    "needsScroll": boolean
}

Rules:
- Only include opportunities actually shown on the page. Never invent records.
- If there are none, return an empty opportunities array.
- Copy dates and values as written on the page."#;

/// System instruction for locating one element.
pub const FIND_ELEMENT_SYSTEM_PROMPT: &str = r#"You locate elements on a web page screenshot.

Respond with ONE JSON object and nothing else:
{
    "selector": "CSS selector or null",
    "description": "what you found",
    "coordinates": {"x": number, "y": number} or null
}

Coordinates are pixels from the top-left corner of the screenshot, at the center of the element."#;

/// Cut `text` to at most `max_chars` characters.
///
/// Counts `char`s, not bytes, so the cut never lands inside a UTF-8 sequence.
pub fn truncate_markup(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Format the analysis prompt. `markup` should already be truncated.
pub fn format_analysis_prompt(context: &PageAnalysisContext, markup: &str) -> String {
    format!(
        "Goal: {}\n\n\
         Crawl state:\n\
         - Current URL: {}\n\
         - Page: {} of at most {}\n\
         - Opportunities collected so far: {}\n\
         - Previous action: {}\n\n\
         Page markup:\n{}",
        context.goal,
        context.current_url,
        context.page_number,
        context.max_pages,
        context.opportunities_found,
        context.previous_action.as_deref().unwrap_or("none"),
        markup,
    )
}

/// Format the extraction prompt. `markup` should already be truncated.
pub fn format_extraction_prompt(url: &str, markup: &str) -> String {
    format!("Page URL: {}\n\nPage markup:\n{}", url, markup)
}

/// Format the element lookup prompt.
pub fn format_find_element_prompt(description: &str) -> String {
    format!("Find this element: {}", description)
}
