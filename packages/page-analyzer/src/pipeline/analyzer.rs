//! The page analyzer: one model call per entry point.

use tracing::{info, instrument, warn};

use crate::error::{AnalyzerError, Result};
use crate::traits::vision::{VisionModel, VisionRequest};
use crate::types::analysis::{ElementTarget, PageAnalysis};
use crate::types::config::AnalyzerConfig;
use crate::types::context::PageAnalysisContext;
use crate::types::extraction::ExtractedData;

use super::parse::{parse_element_target, parse_extracted_data, parse_page_analysis};
use super::prompts::{
    format_analysis_prompt, format_extraction_prompt, format_find_element_prompt,
    truncate_markup, ANALYZE_SYSTEM_PROMPT, EXTRACT_SYSTEM_PROMPT, FIND_ELEMENT_SYSTEM_PROMPT,
};

/// Turns page snapshots into typed decisions.
///
/// Each entry point makes exactly one model call and never retries. Failures
/// come back as [`AnalyzerError`] with the transport, parse and validation
/// cases kept apart. The analyzer holds no per-call state, so one instance can
/// serve many crawls concurrently if the model can.
#[derive(Debug, Clone)]
pub struct PageAnalyzer<M> {
    model: M,
    config: AnalyzerConfig,
}

impl<M: VisionModel> PageAnalyzer<M> {
    /// Create an analyzer with the default configuration.
    pub fn new(model: M) -> Self {
        Self::with_config(model, AnalyzerConfig::default())
    }

    pub fn with_config(model: M, config: AnalyzerConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Classify the page and choose the next action.
    ///
    /// The crawl counters in `context` are passed to the model untouched.
    /// Enforcing the page budget is the caller's job.
    #[instrument(
        skip(self, screenshot, markup, context),
        fields(url = %context.current_url, page = context.page_number, max_pages = context.max_pages)
    )]
    pub async fn analyze_page(
        &self,
        screenshot: &str,
        markup: &str,
        context: &PageAnalysisContext,
    ) -> Result<PageAnalysis> {
        let markup = self.truncate(markup);
        let request = VisionRequest::new(
            ANALYZE_SYSTEM_PROMPT,
            format_analysis_prompt(context, markup),
        )
        .with_image(screenshot);

        let raw = self.call(request).await?;
        let analysis = parse_page_analysis(&raw).inspect_err(log_failure)?;

        info!(
            page_type = %analysis.page_type,
            action = %analysis.recommended_action.action,
            has_opportunities = analysis.has_opportunities,
            opportunity_count = ?analysis.opportunity_count,
            confidence = analysis.confidence,
            "Page analyzed"
        );
        Ok(analysis)
    }

    /// Pull opportunity records off the page.
    ///
    /// An empty list is a valid result, not an error.
    #[instrument(skip(self, screenshot, markup))]
    pub async fn extract_data(
        &self,
        screenshot: &str,
        markup: &str,
        url: &str,
    ) -> Result<ExtractedData> {
        let markup = self.truncate(markup);
        let request = VisionRequest::new(EXTRACT_SYSTEM_PROMPT, format_extraction_prompt(url, markup))
            .with_image(screenshot);

        let raw = self.call(request).await?;
        let data = parse_extracted_data(&raw).inspect_err(log_failure)?;

        info!(
            opportunities = data.opportunities.len(),
            has_more = data.has_more_opportunities,
            needs_scroll = data.needs_scroll,
            "Opportunities extracted"
        );
        Ok(data)
    }

    /// Locate one described element on the screenshot.
    ///
    /// Selector and coordinates are best effort. The returned description is
    /// the model's, or `description` when the model gave none.
    #[instrument(skip(self, screenshot))]
    pub async fn find_element(&self, screenshot: &str, description: &str) -> Result<ElementTarget> {
        let request = VisionRequest::new(
            FIND_ELEMENT_SYSTEM_PROMPT,
            format_find_element_prompt(description),
        )
        .with_image(screenshot);

        let raw = self.call(request).await?;
        let target = parse_element_target(&raw, description).inspect_err(log_failure)?;

        info!(
            selector = ?target.selector,
            has_coordinates = target.coordinates.is_some(),
            "Element located"
        );
        Ok(target)
    }

    fn truncate<'a>(&self, markup: &'a str) -> &'a str {
        let truncated = truncate_markup(markup, self.config.max_markup_chars);
        if truncated.len() < markup.len() {
            info!(
                original_bytes = markup.len(),
                kept_chars = self.config.max_markup_chars,
                "Markup truncated"
            );
        }
        truncated
    }

    async fn call(&self, request: VisionRequest) -> Result<String> {
        self.model.complete(request).await.map_err(|e| {
            warn!(kind = %e.kind(), error = %e.inner(), "Model call failed");
            AnalyzerError::from(e)
        })
    }
}

fn log_failure(error: &AnalyzerError) {
    match error {
        AnalyzerError::Parse(e) => warn!(
            direct = %e.direct,
            brace_span = %e.brace_span,
            response_len = e.raw.len(),
            "No JSON object in model response"
        ),
        AnalyzerError::Validation(e) => warn!(
            path = %e.path,
            reason = %e.reason,
            "Model response failed validation"
        ),
        AnalyzerError::Transport(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::testing::MockVisionModel;
    use crate::types::analysis::{ActionType, PageType, PaginationType};
    use serde_json::json;

    fn analysis_json() -> serde_json::Value {
        json!({
            "pageType": "list",
            "hasOpportunities": true,
            "opportunityCount": 8,
            "hasPagination": true,
            "paginationType": "numbered",
            "currentPageNumber": 2,
            "totalPages": 7,
            "recommendedAction": {
                "action": "extract",
                "reason": "eight solicitations are listed",
                "expectedOutcome": "eight records extracted"
            },
            "confidence": 0.92
        })
    }

    fn context() -> PageAnalysisContext {
        PageAnalysisContext::new("https://portal.example/list?page=2", "collect open solicitations")
            .with_page(2, 5)
            .with_opportunities_found(12)
    }

    #[tokio::test]
    async fn test_analyze_page_sends_one_request_with_screenshot() {
        let model = MockVisionModel::new().with_json(analysis_json());
        let analyzer = PageAnalyzer::new(model.clone());

        let analysis = analyzer
            .analyze_page("iVBORw0KGgo=", "<table></table>", &context())
            .await
            .unwrap();

        assert_eq!(analysis.page_type, PageType::List);
        assert_eq!(analysis.pagination_type, Some(PaginationType::Numbered));
        assert_eq!(analysis.current_page_number, Some(2));
        assert_eq!(analysis.total_pages, Some(7));
        assert_eq!(analysis.recommended_action.action, ActionType::Extract);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, ANALYZE_SYSTEM_PROMPT);
        assert_eq!(requests[0].image.as_deref(), Some("iVBORw0KGgo="));
        assert!(requests[0].json_output);
        assert!(requests[0].prompt.contains("Page: 2 of at most 5"));
    }

    #[tokio::test]
    async fn test_markup_truncated_to_config() {
        let model = MockVisionModel::new().with_json(analysis_json());
        let config = AnalyzerConfig::default().with_max_markup_chars(10);
        let analyzer = PageAnalyzer::with_config(model.clone(), config);

        let markup = format!("0123456789{}", "X".repeat(500));
        analyzer.analyze_page("", &markup, &context()).await.unwrap();

        let prompt = model.last_request().unwrap().prompt;
        assert!(prompt.ends_with("0123456789"));
        assert!(!prompt.contains('X'));
    }

    #[tokio::test]
    async fn test_markup_cap_holds_when_goal_repeats_placeholder() {
        let model = MockVisionModel::new().with_json(analysis_json());
        let config = AnalyzerConfig::default().with_max_markup_chars(100);
        let analyzer = PageAnalyzer::with_config(model.clone(), config);
        let context = PageAnalysisContext::new("https://portal.example", "{markup}".repeat(50))
            .with_previous_action("{markup}");

        analyzer
            .analyze_page("", &"M".repeat(500), &context)
            .await
            .unwrap();

        let prompt = model.last_request().unwrap().prompt;
        assert_eq!(prompt.matches('M').count(), 100);
    }

    #[tokio::test]
    async fn test_empty_screenshot_sends_text_only() {
        let model = MockVisionModel::new().with_json(json!({
            "opportunities": [],
            "hasMoreOpportunities": false,
            "needsScroll": false
        }));
        let analyzer = PageAnalyzer::new(model.clone());

        analyzer.extract_data("", "<p>nothing</p>", "https://portal.example").await.unwrap();
        assert_eq!(model.last_request().unwrap().image, None);
    }

    #[tokio::test]
    async fn test_transport_error_not_retried() {
        let model = MockVisionModel::new()
            .with_error(TransportError::new(TransportErrorKind::Timeout, "deadline elapsed"))
            .with_json(analysis_json());
        let analyzer = PageAnalyzer::new(model.clone());

        let err = analyzer.analyze_page("", "", &context()).await.unwrap_err();

        assert!(err.is_transport());
        let AnalyzerError::Transport(transport) = err else {
            panic!("expected transport error");
        };
        assert_eq!(transport.kind(), TransportErrorKind::Timeout);
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.remaining(), 1);
    }

    #[tokio::test]
    async fn test_garbage_response_is_parse_error() {
        let model = MockVisionModel::new().with_response("I'm sorry, I can't see the page.");
        let analyzer = PageAnalyzer::new(model);

        let err = analyzer.analyze_page("", "", &context()).await.unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.raw_response(), Some("I'm sorry, I can't see the page."));
    }

    #[tokio::test]
    async fn test_login_wall_is_a_result_not_an_error() {
        let model = MockVisionModel::new().with_json(json!({
            "pageType": "login",
            "hasOpportunities": false,
            "hasPagination": false,
            "recommendedAction": {
                "action": "error",
                "reason": "the portal requires an account",
                "expectedOutcome": "manual login"
            },
            "confidence": 0.97
        }));
        let analyzer = PageAnalyzer::new(model);

        let analysis = analyzer.analyze_page("", "", &context()).await.unwrap();
        assert!(analysis.page_type.is_blocking());
        assert!(!analysis.should_extract());
    }

    #[tokio::test]
    async fn test_find_element_uses_description_prompt() {
        let model = MockVisionModel::new()
            .with_response(r#"{"selector": "a.next", "description": "Next page link"}"#);
        let analyzer = PageAnalyzer::new(model.clone());

        let target = analyzer.find_element("QUJD", "the next page link").await.unwrap();

        assert_eq!(target.selector.as_deref(), Some("a.next"));
        assert_eq!(target.description, "Next page link");
        assert_eq!(model.last_request().unwrap().system, FIND_ELEMENT_SYSTEM_PROMPT);
        assert!(model.last_request().unwrap().prompt.contains("the next page link"));
    }
}
