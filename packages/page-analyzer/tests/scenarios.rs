//! End-to-end decision cycles through the public API with a scripted model.

use page_analyzer::testing::MockVisionModel;
use page_analyzer::{
    ActionType, AnalyzerError, PageAnalysisContext, PageAnalyzer, PageType, PaginationType,
    TransportError, TransportErrorKind,
};
use serde_json::json;

const SCREENSHOT: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn second_list_page() -> PageAnalysisContext {
    PageAnalysisContext::new("https://portal.example/list?page=2", "collect open solicitations")
        .with_page(2, 5)
        .with_opportunities_found(12)
}

#[tokio::test]
async fn analyze_list_page_with_numbered_pagination() {
    let model = MockVisionModel::new().with_json(json!({
        "pageType": "list",
        "hasOpportunities": true,
        "opportunityCount": 8,
        "hasPagination": true,
        "paginationType": "numbered",
        "recommendedAction": {
            "action": "extract",
            "reason": "eight open solicitations are listed",
            "expectedOutcome": "eight opportunity records"
        },
        "confidence": 0.9
    }));
    let analyzer = PageAnalyzer::new(model.clone());

    let analysis = analyzer
        .analyze_page(SCREENSHOT, "<table><tr><td>Bid 1</td></tr></table>", &second_list_page())
        .await
        .unwrap();

    assert_eq!(analysis.page_type, PageType::List);
    assert!(analysis.has_opportunities);
    assert_eq!(analysis.opportunity_count, Some(8));
    assert!(analysis.has_pagination);
    assert_eq!(analysis.pagination_type, Some(PaginationType::Numbered));
    assert_eq!(analysis.recommended_action.action, ActionType::Extract);
    assert!(analysis.should_extract());

    let prompt = model.last_request().unwrap().prompt;
    assert!(prompt.contains("https://portal.example/list?page=2"));
    assert!(prompt.contains("collect open solicitations"));
    assert!(prompt.contains("12"));
}

#[tokio::test]
async fn unknown_page_type_is_rejected_not_coerced() {
    let model = MockVisionModel::new().with_json(json!({
        "pageType": "survey",
        "hasOpportunities": false,
        "hasPagination": false,
        "recommendedAction": {
            "action": "done",
            "reason": "nothing here",
            "expectedOutcome": "crawl stops"
        },
        "confidence": 0.5
    }));
    let analyzer = PageAnalyzer::new(model);

    let err = analyzer
        .analyze_page(SCREENSHOT, "<form></form>", &second_list_page())
        .await
        .unwrap_err();

    let AnalyzerError::Validation(validation) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(validation.path, "pageType");
    assert_eq!(validation.value, json!("survey"));
}

#[tokio::test]
async fn login_form_fill_waits_for_credentials() {
    let model = MockVisionModel::new().with_json(json!({
        "pageType": "login",
        "hasOpportunities": false,
        "hasPagination": false,
        "recommendedAction": {
            "action": "fill",
            "target": {"selector": "#username", "description": "Username field"},
            "value": null,
            "reason": "bids are only listed after signing in",
            "expectedOutcome": "bid list after login"
        },
        "confidence": 0.88
    }));
    let analyzer = PageAnalyzer::new(model);

    let analysis = analyzer
        .analyze_page(SCREENSHOT, "<form id=\"login\"></form>", &second_list_page())
        .await
        .unwrap();

    assert_eq!(analysis.page_type, PageType::Login);
    assert_eq!(analysis.recommended_action.action, ActionType::Fill);
    assert!(analysis.recommended_action.needs_input());
}

#[tokio::test]
async fn extraction_missing_scroll_flag_is_rejected() {
    let model = MockVisionModel::new().with_json(json!({
        "opportunities": [],
        "hasMoreOpportunities": false
    }));
    let analyzer = PageAnalyzer::new(model);

    let err = analyzer
        .extract_data(SCREENSHOT, "<p>No open bids.</p>", "https://portal.example/bids")
        .await
        .unwrap_err();

    let AnalyzerError::Validation(validation) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(validation.path, "needsScroll");
}

#[tokio::test]
async fn extraction_with_no_opportunities_is_empty_result() {
    let model = MockVisionModel::new().with_json(json!({
        "opportunities": [],
        "extractionNotes": "the list is empty",
        "hasMoreOpportunities": false,
        "needsScroll": false
    }));
    let analyzer = PageAnalyzer::new(model);

    let data = analyzer
        .extract_data(SCREENSHOT, "<p>No open bids.</p>", "https://portal.example/bids")
        .await
        .unwrap();

    assert!(data.opportunities.is_empty());
    assert!(!data.has_more_opportunities);
    assert!(!data.needs_scroll);
}

#[tokio::test]
async fn extraction_rejects_record_without_title() {
    let model = MockVisionModel::new().with_json(json!({
        "opportunities": [
            {"title": "Snow removal", "rawText": "Snow removal RFP", "confidence": 0.9},
            {"rawText": "untitled row", "confidence": 0.4}
        ],
        "hasMoreOpportunities": true,
        "needsScroll": false
    }));
    let analyzer = PageAnalyzer::new(model);

    let err = analyzer
        .extract_data(SCREENSHOT, "<ul></ul>", "https://portal.example/bids")
        .await
        .unwrap_err();

    let AnalyzerError::Validation(validation) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(validation.path, "opportunities[1].title");
}

#[tokio::test]
async fn find_element_keeps_model_description() {
    let model = MockVisionModel::new()
        .with_response(r#"```json
{"description": "Blue 'Next' link under the table"}
```"#);
    let analyzer = PageAnalyzer::new(model);

    let target = analyzer.find_element(SCREENSHOT, "next page link").await.unwrap();

    assert_eq!(target.selector, None);
    assert_eq!(target.coordinates, None);
    assert_eq!(target.description, "Blue 'Next' link under the table");
}

#[tokio::test]
async fn find_element_falls_back_to_caller_description() {
    let model = MockVisionModel::new().with_json(json!({"selector": null}));
    let analyzer = PageAnalyzer::new(model);

    let target = analyzer.find_element(SCREENSHOT, "next page link").await.unwrap();

    assert_eq!(target.description, "next page link");
    assert!(!target.is_locatable());
}

#[tokio::test]
async fn error_kinds_stay_distinct() {
    let model = MockVisionModel::new()
        .with_error(TransportError::new(TransportErrorKind::RateLimited, "quota exceeded"))
        .with_response("The page shows a list of bids.")
        .with_json(json!({"pageType": "list"}));
    let analyzer = PageAnalyzer::new(model);
    let context = second_list_page();

    let transport = analyzer.analyze_page(SCREENSHOT, "", &context).await.unwrap_err();
    let parse = analyzer.analyze_page(SCREENSHOT, "", &context).await.unwrap_err();
    let validation = analyzer.analyze_page(SCREENSHOT, "", &context).await.unwrap_err();

    assert!(transport.is_transport());
    assert!(matches!(
        &transport,
        AnalyzerError::Transport(e) if e.is_transient() && e.kind() == TransportErrorKind::RateLimited
    ));
    assert!(parse.is_parse());
    assert_eq!(parse.raw_response(), Some("The page shows a list of bids."));
    assert!(validation.is_validation());
}

#[tokio::test]
async fn concurrent_calls_share_one_analyzer() {
    let response = json!({
        "pageType": "detail",
        "hasOpportunities": true,
        "opportunityCount": 1,
        "hasPagination": false,
        "recommendedAction": {
            "action": "navigate",
            "value": "https://portal.example/list",
            "reason": "back to the list",
            "expectedOutcome": "list page"
        },
        "confidence": 1.0
    });
    let model = MockVisionModel::new()
        .with_json(response.clone())
        .with_json(response);
    let analyzer = std::sync::Arc::new(PageAnalyzer::new(model.clone()));

    let a = PageAnalysisContext::new("https://portal.example/bid/1", "collect open solicitations");
    let b = PageAnalysisContext::new("https://other.example/bid/9", "collect open solicitations");
    let (first, second) = tokio::join!(
        analyzer.analyze_page(SCREENSHOT, "", &a),
        analyzer.analyze_page(SCREENSHOT, "", &b),
    );

    assert_eq!(first.unwrap().page_type, PageType::Detail);
    assert_eq!(second.unwrap().recommended_action.action, ActionType::Navigate);
    assert_eq!(model.call_count(), 2);
}
