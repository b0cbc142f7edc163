//! Page Analyzer
//!
//! The decision engine behind a procurement-portal crawler. Given one page
//! snapshot (screenshot plus markup) and the crawl's running state, it asks a
//! vision-capable model what kind of page this is and what to do next, or to
//! pull opportunity records off the page, and treats every answer as
//! untrusted input until it has been recovered and validated.
//!
//! # Usage
//!
//! ```rust,ignore
//! use page_analyzer::{PageAnalysisContext, PageAnalyzer};
//! use page_analyzer::testing::MockVisionModel;
//!
//! let model = MockVisionModel::new().with_response(r#"{"pageType": "list", ...}"#);
//! let analyzer = PageAnalyzer::new(model);
//!
//! let context = PageAnalysisContext::new("https://portal.example/bids", "collect open solicitations")
//!     .with_page(1, 5);
//! let analysis = analyzer.analyze_page(&screenshot_b64, &html, &context).await?;
//!
//! if analysis.should_extract() {
//!     let data = analyzer.extract_data(&screenshot_b64, &html, &context.current_url).await?;
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`] - Context, analysis and extraction data types
//! - [`validate`] - Strict schema validators over decoded JSON
//! - [`pipeline`] - Prompts, JSON recovery and the analyzer
//! - [`traits`] - The vision model seam
//! - [`ai`] - OpenAI-backed model (feature `openai`)
//! - [`testing`] - Scripted model for tests

pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

#[cfg(feature = "openai")]
pub mod ai;

pub use error::{
    AnalyzerError, ConfigError, ResponseParseError, ResponseValidationError, Result,
    TransportError, TransportErrorKind,
};
pub use pipeline::{
    parse_element_target, parse_extracted_data, parse_page_analysis, parse_recommended_action,
    recover_json, truncate_markup, PageAnalyzer, Recovered, RecoveryStage,
};
pub use traits::vision::{VisionModel, VisionRequest};
pub use types::{
    analysis::{
        ActionType, Coordinates, ElementTarget, PageAnalysis, PageType, PaginationType,
        RecommendedAction,
    },
    config::{AnalyzerConfig, DEFAULT_MAX_MARKUP_CHARS},
    context::PageAnalysisContext,
    extraction::{Document, ExtractedData, ExtractedOpportunity},
};
pub use validate::{
    lenient_element_target, validate_extracted_data, validate_page_analysis,
    validate_recommended_action,
};

#[cfg(feature = "openai")]
pub use ai::OpenAIVisionModel;
