//! Request building, response recovery and the analyzer itself.

pub mod analyzer;
pub mod parse;
pub mod prompts;

pub use analyzer::PageAnalyzer;
pub use parse::{
    parse_element_target, parse_extracted_data, parse_page_analysis, parse_recommended_action,
    recover_json, Recovered, RecoveryStage,
};
pub use prompts::truncate_markup;
