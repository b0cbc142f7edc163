//! Data types produced and consumed by the analyzer.

pub mod analysis;
pub mod config;
pub mod context;
pub mod extraction;
