#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    ActionItem, ActionPriority, AnalysisResult, DEFAULT_IMAGE_MIME, DataUrl, Indicator,
    IndicatorStatus, ResultStep, mime_type_for_extension,
};
pub use ports::{ReportAnalyzer, ServiceError, SpeechSynthesizer, TermExplainer};

#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio as _;
