//! Domain types for analysed medical reports.

mod data_url;
mod report;

pub use data_url::{DEFAULT_IMAGE_MIME, DataUrl, mime_type_for_extension};
pub use report::{
    ActionItem, ActionPriority, AnalysisResult, Indicator, IndicatorStatus, ResultStep,
};
