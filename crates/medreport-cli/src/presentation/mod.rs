//! Terminal presentation of analysis results.
//!
//! Format-only: no domain transforms beyond the helpers `AnalysisResult`
//! already provides.

pub mod report;

pub use report::{DISCLAIMER, print_report, render_report};
