//! Port definitions for the services the application depends on.
//!
//! Every remote capability is consumed through one of these async traits,
//! so adapters (the Gemini HTTP client, test fakes) can be swapped without
//! touching the playback core or the front end.
//!
//! # Implementations
//!
//! - `medreport_gemini::GeminiClient` implements all three ports
//! - Test fakes in each crate's test suite

mod error;
mod report_analyzer;
mod speech_synthesizer;
mod term_explainer;

pub use error::{
    ANALYSIS_FAILED_MESSAGE, EXPLANATION_FAILED_MESSAGE, SPEECH_FAILED_MESSAGE, ServiceError,
};
pub use report_analyzer::ReportAnalyzer;
pub use speech_synthesizer::SpeechSynthesizer;
pub use term_explainer::{EXPLANATION_FALLBACK, TermExplainer};
