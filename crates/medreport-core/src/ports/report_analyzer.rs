//! Report analysis port.

use async_trait::async_trait;

use crate::domain::AnalysisResult;

use super::ServiceError;

/// Interprets a photographed or scanned medical report.
#[async_trait]
pub trait ReportAnalyzer: Send + Sync {
    /// Analyse the report image carried by `image_data_url`.
    ///
    /// `image_data_url` is a `data:<mime>;base64,<payload>` URL; the
    /// implementation is responsible for splitting it (see
    /// [`DataUrl::parse`](crate::DataUrl::parse)).
    ///
    /// Fails with [`ServiceError::Analysis`] on any backend or parse failure.
    async fn analyze_report(&self, image_data_url: &str) -> Result<AnalysisResult, ServiceError>;
}
