//! Medical terminology explanation port.

use async_trait::async_trait;

use super::ServiceError;

/// Returned instead of an empty explanation.
pub const EXPLANATION_FALLBACK: &str = "抱歉，我暂时无法解释这个词，请换个词试试。";

/// Explains a single medical term in plain language.
#[async_trait]
pub trait TermExplainer: Send + Sync {
    /// Explain `term` in a few friendly sentences.
    ///
    /// Fails with [`ServiceError::Explanation`].
    async fn explain_term(&self, term: &str) -> Result<String, ServiceError>;
}
