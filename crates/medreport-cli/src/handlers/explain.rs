//! Explain command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print a plain-language explanation of `term`.
pub async fn execute(ctx: &CliContext, term: &str) -> Result<(), CliError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(CliError::Arguments("请输入要查询的医学名词".to_string()));
    }

    let explanation = ctx.explainer.explain_term(term).await?;

    println!("{term} 的解释：");
    println!("{explanation}");
    Ok(())
}
