//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Validate CLI input, call a service port, format output for the terminal
//! - Service failures surface as the port's user-facing message

pub mod analyze;
pub mod explain;
pub mod speak;
