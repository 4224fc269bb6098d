//! Subcommands of the `medreport` binary.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a photographed or scanned report (JPG, PNG, WEBP, HEIC, PDF)
    Analyze {
        /// Path to the report file
        file: PathBuf,
        /// Read the summary aloud afterwards
        #[arg(long)]
        speak: bool,
    },

    /// Explain a medical term in plain language
    Explain {
        /// The term to explain (e.g. "肌酐")
        term: String,
    },

    /// Read text aloud
    Speak {
        /// Text to read
        text: String,
    },
}
