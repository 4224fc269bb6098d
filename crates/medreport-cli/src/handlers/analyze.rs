//! Analyze command handler.
//!
//! Reads a report file, sends it to the analysis service as a data URL and
//! prints the three-step reading. With `--speak` the summary is read aloud.

use std::ffi::OsStr;
use std::path::Path;

use medreport_core::{DataUrl, mime_type_for_extension};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::speak;
use crate::presentation::print_report;

/// Execute the analyze command.
pub async fn execute(ctx: &CliContext, file: &Path, speak_summary: bool) -> Result<(), CliError> {
    let report = load_report(file)?;
    tracing::info!(file = %file.display(), mime = report.mime_type(), "Analysing report");

    eprintln!("正在分析报告，请稍等...");
    let result = ctx.analyzer.analyze_report(&report.to_string()).await?;

    print_report(&result);

    if speak_summary {
        speak::read_aloud(ctx, &result.summary).await?;
    }
    Ok(())
}

/// Read a report file into a data URL, inferring the MIME type from the
/// extension.
pub fn load_report(file: &Path) -> Result<DataUrl, CliError> {
    let extension = file.extension().and_then(OsStr::to_str).unwrap_or_default();
    let mime_type = mime_type_for_extension(extension).ok_or_else(|| {
        CliError::Arguments(format!(
            "不支持的文件格式：{}（支持 JPG、PNG、WEBP、HEIC、PDF 文件）",
            file.display()
        ))
    })?;

    let bytes = std::fs::read(file)?;
    if bytes.is_empty() {
        return Err(CliError::Arguments(format!("文件是空的：{}", file.display())));
    }

    Ok(DataUrl::from_bytes(mime_type, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{FakeServices, context};
    use medreport_core::ServiceError;
    use medreport_core::ports::ANALYSIS_FAILED_MESSAGE;
    use std::io::Write;

    fn report_file(extension: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_load_report_builds_data_url() {
        let file = report_file("PNG", b"ABC");
        let url = load_report(file.path()).unwrap();
        assert_eq!(url.to_string(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let file = report_file("docx", b"ABC");
        assert!(matches!(load_report(file.path()), Err(CliError::Arguments(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_report(&dir.path().join("missing.jpg"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = report_file("jpg", b"");
        assert!(matches!(load_report(file.path()), Err(CliError::Arguments(_))));
    }

    #[test]
    fn test_analyze_prints_report() {
        let file = report_file("jpg", b"\xff\xd8\xff");
        let ctx = context(FakeServices::default());
        assert!(tokio_test::block_on(execute(&ctx, file.path(), false)).is_ok());
    }

    #[test]
    fn test_analysis_failure_shows_user_message() {
        let file = report_file("jpg", b"\xff\xd8\xff");
        let ctx = context(FakeServices {
            analysis: Err(ServiceError::Analysis("bad json".into())),
            ..FakeServices::default()
        });
        let err = tokio_test::block_on(execute(&ctx, file.path(), false)).unwrap_err();
        assert_eq!(err.to_string(), ANALYSIS_FAILED_MESSAGE);
        assert_eq!(err.exit_code(), 1);
    }
}
