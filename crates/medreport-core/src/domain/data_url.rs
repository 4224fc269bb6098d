//! `data:` URL handling for report images.
//!
//! The analysis service takes the MIME type and the base64 payload as two
//! separate fields, so callers hand over a data URL and adapters split it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// MIME type assumed when a data URL does not declare one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A parsed `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    payload: String,
}

impl DataUrl {
    /// Build a data URL from raw bytes.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Split a data URL into MIME type and base64 payload.
    ///
    /// Accepts the strict `data:<type>/<subtype>;base64,<payload>` form. Anything
    /// else falls back to splitting on a single comma (keeping the default MIME
    /// type), and finally to treating the whole input as a bare payload.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if let Some((mime_type, payload)) = parse_strict(input) {
            return Self {
                mime_type: mime_type.to_string(),
                payload: payload.to_string(),
            };
        }

        tracing::debug!("Data URL is not in strict form, falling back to comma split");

        let mut parts = input.split(',');
        let payload = match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), None) => payload,
            _ => input,
        };

        Self {
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            payload: payload.to_string(),
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload, without the `data:` prefix.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

fn parse_strict(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    let (kind, subtype) = mime_type.split_once('/')?;

    let kind_ok = !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric());
    let subtype_ok = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'));

    (kind_ok && subtype_ok && !payload.is_empty()).then_some((mime_type, payload))
}

/// Guess the MIME type of a report file from its extension.
#[must_use]
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}
