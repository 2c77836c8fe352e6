use bytes::Bytes;
use serde::{Serialize, Serializer};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";

/// Declared content type of an uploaded resume.
///
/// Parsing is total: anything that is neither PDF nor plain text is kept as
/// `Other` so the extractor can reject it with a typed error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    Pdf,
    Other(String),
}

impl ContentType {
    /// Parses a MIME string, ignoring parameters (`text/plain; charset=utf-8`) and case.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            MIME_PDF | "application/x-pdf" => ContentType::Pdf,
            MIME_TEXT | "text/markdown" | "text/csv" => ContentType::PlainText,
            _ => ContentType::Other(essence),
        }
    }

    /// Guesses the content type from a file name, as the upload form only accepts .txt and .pdf.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(ContentType::Pdf),
            "txt" => Some(ContentType::PlainText),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &str {
        match self {
            ContentType::PlainText => MIME_TEXT,
            ContentType::Pdf => MIME_PDF,
            ContentType::Other(mime) => mime,
        }
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_mime())
    }
}

/// An uploaded resume. Lives for a single request and is never mutated.
#[derive(Debug, Clone)]
pub struct RawDocument {
    bytes: Bytes,
    content_type: ContentType,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime_recognises_pdf_and_text() {
        assert_eq!(ContentType::from_mime("application/pdf"), ContentType::Pdf);
        assert_eq!(ContentType::from_mime("text/plain"), ContentType::PlainText);
        assert_eq!(
            ContentType::from_mime("Text/Plain; charset=utf-8"),
            ContentType::PlainText
        );
    }

    #[test]
    fn test_from_mime_keeps_unknown_types() {
        assert_eq!(
            ContentType::from_mime("image/png"),
            ContentType::Other("image/png".to_string())
        );
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(ContentType::from_file_name("cv.PDF"), Some(ContentType::Pdf));
        assert_eq!(
            ContentType::from_file_name("resume.final.txt"),
            Some(ContentType::PlainText)
        );
        assert_eq!(ContentType::from_file_name("resume.docx"), None);
        assert_eq!(ContentType::from_file_name("resume"), None);
    }
}
