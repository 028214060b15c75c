//! PDF export placeholder.

use serde::Serialize;

/// Message returned until PDF rendering exists
pub const PDF_UNAVAILABLE: &str = "PDF export feature coming soon!";

/// Response of a PDF export request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfExport {
    pub success: bool,
    pub message: String,
    pub download_url: Option<String>,
}

/// Accept a PDF export request without rendering anything
pub fn export_pdf(content: &str, title: &str) -> PdfExport {
    tracing::info!(
        "PDF export requested for '{}' ({} bytes); rendering is not available",
        title,
        content.len()
    );
    PdfExport {
        success: true,
        message: PDF_UNAVAILABLE.to_string(),
        download_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_is_a_stub() {
        let export = export_pdf("Body", "Title");
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], PDF_UNAVAILABLE);
        assert!(json["download_url"].is_null());
    }
}
