//! Email attachments with support for inline and regular attachments.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Width of an encoded base64 line, matching MIME-style wrapping.
const BASE64_LINE_WIDTH: usize = 60;

/// Type of attachment disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentType {
    /// Regular attachment (shown as downloadable file)
    #[default]
    Attachment,
    /// Inline attachment (embedded in HTML via cid:)
    Inline,
}

/// An email attachment.
///
/// # Examples
///
/// ```
/// use courier::Attachment;
///
/// let attachment = Attachment::from_bytes("report.pdf", b"PDF content".to_vec());
/// assert_eq!(attachment.content_type, "application/pdf");
///
/// let logo = Attachment::from_bytes("logo.png", vec![0x89, 0x50, 0x4E, 0x47])
///     .inline()
///     .content_id("company-logo");
/// assert!(logo.is_inline());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename for the attachment
    pub filename: String,
    /// MIME content type (e.g., "application/pdf", "image/png")
    pub content_type: String,
    /// Decoded attachment bytes
    pub data: Vec<u8>,
    /// Whether this is an inline or regular attachment
    pub disposition: AttachmentType,
    /// Content-ID for inline attachments, without angle brackets
    pub content_id: Option<String>,
}

impl Attachment {
    /// Create a new attachment from raw bytes.
    ///
    /// Content type is guessed from the filename extension.
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self {
            filename,
            content_type,
            data,
            disposition: AttachmentType::Attachment,
            content_id: None,
        }
    }

    /// Set the content type explicitly.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set as inline attachment (for embedding in HTML).
    pub fn inline(mut self) -> Self {
        self.disposition = AttachmentType::Inline;
        // Auto-generate content_id from filename if not set
        if self.content_id.is_none() {
            self.content_id = Some(self.filename.clone());
        }
        self
    }

    /// Set the Content-ID for inline attachments.
    ///
    /// This is used to reference the attachment in HTML: `<img src="cid:your-id">`
    pub fn content_id(mut self, cid: impl Into<String>) -> Self {
        let cid = cid.into();
        self.content_id = Some(cid.trim_start_matches('<').trim_end_matches('>').to_string());
        self
    }

    /// Check if this is an inline attachment.
    pub fn is_inline(&self) -> bool {
        self.disposition == AttachmentType::Inline
    }

    /// Name the providers know this attachment by.
    ///
    /// Inline attachments are referenced by content-id, regular ones by filename.
    pub fn reference_name(&self) -> &str {
        match (self.disposition, &self.content_id) {
            (AttachmentType::Inline, Some(cid)) => cid,
            _ => &self.filename,
        }
    }

    /// Get the attachment data as line-wrapped base64.
    pub fn base64_data(&self) -> String {
        encode64(&self.data)
    }
}

/// Encode bytes as standard base64 wrapped at 60 columns.
///
/// Every line, including the last, ends with `\n`. Empty input encodes to
/// an empty string.
pub fn encode64(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 1);
    // base64 output is ASCII, so byte chunks are valid str boundaries
    for line in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
        wrapped.push_str(&String::from_utf8_lossy(line));
        wrapped.push('\n');
    }
    wrapped
}
