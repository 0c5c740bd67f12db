//! Wire payloads produced by the message builders.

use serde_json::Value;

/// A file to be uploaded as one part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadIo {
    pub content_type: String,
    pub filename: String,
    /// Decoded bytes, sent as-is
    pub data: Vec<u8>,
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, upload: UploadIo },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, upload: UploadIo) -> Self {
        Self::File {
            name: name.into(),
            upload,
        }
    }

    /// Form field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// A provider-shaped request body.
///
/// Only the builder that produced it and the transport look inside.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `multipart/form-data`
    Form(Vec<FormPart>),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Form(_) => None,
        }
    }

    pub fn form_parts(&self) -> Option<&[FormPart]> {
        match self {
            Self::Form(parts) => Some(parts),
            Self::Json(_) => None,
        }
    }

    /// Every text value submitted under a form field name, in order.
    pub fn text_values(&self, field: &str) -> Vec<&str> {
        self.form_parts()
            .unwrap_or_default()
            .iter()
            .filter_map(|part| match part {
                FormPart::Text { name, value } if name == field => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The file submitted under a form field name.
    pub fn file(&self, field: &str) -> Option<&UploadIo> {
        self.form_parts()?.iter().find_map(|part| match part {
            FormPart::File { name, upload } if name == field => Some(upload),
            _ => None,
        })
    }
}
