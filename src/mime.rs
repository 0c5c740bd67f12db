//! Raw RFC 5322 / MIME input, parsed with `mailparse`.

use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

use crate::address::Address;
use crate::attachment::{Attachment, AttachmentType};
use crate::error::MailError;
use crate::source::{AddressField, MailSource};

/// A message parsed from raw MIME bytes.
///
/// ```
/// use courier::{MailSource, MimeMessage};
///
/// let raw = b"From: John Doe <john@example.com>\r\n\
///             To: jane@example.com\r\n\
///             Subject: Hello\r\n\
///             \r\n\
///             Hello world!";
/// let message = MimeMessage::parse(raw).unwrap();
/// assert_eq!(message.subject().as_deref(), Some("Hello"));
/// assert!(!message.is_multipart());
/// ```
#[derive(Debug)]
pub struct MimeMessage<'a> {
    parsed: ParsedMail<'a>,
}

impl<'a> MimeMessage<'a> {
    /// Parse raw message bytes.
    pub fn parse(raw: &'a [u8]) -> Result<Self, MailError> {
        let parsed = mailparse::parse_mail(raw)?;
        Ok(Self { parsed })
    }

    fn leaves(&self) -> Vec<&ParsedMail<'a>> {
        let mut leaves = Vec::new();
        collect_leaves(&self.parsed, &mut leaves);
        leaves
    }

    fn body_leaf(&self, mimetype: &str) -> Option<String> {
        self.leaves()
            .into_iter()
            .filter(|part| part_disposition(part).is_none())
            .find(|part| part.ctype.mimetype.eq_ignore_ascii_case(mimetype))
            .and_then(|part| decoded_text(part))
    }
}

fn collect_leaves<'p, 'a>(part: &'p ParsedMail<'a>, out: &mut Vec<&'p ParsedMail<'a>>) {
    if part.subparts.is_empty() {
        out.push(part);
    } else {
        for sub in &part.subparts {
            collect_leaves(sub, out);
        }
    }
}

fn decoded_text(part: &ParsedMail<'_>) -> Option<String> {
    match part.get_body() {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::warn!(error = %e, mimetype = %part.ctype.mimetype, "Failed to decode body part");
            None
        }
    }
}

fn content_id(part: &ParsedMail<'_>) -> Option<String> {
    part.headers
        .get_first_value("Content-ID")
        .map(|cid| cid.trim().trim_start_matches('<').trim_end_matches('>').to_string())
        .filter(|cid| !cid.is_empty())
}

fn filename(part: &ParsedMail<'_>) -> Option<String> {
    let disposition = part.get_content_disposition();
    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned()
}

/// Classify a leaf as an attachment. `None` means it is a body part.
fn part_disposition(part: &ParsedMail<'_>) -> Option<AttachmentType> {
    let explicit = part.headers.get_first_value("Content-Disposition").is_some();
    let disposition = part.get_content_disposition().disposition;

    match disposition {
        DispositionType::Attachment if explicit => Some(AttachmentType::Attachment),
        DispositionType::Inline if explicit && (content_id(part).is_some() || filename(part).is_some()) => {
            Some(AttachmentType::Inline)
        }
        _ if !explicit && content_id(part).is_some() => Some(AttachmentType::Inline),
        _ => None,
    }
}

impl MailSource for MimeMessage<'_> {
    fn header(&self, name: &str) -> Option<String> {
        self.parsed.headers.get_first_value(name)
    }

    fn addresses(&self, field: AddressField) -> Vec<Address> {
        self.header(field.header_name())
            .map(|value| Address::parse_list(&value))
            .unwrap_or_default()
    }

    fn subject(&self) -> Option<String> {
        self.header("Subject")
    }

    fn is_multipart(&self) -> bool {
        self.parsed.ctype.mimetype.starts_with("multipart/")
    }

    fn text_part(&self) -> Option<String> {
        self.body_leaf("text/plain")
    }

    fn html_part(&self) -> Option<String> {
        self.body_leaf("text/html")
    }

    fn body(&self) -> Option<String> {
        if !self.is_multipart() {
            return decoded_text(&self.parsed);
        }
        self.leaves()
            .into_iter()
            .filter(|part| part_disposition(part).is_none())
            .find(|part| part.ctype.mimetype.starts_with("text/"))
            .and_then(|part| decoded_text(part))
    }

    fn attachments(&self) -> Vec<Attachment> {
        if !self.is_multipart() {
            return Vec::new();
        }

        self.leaves()
            .into_iter()
            .filter_map(|part| {
                let disposition = part_disposition(part)?;
                let data = match part.get_body_raw() {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping attachment that could not be decoded");
                        return None;
                    }
                };
                let cid = content_id(part);
                let name = filename(part)
                    .or_else(|| cid.clone())
                    .unwrap_or_else(|| "attachment".to_string());

                Some(Attachment {
                    filename: name,
                    content_type: part.ctype.mimetype.clone(),
                    data,
                    disposition,
                    content_id: cid,
                })
            })
            .collect()
    }
}
