//! PDF attachment extraction

use mailarchiv_graph::Message;

use crate::sanitize::{sanitize_filename, UNNAMED};

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// An attachment ready to be written to the `pdf/` directory
#[derive(Debug, Clone)]
pub struct PdfAttachment {
    /// Sanitized name, guaranteed to end in `.pdf`
    pub file_name: String,
    pub content: Vec<u8>,
}

/// The PDF file attachments of a message, in provider order.
///
/// Only attachments declaring `application/pdf` (case-insensitive) with
/// a non-empty inline payload qualify; reference and item attachments
/// carry no bytes and are skipped silently, as are empty files.
pub fn pdf_attachments(message: &Message) -> impl Iterator<Item = PdfAttachment> + '_ {
    message.attachments.iter().filter_map(|attachment| {
        let is_pdf = attachment
            .content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
        if !is_pdf {
            return None;
        }

        let content = attachment.decoded_bytes().filter(|bytes| !bytes.is_empty())?;

        let mut file_name =
            sanitize_filename(attachment.name.as_deref().unwrap_or_default(), UNNAMED);
        if !file_name.to_ascii_lowercase().ends_with(".pdf") {
            file_name.push_str(".pdf");
        }

        Some(PdfAttachment { content, file_name })
    })
}
