//! On-disk archive layout
//!
//! One UTF-8 text file per message under the destination root, PDF
//! attachments alongside in a `pdf/` child directory. Names collide
//! only for identical timestamp+folder+subject, in which case the last
//! write wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use mailarchiv_graph::Message;
use tracing::{debug, warn};

use crate::attachments::pdf_attachments;
use crate::sanitize::{sanitize_filename, NO_SUBJECT, UNNAMED};
use crate::text::render_body;
use crate::CoreResult;

/// Placeholder for absent sender/recipient addresses
pub const UNKNOWN: &str = "Unbekannt";

/// Placeholder body when neither content nor preview is available
pub const NO_CONTENT: &str = "Kein Inhalt verfügbar";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub struct ArchiveWriter {
    mail_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl ArchiveWriter {
    /// Create the destination tree. Existing directories are fine.
    pub fn new(mail_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let mail_dir = mail_dir.into();
        let pdf_dir = mail_dir.join("pdf");
        fs::create_dir_all(&pdf_dir)?;
        Ok(Self { mail_dir, pdf_dir })
    }

    pub fn mail_dir(&self) -> &Path {
        &self.mail_dir
    }

    /// Write the message text file and its PDF attachments. Returns the
    /// text file path.
    ///
    /// A failed attachment write is logged and skipped; the message
    /// itself still counts as archived. A failed text write aborts.
    pub fn write_message(&self, message: &Message, folder_name: &str) -> CoreResult<PathBuf> {
        // Messages without a receive time get the wall clock so they
        // still land in the archive under a usable name.
        let stamp = message
            .received_date_time
            .unwrap_or_else(Utc::now)
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let subject = sanitize_filename(message.subject.as_deref().unwrap_or_default(), NO_SUBJECT);
        let folder = sanitize_filename(folder_name, UNNAMED);

        let path = self
            .mail_dir
            .join(format!("{}--[{}]--{}.txt", stamp, folder, subject));
        fs::write(&path, render_message(message, folder_name))?;
        debug!("Archived message to {}", path.display());

        for attachment in pdf_attachments(message) {
            let pdf_path = self
                .pdf_dir
                .join(format!("{}--[{}]--{}", stamp, folder, attachment.file_name));
            match fs::write(&pdf_path, &attachment.content) {
                Ok(()) => debug!("Saved attachment {}", pdf_path.display()),
                Err(e) => warn!(
                    "Failed to write attachment {}: {}",
                    pdf_path.display(),
                    e
                ),
            }
        }

        Ok(path)
    }
}

/// Header lines followed by the rendered body. Absent fields fall back
/// to placeholders rather than failing the message.
fn render_message(message: &Message, folder_name: &str) -> String {
    let body = message
        .body
        .as_ref()
        .and_then(|b| {
            let content = b.content.as_deref().filter(|c| !c.trim().is_empty())?;
            Some(render_body(content, b.is_html()))
        })
        .or_else(|| {
            message
                .body_preview
                .clone()
                .filter(|preview| !preview.trim().is_empty())
        })
        .unwrap_or_else(|| NO_CONTENT.to_string());

    let received = message
        .received_date_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    format!(
        "Von: {}\nAn: {}\nDatum: {}\nBetreff: {}\nOrdner: {}\n\n{}\n",
        message.from_address().unwrap_or(UNKNOWN),
        message.first_recipient().unwrap_or(UNKNOWN),
        received,
        message.subject.as_deref().unwrap_or("Kein Betreff"),
        folder_name,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_round_trip_filename_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path()).unwrap();

        let msg = message(serde_json::json!({
            "id": "m1",
            "subject": "Meeting: Q3 Review?!",
            "from": {"emailAddress": {"address": "chef@example.com"}},
            "toRecipients": [{"emailAddress": {"address": "ich@example.com"}}],
            "receivedDateTime": "2024-01-15T10:30:45Z",
            "body": {"contentType": "text", "content": "Bitte vorbereiten."}
        }));

        let path = writer.write_message(&msg, "Projekte").unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "2024-01-15-10-30-45--[Projekte]--Meeting_ Q3 Review_!.txt"
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "Von: chef@example.com\nAn: ich@example.com\nDatum: 2024-01-15 10:30:45\nBetreff: Meeting: Q3 Review?!\nOrdner: Projekte\n\n"
        ));
        assert!(content.contains("Bitte vorbereiten."));
    }

    #[test]
    fn test_body_falls_back_to_preview_then_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path()).unwrap();

        let msg = message(serde_json::json!({
            "id": "m2",
            "subject": "Leer",
            "receivedDateTime": "2024-01-15T10:30:45Z",
            "body": {"contentType": "text", "content": ""},
            "bodyPreview": "Nur Vorschau"
        }));
        let path = writer.write_message(&msg, "Inbox").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("Nur Vorschau"));

        let msg = message(serde_json::json!({
            "id": "m3",
            "subject": "Ganz leer",
            "receivedDateTime": "2024-01-15T10:30:46Z"
        }));
        let path = writer.write_message(&msg, "Inbox").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(NO_CONTENT));
        assert!(content.contains("Von: Unbekannt\nAn: Unbekannt\n"));
    }

    #[test]
    fn test_pdf_attachments_land_in_pdf_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path()).unwrap();

        let msg = message(serde_json::json!({
            "id": "m4",
            "subject": "Mit Anhang",
            "receivedDateTime": "2024-01-15T10:30:45Z",
            "attachments": [
                {"name": "rechnung.pdf", "contentType": "application/pdf", "contentBytes": "JVBERi0="},
                {"name": "foto.png", "contentType": "image/png", "contentBytes": "iVBORw=="}
            ]
        }));
        writer.write_message(&msg, "Inbox").unwrap();

        let pdf_path = dir
            .path()
            .join("pdf")
            .join("2024-01-15-10-30-45--[Inbox]--rechnung.pdf");
        assert_eq!(fs::read(&pdf_path).unwrap(), b"%PDF-");
        assert_eq!(fs::read_dir(dir.path().join("pdf")).unwrap().count(), 1);
    }

    #[test]
    fn test_rewrite_overwrites_instead_of_duplicating() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path()).unwrap();

        let mut json = serde_json::json!({
            "id": "m5",
            "subject": "Doppelt",
            "receivedDateTime": "2024-01-15T10:30:45Z",
            "body": {"contentType": "text", "content": "Erste Fassung"}
        });
        let first = writer.write_message(&message(json.clone()), "Inbox").unwrap();

        json["body"]["content"] = "Zweite Fassung".into();
        let second = writer.write_message(&message(json), "Inbox").unwrap();

        assert_eq!(first, second);
        assert!(fs::read_to_string(&second).unwrap().contains("Zweite Fassung"));
        // Only the text file and the pdf/ directory exist.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_missing_receive_time_uses_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path()).unwrap();

        let msg = message(serde_json::json!({"id": "m6", "subject": "Ohne Datum"}));
        let path = writer.write_message(&msg, "Inbox").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.ends_with("--[Inbox]--Ohne Datum.txt"));
        assert!(path.exists());
    }
}
