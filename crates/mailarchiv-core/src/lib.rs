//! Core archival logic for mailarchiv
//!
//! Resolves the target folder set, drains each folder in chunks and
//! writes every message (plus its PDF attachments) into a timestamped
//! on-disk archive.

mod archive;
mod attachments;
mod config;
mod download;
mod error;
mod sanitize;
mod text;

pub use archive::{ArchiveWriter, NO_CONTENT, UNKNOWN};
pub use attachments::{pdf_attachments, PdfAttachment};
pub use config::{Config, DownloadLimits};
pub use download::Downloader;
pub use error::{CoreError, CoreResult};
pub use sanitize::{sanitize_filename, NO_SUBJECT, UNNAMED};
pub use text::render_body;
