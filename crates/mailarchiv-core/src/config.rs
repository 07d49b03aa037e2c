//! Run configuration and download limits

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::{CoreError, CoreResult};

/// Caps and window applied to one download run. Immutable for the run.
#[derive(Debug, Clone)]
pub struct DownloadLimits {
    /// Look-back window in days; only messages received at or after
    /// `now - days_back` are fetched
    pub days_back: u32,
    /// Messages requested per page
    pub chunk_size: u32,
    /// When true, `max_emails_total` is ignored and folders drain fully
    pub load_all: bool,
    /// Global cap across all folders, enforced only when `load_all` is false
    pub max_emails_total: usize,
    /// Per-folder cap; 0 means unlimited
    pub max_emails_per_folder: usize,
}

impl Default for DownloadLimits {
    fn default() -> Self {
        Self {
            days_back: 30,
            chunk_size: 50,
            load_all: true,
            max_emails_total: 100,
            max_emails_per_folder: 0,
        }
    }
}

impl DownloadLimits {
    /// Decide whether a folder drain must stop. Evaluated after every
    /// archived message and before entering a fresh folder, so neither
    /// cap is ever overshot.
    pub fn should_stop(&self, folder_count: usize, total_count: usize) -> bool {
        if self.max_emails_per_folder > 0 && folder_count >= self.max_emails_per_folder {
            return true;
        }
        !self.load_all && total_count >= self.max_emails_total
    }

    /// Start of the look-back window relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days_back))
    }
}

/// Everything one run needs besides credentials
#[derive(Debug, Clone)]
pub struct Config {
    /// Mailbox address to archive
    pub mailbox: String,
    /// Destination root for text files; PDFs land in its `pdf/` child
    pub mail_dir: PathBuf,
    /// Drain discovered subfolders in addition to the inbox
    pub include_folders: bool,
    /// Drain the well-known Archive folder
    pub include_archive: bool,
    pub limits: DownloadLimits,
}

impl Config {
    /// Reject unusable configurations before any network call.
    pub fn validate(&self) -> CoreResult<()> {
        if self.mailbox.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "mailbox address must be set".to_string(),
            ));
        }
        if self.limits.chunk_size == 0 {
            return Err(CoreError::ConfigError(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
