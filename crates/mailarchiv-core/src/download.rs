//! Download orchestration
//!
//! Drives folder resolution and the sequential, chunked drain of every
//! target folder. Counters live here and nowhere else; folders and
//! pages are processed strictly one at a time so the caps always cut an
//! oldest-first prefix of each folder.

use std::collections::HashSet;

use chrono::Utc;
use mailarchiv_graph::{Continuation, GraphClient, GraphError, MessagePage};
use tracing::{debug, info, warn};

use crate::archive::ArchiveWriter;
use crate::config::Config;
use crate::{CoreError, CoreResult};

/// Folders never drained as discovered subfolders: inbox and archive
/// are handled explicitly, the rest hold no mail worth archiving.
/// A user folder renamed to one of these names is skipped as well.
const SPECIAL_FOLDERS: &[&str] = &["inbox", "archive", "sent items", "deleted items", "drafts"];

/// One folder scheduled for draining. Well-known folders are addressed
/// by their Graph name, discovered ones by provider ID.
#[derive(Debug)]
struct Target {
    folder_ref: String,
    display_name: String,
    /// The archive folder does not exist in every mailbox; its absence
    /// is tolerated rather than treated as a failed run.
    optional: bool,
}

pub struct Downloader<'a> {
    client: &'a GraphClient,
    config: &'a Config,
    writer: ArchiveWriter,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a GraphClient, config: &'a Config) -> CoreResult<Self> {
        config.validate()?;
        let writer = ArchiveWriter::new(&config.mail_dir)?;
        Ok(Self {
            client,
            config,
            writer,
        })
    }

    /// Drain every target folder and return the total archived count.
    ///
    /// Any folder- or page-level error aborts the run; files written up
    /// to that point stay in place.
    pub async fn run(&self) -> CoreResult<usize> {
        let targets = self.resolve_targets().await?;
        info!(
            "Archiving {} into {} ({} folders)",
            self.config.mailbox,
            self.writer.mail_dir().display(),
            targets.len()
        );

        let mut total = 0usize;
        let mut seen_messages = HashSet::new();

        for target in &targets {
            if self.config.limits.should_stop(0, total) {
                info!("Global download limit reached, skipping remaining folders");
                break;
            }

            match self
                .drain_folder(target, &mut total, &mut seen_messages)
                .await
            {
                Ok(archived) => {
                    info!("{}: archived {} messages", target.display_name, archived);
                }
                Err(CoreError::GraphError(GraphError::ApiError { status: 404, .. }))
                    if target.optional =>
                {
                    warn!("{}: folder not available, skipping", target.display_name);
                }
                Err(e) => {
                    warn!(
                        "Aborting run after {} archived messages: {}",
                        total, e
                    );
                    return Err(e);
                }
            }
        }

        info!("Run complete, {} messages archived", total);
        Ok(total)
    }

    /// Inbox first, then discovered subfolders in enumeration order,
    /// then the archive. The order matters only for which messages win
    /// when a global cap truncates the run.
    async fn resolve_targets(&self) -> CoreResult<Vec<Target>> {
        let mut targets = vec![Target {
            folder_ref: "inbox".to_string(),
            display_name: "Inbox".to_string(),
            optional: false,
        }];

        if self.config.include_folders {
            let folders = self.client.list_folders(&self.config.mailbox).await?;
            for folder in folders {
                let name = folder.display_name.trim().to_lowercase();
                if SPECIAL_FOLDERS.contains(&name.as_str()) {
                    debug!("Skipping special folder {}", folder.display_name);
                    continue;
                }
                targets.push(Target {
                    folder_ref: folder.id,
                    display_name: folder.display_name,
                    optional: false,
                });
            }
        }

        if self.config.include_archive {
            targets.push(Target {
                folder_ref: "archive".to_string(),
                display_name: "Archive".to_string(),
                optional: true,
            });
        }

        Ok(targets)
    }

    /// Page through one folder, oldest first, archiving every message
    /// until the folder is exhausted or a cap bites. Caps are checked
    /// after each archived message, so they are never overshot. `total`
    /// is updated per message; on error it reflects what is on disk.
    async fn drain_folder(
        &self,
        target: &Target,
        total: &mut usize,
        seen_messages: &mut HashSet<String>,
    ) -> CoreResult<usize> {
        let limits = &self.config.limits;
        let since = limits.since(Utc::now());
        let mut archived = 0usize;

        let mut page = self
            .client
            .list_messages(
                &self.config.mailbox,
                &target.folder_ref,
                since,
                limits.chunk_size,
            )
            .await?;

        'pages: loop {
            let MessagePage {
                messages,
                continuation,
            } = page;
            debug!(
                "{}: page with {} messages",
                target.display_name,
                messages.len()
            );

            for message in &messages {
                // A message can surface in more than one folder view;
                // archive it only once per run.
                if !seen_messages.insert(message.id.clone()) {
                    debug!("{}: message already archived, skipping", target.display_name);
                    continue;
                }

                self.writer.write_message(message, &target.display_name)?;
                archived += 1;
                *total += 1;

                if limits.should_stop(archived, *total) {
                    info!(
                        "{}: download limit reached after {} messages",
                        target.display_name, archived
                    );
                    break 'pages;
                }
            }

            match continuation {
                Continuation::End => break,
                Continuation::Next(token) => {
                    page = self.client.next_messages(&token).await?;
                }
            }
        }

        Ok(archived)
    }
}
