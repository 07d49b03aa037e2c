use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{GraphError, GraphResult};
use crate::types::*;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Message fields to select in list queries (keeps payload small)
const MESSAGE_SELECT: &str = "id,subject,from,toRecipients,receivedDateTime,body,bodyPreview";

/// Page size for folder enumeration; message pages use the configured chunk size
const FOLDER_PAGE_SIZE: u32 = 100;

/// Bounded retry budget for 429/5xx responses
const MAX_TRANSIENT_RETRIES: usize = 4;

const MAX_BACKOFF: Duration = Duration::from_secs(32);

pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GraphClient {
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, GRAPH_BASE)
    }

    /// Point the client at a non-default endpoint (used by tests).
    pub fn with_base_url(access_token: String, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token,
        }
    }

    /// List all folders in the mailbox, flattened, including nested ones.
    ///
    /// The top-level listing does not include children, so every folder
    /// with a positive `childFolderCount` is expanded via its
    /// `childFolders` endpoint. Each listing follows `@odata.nextLink`
    /// until the provider stops returning one.
    pub async fn list_folders(&self, mailbox: &str) -> GraphResult<Vec<MailFolder>> {
        let mut folders = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(format!(
            "{}/users/{}/mailFolders?$top={}",
            self.base_url, mailbox, FOLDER_PAGE_SIZE
        ));

        while let Some(first_page) = queue.pop_front() {
            let mut next = Some(first_page);
            while let Some(url) = next.take() {
                debug!("Graph: listing folders page");
                let page: ListResponse<MailFolder> = self.get_json(&url).await?;
                for folder in page.value {
                    if folder.child_folder_count.unwrap_or(0) > 0 {
                        queue.push_back(format!(
                            "{}/users/{}/mailFolders/{}/childFolders?$top={}",
                            self.base_url, mailbox, folder.id, FOLDER_PAGE_SIZE
                        ));
                    }
                    folders.push(folder);
                }
                next = page.next_link;
            }
        }

        info!("Graph: found {} folders", folders.len());
        Ok(folders)
    }

    /// First page of a folder drain, with body and attachments expanded
    /// inline so no per-message follow-up fetch is needed.
    ///
    /// Oldest messages come first; an interrupted run therefore leaves a
    /// deterministic prefix of the folder's eligible messages on disk.
    pub async fn list_messages(
        &self,
        mailbox: &str,
        folder_id: &str,
        since: DateTime<Utc>,
        chunk_size: u32,
    ) -> GraphResult<MessagePage> {
        let url = format!(
            "{}/users/{}/mailFolders/{}/messages?$filter=receivedDateTime ge {}&$orderby=receivedDateTime asc&$top={}&$select={}&$expand=attachments",
            self.base_url,
            mailbox,
            folder_id,
            since.format("%Y-%m-%dT%H:%M:%SZ"),
            chunk_size,
            MESSAGE_SELECT
        );
        debug!("Graph: listing messages folder={} top={}", folder_id, chunk_size);

        let list: ListResponse<Message> = self.get_json(&url).await?;
        debug!(
            "Graph: got {} messages, has_more={}",
            list.value.len(),
            list.next_link.is_some()
        );
        Ok(MessagePage {
            messages: list.value,
            continuation: Continuation::from_next_link(list.next_link),
        })
    }

    /// Fetch the page addressed by a continuation token, re-issuing the
    /// provider's link verbatim.
    pub async fn next_messages(&self, token: &PageToken) -> GraphResult<MessagePage> {
        debug!("Graph: fetching next page");

        let list: ListResponse<Message> = self.get_json(&token.0).await?;
        Ok(MessagePage {
            messages: list.value,
            continuation: Continuation::from_next_link(list.next_link),
        })
    }

    /// GET with bounded retry on rate limiting and server errors.
    /// Honours `Retry-After` when present, otherwise doubles a 1s
    /// backoff up to 32s, with a little jitter on top.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> GraphResult<T> {
        let mut backoff = Duration::from_secs(1);
        let mut attempt = 0;

        loop {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                attempt += 1;
                if attempt > MAX_TRANSIENT_RETRIES {
                    let body = response.text().await.unwrap_or_default();
                    return Err(GraphError::RetriesExhausted {
                        status: status.as_u16(),
                        attempts: attempt,
                        body,
                    });
                }

                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));

                warn!(
                    "Graph: transient {} (attempt {}), retrying in {:?}",
                    status, attempt, retry_after
                );
                tokio::time::sleep(retry_after + jitter).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GraphError::ApiError {
                    status: status.as_u16(),
                    body,
                });
            }

            return response
                .json()
                .await
                .map_err(|e| GraphError::ParseError(e.to_string()));
        }
    }
}
