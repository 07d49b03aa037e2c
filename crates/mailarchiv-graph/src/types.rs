use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response wrapper for Graph API list endpoints
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Opaque continuation cursor for a paginated query.
///
/// Graph hands back a fully-formed `@odata.nextLink` URL; it must be
/// re-issued verbatim, never reassembled from query parameters.
#[derive(Debug, Clone)]
pub struct PageToken(pub(crate) String);

/// Whether a paginated response has more pages.
#[derive(Debug, Clone)]
pub enum Continuation {
    /// The provider reported no further pages.
    End,
    /// More pages exist; fetch them via [`crate::GraphClient::next_messages`].
    Next(PageToken),
}

impl Continuation {
    pub(crate) fn from_next_link(next_link: Option<String>) -> Self {
        match next_link {
            Some(link) => Continuation::Next(PageToken(link)),
            None => Continuation::End,
        }
    }

    pub fn has_more(&self) -> bool {
        matches!(self, Continuation::Next(_))
    }
}

/// A mail folder from the Graph API
#[derive(Debug, Clone, Deserialize)]
pub struct MailFolder {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "childFolderCount")]
    pub child_folder_count: Option<i64>,
    #[serde(rename = "totalItemCount")]
    pub total_item_count: Option<i64>,
}

/// A message fetched with body and attachments expanded inline
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: Option<String>,
    pub from: Option<EmailWrapper>,
    #[serde(rename = "toRecipients", default)]
    pub to_recipients: Vec<EmailWrapper>,
    #[serde(rename = "receivedDateTime")]
    pub received_date_time: Option<DateTime<Utc>>,
    pub body: Option<ItemBody>,
    #[serde(rename = "bodyPreview")]
    pub body_preview: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Address of the sender, if the provider supplied one.
    pub fn from_address(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|w| w.email_address.address.as_deref())
    }

    /// Address of the first recipient, if any.
    pub fn first_recipient(&self) -> Option<&str> {
        self.to_recipients
            .first()
            .and_then(|w| w.email_address.address.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailWrapper {
    #[serde(rename = "emailAddress")]
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Message body as delivered by Graph (`contentType` is "html" or "text")
#[derive(Debug, Clone, Deserialize)]
pub struct ItemBody {
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    pub content: Option<String>,
}

impl ItemBody {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("html"))
    }
}

/// An attachment expanded inline with the message.
///
/// Reference and item attachments carry no `contentBytes`; only file
/// attachments have an inline base64 payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(rename = "contentBytes")]
    pub content_bytes: Option<String>,
}

impl Attachment {
    /// Decode the inline base64 payload, if present and well-formed.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        let encoded = self.content_bytes.as_deref()?;
        base64::engine::general_purpose::STANDARD.decode(encoded).ok()
    }
}

/// One page of messages from a folder drain
#[derive(Debug)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub continuation: Continuation,
}
