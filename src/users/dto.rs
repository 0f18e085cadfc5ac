use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::notifications::repo::{Notification, NotificationKind};
use crate::screams::repo::{Like, Scream};
use crate::users::repo::UserDoc;

/// Free-form profile body; only the editable fields are read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserDetailsRequest {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub recipient: String,
    pub sender: String,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub scream_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub notification_id: Uuid,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            // screamId carries the recipient handle, not the scream reference.
            scream_id: n.recipient.clone(),
            recipient: n.recipient,
            sender: n.sender,
            read: n.read,
            kind: n.kind,
            created_at: n.created_at,
            notification_id: n.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthenticatedUserResponse {
    pub credentials: UserDoc,
    pub likes: Vec<Like>,
    pub notifications: Vec<NotificationView>,
}

#[derive(Debug, Serialize)]
pub struct UserDetailsResponse {
    pub user: UserDoc,
    pub screams: Vec<Scream>,
}
