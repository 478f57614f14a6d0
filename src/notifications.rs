//! Notification inbox reads and lifecycle: listing with unread counts,
//! marking read, and deletion. Emission lives in the engagement facade.

use crate::accounts::UserSummary;
use crate::database::repositories::{NotificationRepository, PostRepository, UserRepository};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

const DEFAULT_INBOX_LIMIT: usize = 50;
const MAX_INBOX_LIMIT: usize = 200;

#[derive(Clone)]
pub struct NotificationService {
    database: Database,
}

impl NotificationService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Newest first. The unread count always covers the whole inbox, not
    /// just the returned window.
    pub fn list(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: Option<usize>,
    ) -> DomainResult<Inbox> {
        let limit = limit.unwrap_or(DEFAULT_INBOX_LIMIT).clamp(1, MAX_INBOX_LIMIT);
        self.database
            .with_repositories(|repos| {
                let records =
                    repos
                        .notifications()
                        .list_for_recipient(recipient_id, unread_only, limit)?;
                let mut notifications = Vec::with_capacity(records.len());
                for record in records {
                    let sender = repos
                        .users()
                        .get(&record.sender_id)?
                        .as_ref()
                        .map(UserSummary::from_record);
                    let post = match record.post_id.as_deref() {
                        Some(post_id) => repos.posts().get(post_id)?.map(|post| PostRef {
                            id: post.id,
                            title: post.title,
                        }),
                        None => None,
                    };
                    notifications.push(NotificationView {
                        id: record.id,
                        sender,
                        kind: record.kind,
                        post,
                        comment_excerpt: record.comment_excerpt,
                        read: record.read,
                        created_at: record.created_at,
                    });
                }
                let unread_count = repos.notifications().unread_count(recipient_id)?;
                Ok(Inbox {
                    notifications,
                    unread_count,
                })
            })
            .map_err(DomainError::from_db)
    }

    pub fn mark_read(&self, id: &str, recipient_id: &str) -> DomainResult<()> {
        let marked = self
            .database
            .with_repositories(|repos| repos.notifications().mark_read(id, recipient_id))
            .map_err(DomainError::from_db)?;
        if !marked {
            return Err(DomainError::not_found("Notification not found"));
        }
        Ok(())
    }

    pub fn mark_all_read(&self, recipient_id: &str) -> DomainResult<()> {
        self.database
            .with_repositories(|repos| repos.notifications().mark_all_read(recipient_id))
            .map_err(DomainError::from_db)
    }

    pub fn delete(&self, id: &str, recipient_id: &str) -> DomainResult<()> {
        let deleted = self
            .database
            .with_repositories(|repos| repos.notifications().delete(id, recipient_id))
            .map_err(DomainError::from_db)?;
        if !deleted {
            return Err(DomainError::not_found("Notification not found"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub sender: Option<UserSummary>,
    #[serde(rename = "type")]
    pub kind: String,
    pub post: Option<PostRef>,
    pub comment_excerpt: Option<String>,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbox {
    pub notifications: Vec<NotificationView>,
    pub unread_count: usize,
}
