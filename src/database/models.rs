use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    /// Argon2 PHC string. Never serialized out of the repository layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub place: Option<String>,
    pub role: String,
    pub suspended: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    /// One of `text`, `image`, `video`, `document`, `article`.
    pub kind: String,
    /// Server-relative media paths, stored as opaque strings.
    pub images: Vec<String>,
    pub video: Option<String>,
    pub video_start: Option<f64>,
    pub video_end: Option<f64>,
    pub document: Option<String>,
    pub article_content: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// One of `draft`, `published`, `scheduled`.
    pub status: String,
    pub scheduled_at: Option<String>,
    pub hidden: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    /// One of `like`, `comment`, `follow`.
    pub kind: String,
    pub post_id: Option<String>,
    pub comment_excerpt: Option<String>,
    pub read: bool,
    pub created_at: String,
}

/// Follower/following cardinalities for a single user, as returned after
/// follow and unfollow operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FollowCounts {
    pub followers: usize,
    pub following: usize,
}
