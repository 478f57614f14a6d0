mod comments;
mod follows;
mod likes;
mod notifications;
mod posts;
mod users;

use super::models::{CommentRecord, FollowCounts, NotificationRecord, PostRecord, UserRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait UserRepository {
    fn create(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
    /// Login lookup: matches either the email or the handle.
    fn find_by_email_or_username(&self, needle: &str) -> Result<Option<UserRecord>>;
    fn email_exists(&self, email: &str) -> Result<bool>;
    /// Rewrites the mutable profile columns of an existing row.
    fn update(&self, record: &UserRecord) -> Result<bool>;
    fn set_password_hash(&self, id: &str, hash: &str) -> Result<bool>;
    fn set_role(&self, id: &str, role: &str) -> Result<bool>;
    fn set_suspended(&self, id: &str, suspended: bool) -> Result<bool>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn search(&self, query: &str, limit: usize) -> Result<Vec<UserRecord>>;
    fn list(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<UserRecord>>;
    fn count(&self, search: &str) -> Result<usize>;
    fn count_active(&self) -> Result<usize>;
}

pub trait FollowRepository {
    /// Adds the relation; returns false when it already existed (set
    /// semantics, the duplicate insert is ignored).
    fn follow(&self, follower_id: &str, followee_id: &str, created_at: &str) -> Result<bool>;
    fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<bool>;
    fn is_following(&self, follower_id: &str, followee_id: &str) -> Result<bool>;
    fn counts(&self, user_id: &str) -> Result<FollowCounts>;
    fn followers_of(&self, user_id: &str) -> Result<Vec<UserRecord>>;
    fn following_of(&self, user_id: &str) -> Result<Vec<UserRecord>>;
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn set_hidden(&self, id: &str, hidden: bool) -> Result<bool>;
    /// Public feed: published, not hidden, newest first, optional
    /// case-insensitive title match.
    fn list_public(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<PostRecord>>;
    fn count_public(&self, search: &str) -> Result<usize>;
    fn list_for_author(
        &self,
        author_id: &str,
        search: &str,
        status: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>>;
    fn count_for_author(&self, author_id: &str, search: &str, status: Option<&str>)
        -> Result<usize>;
    /// Moderation listing: every post regardless of status or hidden flag.
    fn list_all(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<PostRecord>>;
    fn count_all(&self, search: &str) -> Result<usize>;
    fn count_hidden(&self) -> Result<usize>;
}

pub trait LikeRepository {
    /// Set-add; returns false when the user already liked the post.
    fn add(&self, post_id: &str, user_id: &str, created_at: &str) -> Result<bool>;
    /// Set-remove; returns false when there was nothing to remove.
    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool>;
    fn count_for_post(&self, post_id: &str) -> Result<usize>;
    fn has_liked(&self, post_id: &str, user_id: &str) -> Result<bool>;
    fn likers_of(&self, post_id: &str) -> Result<Vec<String>>;
}

pub trait CommentRepository {
    fn add(&self, record: &CommentRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<CommentRecord>>;
    fn remove(&self, id: &str) -> Result<bool>;
    /// Insertion order, oldest first.
    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>>;
    fn count_for_post(&self, post_id: &str) -> Result<usize>;
    /// Upserts the user's marker; a user holds at most one of like/dislike.
    fn set_reaction(&self, comment_id: &str, user_id: &str, kind: &str, created_at: &str)
        -> Result<()>;
    fn clear_reaction(&self, comment_id: &str, user_id: &str) -> Result<bool>;
    fn get_reaction(&self, comment_id: &str, user_id: &str) -> Result<Option<String>>;
    /// Returns (likes, dislikes).
    fn reaction_counts(&self, comment_id: &str) -> Result<(usize, usize)>;
}

pub trait NotificationRepository {
    fn create(&self, record: &NotificationRecord) -> Result<()>;
    fn list_for_recipient(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<NotificationRecord>>;
    fn unread_count(&self, recipient_id: &str) -> Result<usize>;
    /// Recipient-scoped; returns false when the id is absent or owned by
    /// someone else.
    fn mark_read(&self, id: &str, recipient_id: &str) -> Result<bool>;
    fn mark_all_read(&self, recipient_id: &str) -> Result<()>;
    fn delete(&self, id: &str, recipient_id: &str) -> Result<bool>;
    /// Best-effort retraction of a stale follow notification on unfollow.
    fn delete_follow_notification(&self, recipient_id: &str, sender_id: &str) -> Result<()>;
}

/// Escapes `%`, `_` and `\` so a search term matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern.
pub(super) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn follows(&self) -> impl FollowRepository + '_ {
        follows::SqliteFollowRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }

    pub fn likes(&self) -> impl LikeRepository + '_ {
        likes::SqliteLikeRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn notifications(&self) -> impl NotificationRepository + '_ {
        notifications::SqliteNotificationRepository { conn: self.conn }
    }
}
