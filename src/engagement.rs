//! Engagement facade: likes, comments, comment reactions, and the follow
//! graph. Every mutation commits first, then emits its notification in a
//! second database pass so a failed emit never rolls back engagement state.

use crate::content::{comment_view, CommentView};
use crate::database::models::{CommentRecord, NotificationRecord};
use crate::database::repositories::{
    CommentRepository, FollowRepository, LikeRepository, NotificationRepository, PostRepository,
    UserRepository,
};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::{comment_excerpt, now_utc_iso};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct EngagementService {
    database: Database,
}

/// A notification to emit after the mutation that caused it has committed.
struct PendingNotification {
    recipient_id: String,
    sender_id: String,
    kind: &'static str,
    post_id: Option<String>,
    comment_excerpt: Option<String>,
}

impl EngagementService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn like_post(&self, post_id: &str, user_id: &str) -> DomainResult<LikeOutcome> {
        let (outcome, author_id) = self
            .database
            .with_repositories(|repos| {
                let post = repos
                    .posts()
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                let inserted = repos.likes().add(post_id, user_id, &now_utc_iso())?;
                if !inserted {
                    return Err(DomainError::conflict("Post already liked").into_anyhow());
                }
                let likes_count = repos.likes().count_for_post(post_id)?;
                Ok((LikeOutcome { likes_count }, post.author_id))
            })
            .map_err(DomainError::from_db)?;

        self.emit(PendingNotification {
            recipient_id: author_id,
            sender_id: user_id.to_string(),
            kind: "like",
            post_id: Some(post_id.to_string()),
            comment_excerpt: None,
        });
        Ok(outcome)
    }

    pub fn unlike_post(&self, post_id: &str, user_id: &str) -> DomainResult<LikeOutcome> {
        self.database
            .with_repositories(|repos| {
                if repos.posts().get(post_id)?.is_none() {
                    return Err(DomainError::not_found("Post not found").into_anyhow());
                }
                let removed = repos.likes().remove(post_id, user_id)?;
                if !removed {
                    return Err(DomainError::conflict("Post not liked yet").into_anyhow());
                }
                let likes_count = repos.likes().count_for_post(post_id)?;
                Ok(LikeOutcome { likes_count })
            })
            .map_err(DomainError::from_db)
    }

    pub fn add_comment(
        &self,
        post_id: &str,
        user_id: &str,
        text: &str,
    ) -> DomainResult<CommentOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("Comment text is required"));
        }

        let record = CommentRecord {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            body: text.to_string(),
            created_at: now_utc_iso(),
        };
        let (outcome, author_id) = self
            .database
            .with_repositories(|repos| {
                let post = repos
                    .posts()
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                repos.comments().add(&record)?;
                let comment = comment_view(&repos, record.clone())?;
                let comments_count = repos.comments().count_for_post(post_id)?;
                Ok((
                    CommentOutcome {
                        comment,
                        comments_count,
                    },
                    post.author_id,
                ))
            })
            .map_err(DomainError::from_db)?;

        self.emit(PendingNotification {
            recipient_id: author_id,
            sender_id: user_id.to_string(),
            kind: "comment",
            post_id: Some(post_id.to_string()),
            comment_excerpt: Some(comment_excerpt(text)),
        });
        Ok(outcome)
    }

    /// Removable by the comment's author or the post's author.
    pub fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        requester_id: &str,
    ) -> DomainResult<CommentsCount> {
        self.database
            .with_repositories(|repos| {
                let post = repos
                    .posts()
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                let comment = repos
                    .comments()
                    .get(comment_id)?
                    .filter(|comment| comment.post_id == post_id)
                    .ok_or_else(|| DomainError::not_found("Comment not found").into_anyhow())?;
                if comment.user_id != requester_id && post.author_id != requester_id {
                    return Err(DomainError::forbidden(
                        "Not authorized to delete this comment",
                    )
                    .into_anyhow());
                }
                repos.comments().remove(comment_id)?;
                let comments_count = repos.comments().count_for_post(post_id)?;
                Ok(CommentsCount { comments_count })
            })
            .map_err(DomainError::from_db)
    }

    /// Toggles a like/dislike marker on a comment. Reacting with the kind
    /// already set clears it; the two kinds are mutually exclusive.
    pub fn react_to_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        user_id: &str,
        kind: &str,
    ) -> DomainResult<ReactionCounts> {
        if kind != "like" && kind != "dislike" {
            return Err(DomainError::validation("Reaction must be like or dislike"));
        }
        self.database
            .with_repositories(|repos| {
                if repos.posts().get(post_id)?.is_none() {
                    return Err(DomainError::not_found("Post not found").into_anyhow());
                }
                let comments = repos.comments();
                comments
                    .get(comment_id)?
                    .filter(|comment| comment.post_id == post_id)
                    .ok_or_else(|| DomainError::not_found("Comment not found").into_anyhow())?;
                match comments.get_reaction(comment_id, user_id)? {
                    Some(current) if current == kind => {
                        comments.clear_reaction(comment_id, user_id)?;
                    }
                    _ => {
                        comments.set_reaction(comment_id, user_id, kind, &now_utc_iso())?;
                    }
                }
                let (likes, dislikes) = comments.reaction_counts(comment_id)?;
                Ok(ReactionCounts { likes, dislikes })
            })
            .map_err(DomainError::from_db)
    }

    pub fn follow(&self, follower_id: &str, followee_id: &str) -> DomainResult<FollowStatus> {
        if follower_id == followee_id {
            return Err(DomainError::invalid("Cannot follow yourself"));
        }
        let (status, newly_followed) = self
            .database
            .with_repositories(|repos| {
                if repos.users().get(followee_id)?.is_none() {
                    return Err(DomainError::not_found("User not found").into_anyhow());
                }
                let inserted = repos
                    .follows()
                    .follow(follower_id, followee_id, &now_utc_iso())?;
                let counts = repos.follows().counts(followee_id)?;
                Ok((
                    FollowStatus {
                        followers_count: counts.followers,
                        following_count: counts.following,
                        is_following: true,
                    },
                    inserted,
                ))
            })
            .map_err(DomainError::from_db)?;

        // Only a genuine not-following -> following transition notifies, so
        // repeated follow calls cannot spam the followee.
        if newly_followed {
            self.emit(PendingNotification {
                recipient_id: followee_id.to_string(),
                sender_id: follower_id.to_string(),
                kind: "follow",
                post_id: None,
                comment_excerpt: None,
            });
        }
        Ok(status)
    }

    /// Idempotent: unfollowing someone never followed, or an id that no
    /// longer resolves, succeeds with the current cardinalities.
    pub fn unfollow(&self, follower_id: &str, followee_id: &str) -> DomainResult<FollowStatus> {
        let status = self
            .database
            .with_repositories(|repos| {
                repos.follows().unfollow(follower_id, followee_id)?;
                let counts = repos.follows().counts(followee_id)?;
                Ok(FollowStatus {
                    followers_count: counts.followers,
                    following_count: counts.following,
                    is_following: false,
                })
            })
            .map_err(DomainError::from_db)?;

        // Retract the pending follow notification; losing it is acceptable.
        let result = self.database.with_repositories(|repos| {
            repos
                .notifications()
                .delete_follow_notification(followee_id, follower_id)
        });
        if let Err(err) = result {
            tracing::warn!(%follower_id, %followee_id, "failed to retract follow notification: {err:#}");
        }
        Ok(status)
    }

    /// Best-effort delivery: self-notifications are dropped, and a storage
    /// failure is logged without failing the engagement action.
    fn emit(&self, pending: PendingNotification) {
        if pending.recipient_id == pending.sender_id {
            return;
        }
        let record = NotificationRecord {
            id: Uuid::new_v4().to_string(),
            recipient_id: pending.recipient_id,
            sender_id: pending.sender_id,
            kind: pending.kind.to_string(),
            post_id: pending.post_id,
            comment_excerpt: pending.comment_excerpt,
            read: false,
            created_at: now_utc_iso(),
        };
        let result = self
            .database
            .with_repositories(|repos| repos.notifications().create(&record));
        if let Err(err) = result {
            tracing::warn!(
                kind = record.kind,
                recipient = record.recipient_id,
                "failed to emit notification: {err:#}"
            );
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub likes_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOutcome {
    pub comment: CommentView,
    pub comments_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsCount {
    pub comments_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: usize,
    pub dislikes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub followers_count: usize,
    pub following_count: usize,
    pub is_following: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountService, RegisterInput};
    use crate::content::{CreatePostInput, PostService};
    use crate::database::open_in_memory;
    use crate::database::Database;

    struct Fixture {
        db: Database,
        engagement: EngagementService,
        alice: String,
        bob: String,
        post_id: String,
    }

    fn setup() -> Fixture {
        let db = open_in_memory();
        let accounts = AccountService::new(db.clone());
        let posts = PostService::new(db.clone());
        let alice = accounts
            .register(RegisterInput {
                name: "alice".into(),
                username: Some("alice".into()),
                email: "alice@example.com".into(),
                password: "secret".into(),
            })
            .expect("register alice")
            .id;
        let bob = accounts
            .register(RegisterInput {
                name: "bob".into(),
                username: Some("bob".into()),
                email: "bob@example.com".into(),
                password: "secret".into(),
            })
            .expect("register bob")
            .id;
        let post_id = posts
            .create_post(
                &alice,
                CreatePostInput {
                    title: "p1".into(),
                    body: "body".into(),
                    ..Default::default()
                },
            )
            .expect("create post")
            .id;
        Fixture {
            engagement: EngagementService::new(db.clone()),
            db,
            alice,
            bob,
            post_id,
        }
    }

    fn notifications_for(db: &Database, recipient: &str) -> Vec<NotificationRecord> {
        db.with_repositories(|repos| {
            repos
                .notifications()
                .list_for_recipient(recipient, false, 100)
        })
        .expect("list notifications")
    }

    #[test]
    fn liking_twice_is_a_conflict_and_notifies_once() {
        let f = setup();
        let outcome = f.engagement.like_post(&f.post_id, &f.bob).expect("like");
        assert_eq!(outcome.likes_count, 1);

        assert!(matches!(
            f.engagement.like_post(&f.post_id, &f.bob),
            Err(DomainError::Conflict(_))
        ));

        let inbox = notifications_for(&f.db, &f.alice);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, "like");
        assert_eq!(inbox[0].sender_id, f.bob);
        assert_eq!(inbox[0].post_id.as_deref(), Some(f.post_id.as_str()));
    }

    #[test]
    fn liking_your_own_post_does_not_notify() {
        let f = setup();
        f.engagement
            .like_post(&f.post_id, &f.alice)
            .expect("self-like");
        assert!(notifications_for(&f.db, &f.alice).is_empty());
    }

    #[test]
    fn unlike_requires_an_existing_like() {
        let f = setup();
        assert!(matches!(
            f.engagement.unlike_post(&f.post_id, &f.bob),
            Err(DomainError::Conflict(_))
        ));
        f.engagement.like_post(&f.post_id, &f.bob).expect("like");
        let outcome = f
            .engagement
            .unlike_post(&f.post_id, &f.bob)
            .expect("unlike");
        assert_eq!(outcome.likes_count, 0);
    }

    #[test]
    fn commenting_notifies_the_author_with_an_excerpt() {
        let f = setup();
        let outcome = f
            .engagement
            .add_comment(&f.post_id, &f.bob, "  hello  ")
            .expect("comment");
        assert_eq!(outcome.comment.text, "hello");
        assert_eq!(outcome.comments_count, 1);

        let inbox = notifications_for(&f.db, &f.alice);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, "comment");
        assert_eq!(inbox[0].comment_excerpt.as_deref(), Some("hello"));
    }

    #[test]
    fn blank_comments_are_rejected() {
        let f = setup();
        assert!(matches!(
            f.engagement.add_comment(&f.post_id, &f.bob, "   "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn comment_deletion_is_author_or_post_owner_only() {
        let f = setup();
        let comment = f
            .engagement
            .add_comment(&f.post_id, &f.bob, "first")
            .expect("comment")
            .comment;
        let accounts = AccountService::new(f.db.clone());
        let carol = accounts
            .register(RegisterInput {
                name: "carol".into(),
                username: None,
                email: "carol@example.com".into(),
                password: "secret".into(),
            })
            .expect("register carol")
            .id;

        assert!(matches!(
            f.engagement.delete_comment(&f.post_id, &comment.id, &carol),
            Err(DomainError::Forbidden(_))
        ));
        // Post author moderates comments on their own post.
        let outcome = f
            .engagement
            .delete_comment(&f.post_id, &comment.id, &f.alice)
            .expect("delete");
        assert_eq!(outcome.comments_count, 0);
    }

    #[test]
    fn comment_reactions_toggle_and_exclude_each_other() {
        let f = setup();
        let comment = f
            .engagement
            .add_comment(&f.post_id, &f.bob, "debatable")
            .expect("comment")
            .comment;

        let counts = f
            .engagement
            .react_to_comment(&f.post_id, &comment.id, &f.alice, "like")
            .expect("like");
        assert_eq!((counts.likes, counts.dislikes), (1, 0));

        // Switching kinds replaces the marker rather than stacking.
        let counts = f
            .engagement
            .react_to_comment(&f.post_id, &comment.id, &f.alice, "dislike")
            .expect("switch");
        assert_eq!((counts.likes, counts.dislikes), (0, 1));

        // Repeating the current kind clears it.
        let counts = f
            .engagement
            .react_to_comment(&f.post_id, &comment.id, &f.alice, "dislike")
            .expect("toggle off");
        assert_eq!((counts.likes, counts.dislikes), (0, 0));
    }

    #[test]
    fn follow_is_idempotent_and_notifies_only_on_transition() {
        let f = setup();
        let status = f.engagement.follow(&f.bob, &f.alice).expect("follow");
        assert_eq!(status.followers_count, 1);
        assert!(status.is_following);

        let status = f.engagement.follow(&f.bob, &f.alice).expect("re-follow");
        assert_eq!(status.followers_count, 1);

        let inbox = notifications_for(&f.db, &f.alice);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, "follow");
    }

    #[test]
    fn self_follow_is_rejected() {
        let f = setup();
        assert!(matches!(
            f.engagement.follow(&f.alice, &f.alice),
            Err(DomainError::InvalidOperation(_))
        ));
    }

    #[test]
    fn unfollow_is_idempotent_and_never_errors() {
        let f = setup();
        let status = f
            .engagement
            .unfollow(&f.bob, &f.alice)
            .expect("unfollow without following");
        assert_eq!(status.followers_count, 0);
        assert!(!status.is_following);

        f.engagement
            .unfollow(&f.alice, &f.alice)
            .expect("self-unfollow is a no-op");
        f.engagement
            .unfollow(&f.bob, "no-such-user")
            .expect("unknown target is a no-op");
    }

    #[test]
    fn unfollow_retracts_the_follow_notification() {
        let f = setup();
        f.engagement.follow(&f.bob, &f.alice).expect("follow");
        let status = f.engagement.unfollow(&f.bob, &f.alice).expect("unfollow");
        assert_eq!(status.followers_count, 0);
        assert!(!status.is_following);
        assert!(notifications_for(&f.db, &f.alice).is_empty());
    }
}
