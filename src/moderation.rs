//! Admin-only operations: platform stats, user role/suspension management,
//! and privileged post moderation. Callers are gated at the API layer; this
//! service assumes the requester is already an admin.

use crate::content::{post_view, ListQuery, PostPage, PostView};
use crate::database::models::UserRecord;
use crate::database::repositories::{PostRepository, UserRepository};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

pub const USER_ROLES: &[&str] = &["user", "admin"];

#[derive(Clone)]
pub struct AdminService {
    database: Database,
}

impl AdminService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn stats(&self) -> DomainResult<PlatformStats> {
        self.database
            .with_repositories(|repos| {
                Ok(PlatformStats {
                    total_users: repos.users().count("")?,
                    total_posts: repos.posts().count_all("")?,
                    active_users: repos.users().count_active()?,
                    hidden_posts: repos.posts().count_hidden()?,
                })
            })
            .map_err(DomainError::from_db)
    }

    pub fn list_users(&self, query: ListQuery) -> DomainResult<UserPage> {
        let (limit, offset) = query.admin_window();
        self.database
            .with_repositories(|repos| {
                let search = query.search.as_deref().unwrap_or("").trim();
                let total = repos.users().count(search)?;
                let data = repos.users().list(search, limit, offset)?;
                Ok(UserPage { data, total })
            })
            .map_err(DomainError::from_db)
    }

    pub fn set_role(&self, user_id: &str, role: &str) -> DomainResult<UserRecord> {
        if !USER_ROLES.contains(&role) {
            return Err(DomainError::validation(format!("Unknown role {role}")));
        }
        self.database
            .with_repositories(|repos| {
                let users = repos.users();
                if !users.set_role(user_id, role)? {
                    return Err(DomainError::not_found("User not found").into_anyhow());
                }
                users
                    .get(user_id)?
                    .ok_or_else(|| DomainError::not_found("User not found").into_anyhow())
            })
            .map_err(DomainError::from_db)
    }

    pub fn set_suspended(&self, user_id: &str, suspended: bool) -> DomainResult<UserRecord> {
        self.database
            .with_repositories(|repos| {
                let users = repos.users();
                if !users.set_suspended(user_id, suspended)? {
                    return Err(DomainError::not_found("User not found").into_anyhow());
                }
                users
                    .get(user_id)?
                    .ok_or_else(|| DomainError::not_found("User not found").into_anyhow())
            })
            .map_err(DomainError::from_db)
    }

    /// Removes the user and, via foreign keys, all of their posts, likes,
    /// comments, follows and notifications.
    pub fn delete_user(&self, user_id: &str) -> DomainResult<()> {
        let deleted = self
            .database
            .with_repositories(|repos| repos.users().delete(user_id))
            .map_err(DomainError::from_db)?;
        if !deleted {
            return Err(DomainError::not_found("User not found"));
        }
        Ok(())
    }

    /// Every post regardless of status or visibility.
    pub fn list_posts(&self, query: ListQuery) -> DomainResult<PostPage> {
        let (limit, offset) = query.admin_window();
        self.database
            .with_repositories(|repos| {
                let search = query.search.as_deref().unwrap_or("").trim();
                let total = repos.posts().count_all(search)?;
                let records = repos.posts().list_all(search, limit, offset)?;
                let mut data = Vec::with_capacity(records.len());
                for record in records {
                    data.push(post_view(&repos, record)?);
                }
                Ok(PostPage { data, total })
            })
            .map_err(DomainError::from_db)
    }

    pub fn set_post_hidden(&self, post_id: &str, hidden: bool) -> DomainResult<PostView> {
        self.database
            .with_repositories(|repos| {
                let posts = repos.posts();
                if !posts.set_hidden(post_id, hidden)? {
                    return Err(DomainError::not_found("Post not found").into_anyhow());
                }
                let record = posts
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                post_view(&repos, record)
            })
            .map_err(DomainError::from_db)
    }

    /// No ownership check; this is the privileged deletion path.
    pub fn delete_post(&self, post_id: &str) -> DomainResult<()> {
        let deleted = self
            .database
            .with_repositories(|repos| repos.posts().delete(post_id))
            .map_err(DomainError::from_db)?;
        if !deleted {
            return Err(DomainError::not_found("Post not found"));
        }
        Ok(())
    }
}

impl ListQuery {
    /// Admin tables page with a larger default than the public feed.
    fn admin_window(&self) -> (usize, usize) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1) * limit)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: usize,
    pub total_posts: usize,
    pub active_users: usize,
    pub hidden_posts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub data: Vec<UserRecord>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountService, RegisterInput};
    use crate::content::{CreatePostInput, PostService};
    use crate::database::open_in_memory;
    use crate::database::Database;

    fn setup() -> (Database, AdminService, String) {
        let db = open_in_memory();
        let accounts = AccountService::new(db.clone());
        let user = accounts
            .register(RegisterInput {
                name: "alice".into(),
                username: Some("alice".into()),
                email: "alice@example.com".into(),
                password: "secret".into(),
            })
            .expect("register")
            .id;
        (db.clone(), AdminService::new(db), user)
    }

    #[test]
    fn role_changes_validate_and_persist() {
        let (_db, admin, user) = setup();
        assert!(matches!(
            admin.set_role(&user, "owner"),
            Err(DomainError::Validation(_))
        ));
        let updated = admin.set_role(&user, "admin").expect("promote");
        assert_eq!(updated.role, "admin");
        assert!(updated.is_admin());
    }

    #[test]
    fn suspension_counts_against_active_users() {
        let (_db, admin, user) = setup();
        assert_eq!(admin.stats().expect("stats").active_users, 1);
        let updated = admin.set_suspended(&user, true).expect("suspend");
        assert!(updated.suspended);
        let stats = admin.stats().expect("stats");
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.active_users, 0);
    }

    #[test]
    fn hidden_posts_show_in_admin_listing_and_stats() {
        let (db, admin, user) = setup();
        let posts = PostService::new(db);
        let post = posts
            .create_post(
                &user,
                CreatePostInput {
                    title: "t".into(),
                    body: "b".into(),
                    ..Default::default()
                },
            )
            .expect("create");
        let view = admin.set_post_hidden(&post.id, true).expect("hide");
        assert!(view.hidden);

        let page = admin.list_posts(ListQuery::default()).expect("list");
        assert_eq!(page.total, 1);
        assert_eq!(admin.stats().expect("stats").hidden_posts, 1);
    }

    #[test]
    fn deleting_a_user_removes_their_posts() {
        let (db, admin, user) = setup();
        let posts = PostService::new(db);
        let post = posts
            .create_post(
                &user,
                CreatePostInput {
                    title: "t".into(),
                    body: "b".into(),
                    ..Default::default()
                },
            )
            .expect("create");

        admin.delete_user(&user).expect("delete user");
        assert!(matches!(
            posts.get_post(&post.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            admin.delete_user(&user),
            Err(DomainError::NotFound(_))
        ));
    }
}
