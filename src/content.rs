//! Post authoring and read side: creation, public/own listings, detail
//! views, and author-scoped deletion. Like/comment mutations live in the
//! engagement facade.

use crate::accounts::UserSummary;
use crate::database::models::{CommentRecord, PostRecord};
use crate::database::repositories::{
    CommentRepository, LikeRepository, PostRepository, SqliteRepositories, UserRepository,
};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const POST_KINDS: &[&str] = &["text", "image", "video", "document", "article"];
pub const POST_STATUSES: &[&str] = &["draft", "published", "scheduled"];

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct PostService {
    database: Database,
}

impl PostService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn create_post(&self, author_id: &str, input: CreatePostInput) -> DomainResult<PostView> {
        if input.title.trim().is_empty() || input.body.trim().is_empty() {
            return Err(DomainError::validation("Title and body are required"));
        }
        let kind = input.kind.unwrap_or_else(|| "text".to_string());
        if !POST_KINDS.contains(&kind.as_str()) {
            return Err(DomainError::validation(format!("Unknown post type {kind}")));
        }
        let status = input.status.unwrap_or_else(|| "published".to_string());
        if !POST_STATUSES.contains(&status.as_str()) {
            return Err(DomainError::validation(format!(
                "Unknown post status {status}"
            )));
        }

        let record = PostRecord {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            title: input.title.trim().to_string(),
            body: input.body,
            kind,
            images: input.images.unwrap_or_default(),
            video: input.video,
            video_start: input.video_start,
            video_end: input.video_end,
            document: input.document,
            article_content: input.article_content,
            tags: normalize_labels(input.tags),
            categories: normalize_labels(input.categories),
            status,
            scheduled_at: input.scheduled_at,
            hidden: false,
            created_at: now_utc_iso(),
            updated_at: None,
        };

        self.database
            .with_repositories(|repos| {
                repos.posts().create(&record)?;
                post_view(&repos, record.clone())
            })
            .map_err(DomainError::from_db)
    }

    /// Public feed: published, not hidden, newest first.
    pub fn list_public(&self, query: ListQuery) -> DomainResult<PostPage> {
        let (limit, offset) = query.window();
        self.database
            .with_repositories(|repos| {
                let search = query.search_term();
                let total = repos.posts().count_public(search)?;
                let records = repos.posts().list_public(search, limit, offset)?;
                let mut data = Vec::with_capacity(records.len());
                for record in records {
                    data.push(post_view(&repos, record)?);
                }
                Ok(PostPage { data, total })
            })
            .map_err(DomainError::from_db)
    }

    /// The author's own posts, optionally narrowed to one status.
    pub fn list_for_author(
        &self,
        author_id: &str,
        query: ListQuery,
        status: Option<String>,
    ) -> DomainResult<PostPage> {
        let status = status.filter(|s| s != "all");
        if let Some(ref status) = status {
            if !POST_STATUSES.contains(&status.as_str()) {
                return Err(DomainError::validation(format!(
                    "Unknown post status {status}"
                )));
            }
        }
        let (limit, offset) = query.window();
        self.database
            .with_repositories(|repos| {
                let search = query.search_term();
                let status = status.as_deref();
                let total = repos.posts().count_for_author(author_id, search, status)?;
                let records = repos
                    .posts()
                    .list_for_author(author_id, search, status, limit, offset)?;
                let mut data = Vec::with_capacity(records.len());
                for record in records {
                    data.push(post_view(&repos, record)?);
                }
                Ok(PostPage { data, total })
            })
            .map_err(DomainError::from_db)
    }

    pub fn get_post(&self, post_id: &str) -> DomainResult<PostDetails> {
        self.database
            .with_repositories(|repos| {
                let record = repos
                    .posts()
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                let post = post_view(&repos, record)?;
                let comments = comment_views(&repos, post_id)?;
                Ok(PostDetails { post, comments })
            })
            .map_err(DomainError::from_db)
    }

    pub fn comments(&self, post_id: &str) -> DomainResult<CommentsPage> {
        self.database
            .with_repositories(|repos| {
                if repos.posts().get(post_id)?.is_none() {
                    return Err(DomainError::not_found("Post not found").into_anyhow());
                }
                let comments = comment_views(&repos, post_id)?;
                let total = comments.len();
                Ok(CommentsPage { comments, total })
            })
            .map_err(DomainError::from_db)
    }

    /// Author-scoped deletion. Admin deletion is a separate privileged path
    /// in the moderation service with no ownership check.
    pub fn delete_post(&self, post_id: &str, requester_id: &str) -> DomainResult<()> {
        self.database
            .with_repositories(|repos| {
                let record = repos
                    .posts()
                    .get(post_id)?
                    .ok_or_else(|| DomainError::not_found("Post not found").into_anyhow())?;
                if record.author_id != requester_id {
                    return Err(
                        DomainError::forbidden("Not authorized to delete this post").into_anyhow()
                    );
                }
                repos.posts().delete(post_id)?;
                Ok(())
            })
            .map_err(DomainError::from_db)
    }
}

fn normalize_labels(raw: Option<Vec<String>>) -> Vec<String> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Builds the display view: author info denormalized, like/comment counts
/// and the liker set attached.
pub(crate) fn post_view(
    repos: &SqliteRepositories<'_>,
    record: PostRecord,
) -> anyhow::Result<PostView> {
    let author = repos
        .users()
        .get(&record.author_id)?
        .as_ref()
        .map(UserSummary::from_record);
    let likes = repos.likes().likers_of(&record.id)?;
    let comments_count = repos.comments().count_for_post(&record.id)?;
    Ok(PostView {
        likes_count: likes.len(),
        comments_count,
        likes,
        author,
        id: record.id,
        title: record.title,
        body: record.body,
        kind: record.kind,
        images: record.images,
        video: record.video,
        video_start: record.video_start,
        video_end: record.video_end,
        document: record.document,
        article_content: record.article_content,
        tags: record.tags,
        categories: record.categories,
        status: record.status,
        scheduled_at: record.scheduled_at,
        hidden: record.hidden,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

pub(crate) fn comment_view(
    repos: &SqliteRepositories<'_>,
    record: CommentRecord,
) -> anyhow::Result<CommentView> {
    let user = repos
        .users()
        .get(&record.user_id)?
        .as_ref()
        .map(UserSummary::from_record);
    let (likes, dislikes) = repos.comments().reaction_counts(&record.id)?;
    Ok(CommentView {
        id: record.id,
        user,
        text: record.body,
        created_at: record.created_at,
        likes,
        dislikes,
    })
}

fn comment_views(
    repos: &SqliteRepositories<'_>,
    post_id: &str,
) -> anyhow::Result<Vec<CommentView>> {
    let records = repos.comments().list_for_post(post_id)?;
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(comment_view(repos, record)?);
    }
    Ok(views)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: Option<UserSummary>,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub video_start: Option<f64>,
    pub video_end: Option<f64>,
    pub document: Option<String>,
    pub article_content: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub hidden: bool,
    pub likes: Vec<String>,
    pub likes_count: usize,
    pub comments_count: usize,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user: Option<UserSummary>,
    pub text: String,
    pub created_at: String,
    pub likes: usize,
    pub dislikes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub data: Vec<PostView>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsPage {
    pub comments: Vec<CommentView>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Resolves page/limit into (limit, offset); page numbers are 1-based.
    fn window(&self) -> (usize, usize) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1) * limit)
    }

    fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub video_start: Option<f64>,
    pub video_end: Option<f64>,
    pub document: Option<String>,
    pub article_content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub status: Option<String>,
    pub scheduled_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountService, RegisterInput};
    use crate::database::open_in_memory;
    use crate::database::Database;

    fn setup() -> (Database, PostService, String) {
        let db = open_in_memory();
        let accounts = AccountService::new(db.clone());
        let author = accounts
            .register(RegisterInput {
                name: "alice".into(),
                username: Some("alice".into()),
                email: "alice@example.com".into(),
                password: "secret".into(),
            })
            .expect("register");
        (db.clone(), PostService::new(db), author.id)
    }

    fn create(service: &PostService, author: &str, title: &str) -> PostView {
        service
            .create_post(
                author,
                CreatePostInput {
                    title: title.into(),
                    body: "body".into(),
                    ..Default::default()
                },
            )
            .expect("create post")
    }

    #[test]
    fn create_requires_title_and_body() {
        let (_db, service, author) = setup();
        let result = service.create_post(
            &author,
            CreatePostInput {
                title: "  ".into(),
                body: "body".into(),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn public_listing_excludes_drafts_and_hidden_posts() {
        let (db, service, author) = setup();
        create(&service, &author, "Visible");
        service
            .create_post(
                &author,
                CreatePostInput {
                    title: "Draft".into(),
                    body: "body".into(),
                    status: Some("draft".into()),
                    ..Default::default()
                },
            )
            .expect("draft");
        let hidden = create(&service, &author, "Hidden");
        db.with_repositories(|repos| {
            use crate::database::repositories::PostRepository;
            repos.posts().set_hidden(&hidden.id, true)?;
            Ok(())
        })
        .expect("hide");

        let page = service.list_public(ListQuery::default()).expect("list");
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, "Visible");
    }

    #[test]
    fn search_matches_titles_case_insensitively() {
        let (_db, service, author) = setup();
        create(&service, &author, "Rust Patterns");
        create(&service, &author, "Gardening");

        let page = service
            .list_public(ListQuery {
                search: Some("rust".into()),
                ..Default::default()
            })
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, "Rust Patterns");
    }

    #[test]
    fn search_treats_like_wildcards_as_literal_text() {
        let (_db, service, author) = setup();
        create(&service, &author, "100% true");
        create(&service, &author, "100 percent");

        let page = service
            .list_public(ListQuery {
                search: Some("100%".into()),
                ..Default::default()
            })
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, "100% true");

        let page = service
            .list_public(ListQuery {
                search: Some("100_".into()),
                ..Default::default()
            })
            .expect("underscore search");
        assert_eq!(page.total, 0);
    }

    #[test]
    fn pagination_windows_the_feed() {
        let (_db, service, author) = setup();
        for i in 0..5 {
            create(&service, &author, &format!("Post {i}"));
        }
        let page = service
            .list_public(ListQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .expect("page");
        assert_eq!(page.total, 5);
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn only_the_author_may_delete_a_post() {
        let (db, service, author) = setup();
        let accounts = AccountService::new(db);
        let other = accounts
            .register(RegisterInput {
                name: "bob".into(),
                username: None,
                email: "bob@example.com".into(),
                password: "secret".into(),
            })
            .expect("register bob");
        let post = create(&service, &author, "Mine");

        assert!(matches!(
            service.delete_post(&post.id, &other.id),
            Err(DomainError::Forbidden(_))
        ));
        service.delete_post(&post.id, &author).expect("delete");
        assert!(matches!(
            service.get_post(&post.id),
            Err(DomainError::NotFound(_))
        ));
    }
}
