use crate::database::models::PostRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqlitePostRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const POST_COLUMNS: &str = "id, author_id, title, body, kind, images, video, video_start, \
     video_end, document, article_content, tags, categories, status, scheduled_at, hidden, \
     created_at, updated_at";

fn decode_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn encode_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        serde_json::to_string(values).ok()
    }
}

fn map_post(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        author_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        kind: row.get(4)?,
        images: decode_list(row.get(5)?),
        video: row.get(6)?,
        video_start: row.get(7)?,
        video_end: row.get(8)?,
        document: row.get(9)?,
        article_content: row.get(10)?,
        tags: decode_list(row.get(11)?),
        categories: decode_list(row.get(12)?),
        status: row.get(13)?,
        scheduled_at: row.get(14)?,
        hidden: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

impl<'conn> SqlitePostRepository<'conn> {
    fn collect(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }
}

impl<'conn> super::PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, author_id, title, body, kind, images, video, video_start,
                               video_end, document, article_content, tags, categories, status,
                               scheduled_at, hidden, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                record.id,
                record.author_id,
                record.title,
                record.body,
                record.kind,
                encode_list(&record.images),
                record.video,
                record.video_start,
                record.video_end,
                record.document,
                record.article_content,
                encode_list(&record.tags),
                encode_list(&record.categories),
                record.status,
                record.scheduled_at,
                record.hidden,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PostRecord>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                map_post,
            )
            .optional()?;
        Ok(result)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn set_hidden(&self, id: &str, hidden: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE posts SET hidden = ?1 WHERE id = ?2",
            params![hidden, id],
        )?;
        Ok(changed > 0)
    }

    fn list_public(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<PostRecord>> {
        self.collect(
            &format!(
                r#"
                SELECT {POST_COLUMNS} FROM posts
                WHERE status = 'published' AND hidden = 0 AND title LIKE '%' || ?1 || '%' ESCAPE '\'
                ORDER BY created_at DESC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![super::escape_like(search), limit as i64, offset as i64],
        )
    }

    fn count_public(&self, search: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE status = 'published' AND hidden = 0 AND title LIKE '%' || ?1 || '%' ESCAPE '\'
            "#,
            params![super::escape_like(search)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn list_for_author(
        &self,
        author_id: &str,
        search: &str,
        status: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>> {
        match status {
            Some(status) => self.collect(
                &format!(
                    r#"
                    SELECT {POST_COLUMNS} FROM posts
                    WHERE author_id = ?1 AND title LIKE '%' || ?2 || '%' ESCAPE '\' AND status = ?3
                    ORDER BY created_at DESC
                    LIMIT ?4 OFFSET ?5
                    "#
                ),
                params![author_id, super::escape_like(search), status, limit as i64, offset as i64],
            ),
            None => self.collect(
                &format!(
                    r#"
                    SELECT {POST_COLUMNS} FROM posts
                    WHERE author_id = ?1 AND title LIKE '%' || ?2 || '%' ESCAPE '\'
                    ORDER BY created_at DESC
                    LIMIT ?3 OFFSET ?4
                    "#
                ),
                params![author_id, super::escape_like(search), limit as i64, offset as i64],
            ),
        }
    }

    fn count_for_author(
        &self,
        author_id: &str,
        search: &str,
        status: Option<&str>,
    ) -> Result<usize> {
        let count: i64 = match status {
            Some(status) => self.conn.query_row(
                r#"
                SELECT COUNT(*) FROM posts
                WHERE author_id = ?1 AND title LIKE '%' || ?2 || '%' ESCAPE '\' AND status = ?3
                "#,
                params![author_id, super::escape_like(search), status],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE author_id = ?1 AND title LIKE '%' || ?2 || '%' ESCAPE '\\'",
                params![author_id, super::escape_like(search)],
                |row| row.get(0),
            )?,
        };
        Ok(count as usize)
    }

    fn list_all(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<PostRecord>> {
        self.collect(
            &format!(
                r#"
                SELECT {POST_COLUMNS} FROM posts
                WHERE title LIKE '%' || ?1 || '%' ESCAPE '\'
                ORDER BY created_at DESC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![super::escape_like(search), limit as i64, offset as i64],
        )
    }

    fn count_all(&self, search: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE title LIKE '%' || ?1 || '%' ESCAPE '\\'",
            params![super::escape_like(search)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_hidden(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM posts WHERE hidden = 1", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}
