use crate::database::models::CommentRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteCommentRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::CommentRepository for SqliteCommentRepository<'conn> {
    fn add(&self, record: &CommentRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO comments (id, post_id, user_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.post_id,
                record.user_id,
                record.body,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<CommentRecord>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, post_id, user_id, body, created_at FROM comments WHERE id = ?1",
                params![id],
                |row| {
                    Ok(CommentRecord {
                        id: row.get(0)?,
                        post_id: row.get(1)?,
                        user_id: row.get(2)?,
                        body: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    fn remove(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>> {
        // rowid keeps append order even when timestamps collide
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, post_id, user_id, body, created_at
            FROM comments
            WHERE post_id = ?1
            ORDER BY rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], |row| {
            Ok(CommentRecord {
                id: row.get(0)?,
                post_id: row.get(1)?,
                user_id: row.get(2)?,
                body: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn count_for_post(&self, post_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn set_reaction(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: &str,
        created_at: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO comment_reactions (comment_id, user_id, kind, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(comment_id, user_id) DO UPDATE SET
                kind = excluded.kind,
                created_at = excluded.created_at
            "#,
            params![comment_id, user_id, kind, created_at],
        )?;
        Ok(())
    }

    fn clear_reaction(&self, comment_id: &str, user_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM comment_reactions WHERE comment_id = ?1 AND user_id = ?2",
            params![comment_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn get_reaction(&self, comment_id: &str, user_id: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT kind FROM comment_reactions WHERE comment_id = ?1 AND user_id = ?2",
                params![comment_id, user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(result)
    }

    fn reaction_counts(&self, comment_id: &str) -> Result<(usize, usize)> {
        let (likes, dislikes): (i64, i64) = self.conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(kind = 'like'), 0),
                COALESCE(SUM(kind = 'dislike'), 0)
            FROM comment_reactions
            WHERE comment_id = ?1
            "#,
            params![comment_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((likes as usize, dislikes as usize))
    }
}
