use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteLikeRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::LikeRepository for SqliteLikeRepository<'conn> {
    fn add(&self, post_id: &str, user_id: &str, created_at: &str) -> Result<bool> {
        // set-add: the primary key swallows concurrent duplicates
        let inserted = self.conn.execute(
            r#"
            INSERT INTO post_likes (post_id, user_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(post_id, user_id) DO NOTHING
            "#,
            params![post_id, user_id, created_at],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn count_for_post(&self, post_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn has_liked(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn likers_of(&self, post_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id FROM post_likes
            WHERE post_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], |row| row.get::<_, String>(0))?;

        let mut likers = Vec::new();
        for row in rows {
            likers.push(row?);
        }
        Ok(likers)
    }
}
