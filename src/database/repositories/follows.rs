use crate::database::models::{FollowCounts, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(super) struct SqliteFollowRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        avatar_url: row.get(5)?,
        bio: row.get(6)?,
        place: row.get(7)?,
        role: row.get(8)?,
        suspended: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl<'conn> super::FollowRepository for SqliteFollowRepository<'conn> {
    fn follow(&self, follower_id: &str, followee_id: &str, created_at: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO follows (follower_id, followee_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(follower_id, followee_id) DO NOTHING
            "#,
            params![follower_id, followee_id, created_at],
        )?;
        Ok(inserted > 0)
    }

    fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
        )?;
        Ok(removed > 0)
    }

    fn is_following(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn counts(&self, user_id: &str) -> Result<FollowCounts> {
        let followers: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE followee_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        let following: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(FollowCounts {
            followers: followers as usize,
            following: following as usize,
        })
    }

    fn followers_of(&self, user_id: &str) -> Result<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.id, u.name, u.username, u.email, u.password_hash, u.avatar_url, u.bio,
                   u.place, u.role, u.suspended, u.created_at, u.updated_at
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followee_id = ?1
            ORDER BY f.created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], map_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn following_of(&self, user_id: &str) -> Result<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.id, u.name, u.username, u.email, u.password_hash, u.avatar_url, u.bio,
                   u.place, u.role, u.suspended, u.created_at, u.updated_at
            FROM follows f
            JOIN users u ON u.id = f.followee_id
            WHERE f.follower_id = ?1
            ORDER BY f.created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], map_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}
