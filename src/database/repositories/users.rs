use crate::database::models::UserRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteUserRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const USER_COLUMNS: &str = "id, name, username, email, password_hash, avatar_url, bio, place, \
     role, suspended, created_at, updated_at";

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

impl<'conn> super::UserRepository for SqliteUserRepository<'conn> {
    fn create(&self, record: &UserRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, name, username, email, password_hash, avatar_url, bio, place,
                               role, suspended, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.id,
                record.name,
                record.username,
                record.email,
                record.password_hash,
                record.avatar_url,
                record.bio,
                record.place,
                record.role,
                record.suspended,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UserRecord>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()?;
        Ok(result)
    }

    fn find_by_email_or_username(&self, needle: &str) -> Result<Option<UserRecord>> {
        // Emails are stored lowercased at registration; match them
        // case-insensitively while usernames stay exact.
        let result = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 OR username = ?2"),
                params![needle.trim().to_lowercase(), needle],
                map_user,
            )
            .optional()?;
        Ok(result)
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn update(&self, record: &UserRecord) -> Result<bool> {
        let changed = self.conn.execute(
            r#"
            UPDATE users
            SET name = ?1, username = ?2, avatar_url = ?3, bio = ?4, place = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
            params![
                record.name,
                record.username,
                record.avatar_url,
                record.bio,
                record.place,
                record.updated_at,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn set_password_hash(&self, id: &str, hash: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![hash, id],
        )?;
        Ok(changed > 0)
    }

    fn set_role(&self, id: &str, role: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            params![role, id],
        )?;
        Ok(changed > 0)
    }

    fn set_suspended(&self, id: &str, suspended: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET suspended = ?1 WHERE id = ?2",
            params![suspended, id],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<UserRecord>> {
        let pattern = super::escape_like(query);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE name LIKE '%' || ?1 || '%' ESCAPE '\'
               OR username LIKE '%' || ?1 || '%' ESCAPE '\'
               OR email LIKE '%' || ?1 || '%' ESCAPE '\'
               OR place LIKE '%' || ?1 || '%' ESCAPE '\'
            ORDER BY name ASC
            LIMIT ?2
            "#
        ))?;
        let rows = stmt.query_map(params![pattern, limit as i64], map_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn list(&self, search: &str, limit: usize, offset: usize) -> Result<Vec<UserRecord>> {
        let pattern = super::escape_like(search);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE name LIKE '%' || ?1 || '%' ESCAPE '\'
               OR username LIKE '%' || ?1 || '%' ESCAPE '\'
               OR email LIKE '%' || ?1 || '%' ESCAPE '\'
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))?;
        let rows = stmt.query_map(params![pattern, limit as i64, offset as i64], map_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn count(&self, search: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM users
            WHERE name LIKE '%' || ?1 || '%' ESCAPE '\'
               OR username LIKE '%' || ?1 || '%' ESCAPE '\'
               OR email LIKE '%' || ?1 || '%' ESCAPE '\'
            "#,
            params![super::escape_like(search)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_active(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE suspended = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
