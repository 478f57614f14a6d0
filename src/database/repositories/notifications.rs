use crate::database::models::NotificationRecord;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(super) struct SqliteNotificationRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<NotificationRecord> {
    Ok(NotificationRecord {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        sender_id: row.get(2)?,
        kind: row.get(3)?,
        post_id: row.get(4)?,
        comment_excerpt: row.get(5)?,
        read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl<'conn> super::NotificationRepository for SqliteNotificationRepository<'conn> {
    fn create(&self, record: &NotificationRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (id, recipient_id, sender_id, kind, post_id,
                                       comment_excerpt, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.recipient_id,
                record.sender_id,
                record.kind,
                record.post_id,
                record.comment_excerpt,
                record.read,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn list_for_recipient(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<NotificationRecord>> {
        let sql = if unread_only {
            r#"
            SELECT id, recipient_id, sender_id, kind, post_id, comment_excerpt, read, created_at
            FROM notifications
            WHERE recipient_id = ?1 AND read = 0
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        } else {
            r#"
            SELECT id, recipient_id, sender_id, kind, post_id, comment_excerpt, read, created_at
            FROM notifications
            WHERE recipient_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![recipient_id, limit as i64], map_notification)?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    fn unread_count(&self, recipient_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
            params![recipient_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn mark_read(&self, id: &str, recipient_id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1 AND recipient_id = ?2",
            params![id, recipient_id],
        )?;
        Ok(changed > 0)
    }

    fn mark_all_read(&self, recipient_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE recipient_id = ?1 AND read = 0",
            params![recipient_id],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str, recipient_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM notifications WHERE id = ?1 AND recipient_id = ?2",
            params![id, recipient_id],
        )?;
        Ok(removed > 0)
    }

    fn delete_follow_notification(&self, recipient_id: &str, sender_id: &str) -> Result<()> {
        self.conn.execute(
            r#"
            DELETE FROM notifications
            WHERE recipient_id = ?1 AND sender_id = ?2 AND kind = 'follow'
            "#,
            params![recipient_id, sender_id],
        )?;
        Ok(())
    }
}
