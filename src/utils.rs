//! Shared helpers and constants.

use chrono::Utc;

pub const APP_NAME: &str = "inkstream_backend";

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339()
}

/// First 100 characters of a comment, stored on comment notifications.
pub fn comment_excerpt(text: &str) -> String {
    text.chars().take(100).collect()
}
