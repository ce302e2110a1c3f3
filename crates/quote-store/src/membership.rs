//! Chat membership tracking.

use sqlx::SqlitePool;

use crate::models::ChatSummary;
use crate::Result;

/// Record that a user has been active in a chat.
///
/// Recording the same pair again is a no-op.
pub async fn record_membership(pool: &SqlitePool, user_id: i64, chat_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO memberships (user_id, chat_id)
        VALUES (?, ?)
        ON CONFLICT(user_id, chat_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(chat_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// List the chats a user has been seen in, ordered by title ignoring case.
pub async fn chats_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ChatSummary>> {
    let chats = sqlx::query_as::<_, ChatSummary>(
        r#"
        SELECT chats.id AS chat_id, COALESCE(chats.title, '') AS title
        FROM chats
        INNER JOIN memberships
            ON memberships.chat_id = chats.id
        WHERE memberships.user_id = ?
        ORDER BY COALESCE(chats.title, '') COLLATE NOCASE, chats.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(chats)
}
