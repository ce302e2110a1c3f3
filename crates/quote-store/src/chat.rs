//! Chat upsert and lookup.

use sqlx::SqlitePool;

use crate::models::Chat;
use crate::Result;

/// Insert a chat, or refresh the title and handle of an existing one.
pub async fn upsert_chat(pool: &SqlitePool, chat: &Chat) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chats (id, kind, title, username)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            kind = excluded.kind,
            title = excluded.title,
            username = excluded.username
        "#,
    )
    .bind(chat.id)
    .bind(chat.kind)
    .bind(&chat.title)
    .bind(&chat.username)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a chat by ID.
pub async fn get_chat(pool: &SqlitePool, id: i64) -> Result<Option<Chat>> {
    let chat = sqlx::query_as::<_, Chat>(
        r#"
        SELECT id, kind, title, username
        FROM chats
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(chat)
}
