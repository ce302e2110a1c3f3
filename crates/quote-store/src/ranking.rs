//! Per-chat user rankings.

use sqlx::SqlitePool;

use crate::models::RankedUser;
use crate::Result;

/// Which quote column users are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Quotes the user wrote.
    Authored,
    /// Quotes the user archived.
    Archived,
}

impl RankBy {
    /// Get the database column name for this ranking.
    pub fn column_name(&self) -> &'static str {
        match self {
            RankBy::Authored => "sent_by",
            RankBy::Archived => "quoted_by",
        }
    }
}

/// Rank users of a chat by quote count, highest first, at most `limit` rows.
pub async fn rank_users(
    pool: &SqlitePool,
    chat_id: i64,
    by: RankBy,
    limit: i64,
) -> Result<Vec<RankedUser>> {
    // Column names come from RankBy, never from input.
    let column = by.column_name();
    let query = format!(
        r#"
        SELECT COUNT(*) AS count,
            TRIM(users.first_name || ' ' || users.last_name) AS display_name
        FROM quotes
        INNER JOIN users ON users.id = quotes.{column}
        WHERE quotes.chat_id = ?
        GROUP BY quotes.{column}
        ORDER BY count DESC, quotes.{column}
        LIMIT ?
        "#,
        column = column
    );

    let rows = sqlx::query_as::<_, RankedUser>(&query)
        .bind(chat_id)
        .bind(limit.max(0))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Users with the most quotes attributed to them.
pub async fn top_quoted(pool: &SqlitePool, chat_id: i64, limit: i64) -> Result<Vec<RankedUser>> {
    rank_users(pool, chat_id, RankBy::Authored, limit).await
}

/// Users who archived the most quotes.
pub async fn top_contributors(
    pool: &SqlitePool,
    chat_id: i64,
    limit: i64,
) -> Result<Vec<RankedUser>> {
    rank_users(pool, chat_id, RankBy::Archived, limit).await
}
