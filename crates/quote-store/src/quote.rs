//! Quote archival and retrieval.

use rand::Rng;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::markup::rewrite_entities;
use crate::models::{InsertOutcome, NewQuote, Quote, QuoteWithAuthor, User};
use crate::Result;

/// Columns selected for a quote joined with its author.
const QUOTE_WITH_AUTHOR_COLUMNS: &str = r#"
    quotes.id, quotes.chat_id, quotes.message_id, quotes.sent_at, quotes.sent_by,
    quotes.content, quotes.quoted_by,
    users.first_name, users.last_name, users.username
"#;

#[derive(FromRow)]
struct QuoteAuthorRow {
    id: i64,
    chat_id: i64,
    message_id: i64,
    sent_at: i64,
    sent_by: i64,
    content: String,
    quoted_by: Option<i64>,
    first_name: String,
    last_name: String,
    username: String,
}

impl From<QuoteAuthorRow> for QuoteWithAuthor {
    fn from(row: QuoteAuthorRow) -> Self {
        Self {
            author: User {
                id: row.sent_by,
                first_name: row.first_name,
                last_name: row.last_name,
                username: row.username,
            },
            quote: Quote {
                id: row.id,
                chat_id: row.chat_id,
                message_id: row.message_id,
                sent_at: row.sent_at,
                sent_by: row.sent_by,
                content: row.content,
                quoted_by: row.quoted_by,
            },
        }
    }
}

/// Archive a message.
///
/// Returns [`InsertOutcome::AlreadyExists`] without writing anything when the
/// (chat, message) pair is already archived. The unique index on that pair
/// settles concurrent attempts: exactly one of them reports `Added`.
pub async fn insert_quote(pool: &SqlitePool, quote: &NewQuote) -> Result<InsertOutcome> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM quotes
            WHERE chat_id = ? AND message_id = ?
        )
        "#,
    )
    .bind(quote.chat_id)
    .bind(quote.message_id)
    .fetch_one(pool)
    .await?;

    if exists {
        debug!(
            "Quote for message {} in chat {} already archived",
            quote.message_id, quote.chat_id
        );
        return Ok(InsertOutcome::AlreadyExists);
    }

    let content = rewrite_entities(&quote.content, &quote.spans);

    let result = sqlx::query(
        r#"
        INSERT INTO quotes (chat_id, message_id, sent_at, sent_by, content, quoted_by)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(chat_id, message_id) DO NOTHING
        "#,
    )
    .bind(quote.chat_id)
    .bind(quote.message_id)
    .bind(quote.sent_at)
    .bind(quote.sent_by)
    .bind(&content)
    .bind(quote.quoted_by)
    .execute(pool)
    .await;

    let outcome = match result {
        Ok(done) if done.rows_affected() == 0 => InsertOutcome::AlreadyExists,
        Ok(_) => InsertOutcome::Added,
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            InsertOutcome::AlreadyExists
        }
        Err(e) => return Err(e.into()),
    };

    if outcome == InsertOutcome::Added {
        info!(
            "Archived message {} in chat {} (author: {}, quoted by: {:?})",
            quote.message_id, quote.chat_id, quote.sent_by, quote.quoted_by
        );
    }

    Ok(outcome)
}

/// Pick a quote from a chat uniformly at random.
///
/// With `author`, only quotes whose author's full name or handle contains
/// the filter (ignoring case and any leading `@`) are candidates.
pub async fn random_quote(
    pool: &SqlitePool,
    chat_id: i64,
    author: Option<&str>,
) -> Result<Option<QuoteWithAuthor>> {
    let Some(name) = author else {
        let query = format!(
            r#"
            SELECT {QUOTE_WITH_AUTHOR_COLUMNS}
            FROM quotes
            INNER JOIN users ON users.id = quotes.sent_by
            WHERE quotes.chat_id = ?
            ORDER BY RANDOM()
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, QuoteAuthorRow>(&query)
            .bind(chat_id)
            .fetch_optional(pool)
            .await?;
        return Ok(row.map(QuoteWithAuthor::from));
    };

    let needle = fold(name.trim().trim_start_matches('@'));
    let mut candidates = load_candidates(pool, Some(chat_id)).await?;
    candidates.retain(|found| author_matches(found, &needle));
    Ok(pick_random(candidates))
}

/// Pick a random quote whose content contains `terms`, ignoring case.
///
/// This searches every chat, not only the caller's, so a user can read
/// quotes from chats they are not a member of.
pub async fn search_quote(pool: &SqlitePool, terms: &str) -> Result<Option<QuoteWithAuthor>> {
    let needle = fold(terms);
    let mut candidates = load_candidates(pool, None).await?;
    candidates.retain(|found| contains_folded(&found.quote.content, &needle));
    Ok(pick_random(candidates))
}

/// Count the quotes of a chat.
///
/// With `search`, only quotes whose content, author full name or author
/// handle contains the term (ignoring case) are counted.
pub async fn quote_count(pool: &SqlitePool, chat_id: i64, search: Option<&str>) -> Result<i64> {
    let Some(term) = search else {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM quotes
            WHERE chat_id = ?
            "#,
        )
        .bind(chat_id)
        .fetch_one(pool)
        .await?;
        return Ok(count);
    };

    let needle = fold(term);
    let count = load_candidates(pool, Some(chat_id))
        .await?
        .iter()
        .filter(|found| {
            contains_folded(&found.quote.content, &needle) || author_matches(found, &needle)
        })
        .count();

    Ok(count as i64)
}

/// Every quote of a chat (or of all chats) with its author.
///
/// SQLite `LIKE` folds ASCII only, so substring filters run here instead.
async fn load_candidates(pool: &SqlitePool, chat_id: Option<i64>) -> Result<Vec<QuoteWithAuthor>> {
    let query = format!(
        r#"
        SELECT {QUOTE_WITH_AUTHOR_COLUMNS}
        FROM quotes
        INNER JOIN users ON users.id = quotes.sent_by
        WHERE ? IS NULL OR quotes.chat_id = ?
        ORDER BY quotes.id
        "#
    );
    let rows = sqlx::query_as::<_, QuoteAuthorRow>(&query)
        .bind(chat_id)
        .bind(chat_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(QuoteWithAuthor::from).collect())
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Whether `haystack` contains an already folded `needle`, ignoring case.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(needle)
}

fn author_matches(found: &QuoteWithAuthor, needle: &str) -> bool {
    contains_folded(&found.author.full_name(), needle)
        || contains_folded(&found.author.username, needle)
}

fn pick_random(mut candidates: Vec<QuoteWithAuthor>) -> Option<QuoteWithAuthor> {
    if candidates.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..candidates.len());
    Some(candidates.swap_remove(index))
}

/// Get the earliest-sent quote of a chat.
pub async fn first_quote(pool: &SqlitePool, chat_id: i64) -> Result<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
        SELECT id, chat_id, message_id, sent_at, sent_by, content, quoted_by
        FROM quotes
        WHERE chat_id = ?
        ORDER BY sent_at ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(quote)
}
