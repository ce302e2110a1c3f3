//! Browsing state storage for private-chat sessions.
//!
//! Each user owns one row: a phase name plus a JSON payload whose shape
//! depends on the phase (the chat menu while selecting, the chat id once
//! selected, empty otherwise).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DatabaseError;
use crate::models::{BrowsingState, ChatChoice};
use crate::Result;

const NO_CHAT_SPECIFIED: &str = "no_chat_specified";
const SELECTING_CHAT: &str = "selecting_chat";
const CHAT_SELECTED: &str = "chat_selected";

/// Get a user's browsing state, if one was ever stored.
pub async fn get_state(pool: &SqlitePool, user_id: i64) -> Result<Option<BrowsingState>> {
    let row = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT phase, data
        FROM browsing_states
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|(phase, data)| decode(user_id, &phase, &data))
        .transpose()
}

/// Get a user's browsing state, creating a `NoChatSpecified` row on first use.
pub async fn get_or_create_state(pool: &SqlitePool, user_id: i64) -> Result<BrowsingState> {
    let created = sqlx::query(
        r#"
        INSERT INTO browsing_states (user_id, phase, data)
        VALUES (?, ?, '')
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(NO_CHAT_SPECIFIED)
    .execute(pool)
    .await?;

    if created.rows_affected() > 0 {
        debug!("Created browsing state for user {}", user_id);
        return Ok(BrowsingState::NoChatSpecified);
    }

    Ok(get_state(pool, user_id).await?.unwrap_or_default())
}

/// Replace a user's browsing state.
pub async fn set_state(pool: &SqlitePool, user_id: i64, state: &BrowsingState) -> Result<()> {
    let data = encode(state)?;

    sqlx::query(
        r#"
        INSERT INTO browsing_states (user_id, phase, data)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            phase = excluded.phase,
            data = excluded.data
        "#,
    )
    .bind(user_id)
    .bind(state.phase())
    .bind(&data)
    .execute(pool)
    .await?;

    debug!("User {} browsing state is now {}", user_id, state.phase());
    Ok(())
}

fn encode(state: &BrowsingState) -> Result<String> {
    let data = match state {
        BrowsingState::NoChatSpecified => String::new(),
        BrowsingState::SelectingChat { choices } => serde_json::to_string(choices)?,
        BrowsingState::ChatSelected { chat_id } => chat_id.to_string(),
    };
    Ok(data)
}

fn decode(user_id: i64, phase: &str, data: &str) -> Result<BrowsingState> {
    let corrupt = |reason: String| DatabaseError::CorruptState { user_id, reason };

    match phase {
        NO_CHAT_SPECIFIED => Ok(BrowsingState::NoChatSpecified),
        SELECTING_CHAT => serde_json::from_str::<Vec<ChatChoice>>(data)
            .map(|choices| BrowsingState::SelectingChat { choices })
            .map_err(|e| corrupt(format!("bad chat menu: {}", e))),
        CHAT_SELECTED => data
            .trim()
            .parse::<i64>()
            .map(|chat_id| BrowsingState::ChatSelected { chat_id })
            .map_err(|e| corrupt(format!("bad chat id {:?}: {}", data, e))),
        other => Err(corrupt(format!("unknown phase {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn menu() -> Vec<ChatChoice> {
        vec![
            ChatChoice {
                index: 0,
                chat_id: -2,
                title: "Apple".to_string(),
            },
            ChatChoice {
                index: 1,
                chat_id: -1,
                title: "zebra".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_state_created_lazily() {
        let db = test_db().await;
        assert!(get_state(db.pool(), 1).await.unwrap().is_none());

        let state = get_or_create_state(db.pool(), 1).await.unwrap();
        assert_eq!(state, BrowsingState::NoChatSpecified);
        assert_eq!(
            get_state(db.pool(), 1).await.unwrap(),
            Some(BrowsingState::NoChatSpecified)
        );
    }

    #[tokio::test]
    async fn test_state_round_trips_every_phase() {
        let db = test_db().await;

        let selecting = BrowsingState::SelectingChat { choices: menu() };
        set_state(db.pool(), 1, &selecting).await.unwrap();
        assert_eq!(get_or_create_state(db.pool(), 1).await.unwrap(), selecting);

        let selected = BrowsingState::ChatSelected { chat_id: -1 };
        set_state(db.pool(), 1, &selected).await.unwrap();
        assert_eq!(get_or_create_state(db.pool(), 1).await.unwrap(), selected);

        set_state(db.pool(), 1, &BrowsingState::NoChatSpecified)
            .await
            .unwrap();
        assert_eq!(
            get_or_create_state(db.pool(), 1).await.unwrap(),
            BrowsingState::NoChatSpecified
        );
    }

    #[tokio::test]
    async fn test_states_are_per_user() {
        let db = test_db().await;
        set_state(db.pool(), 1, &BrowsingState::ChatSelected { chat_id: -1 })
            .await
            .unwrap();

        assert_eq!(
            get_or_create_state(db.pool(), 2).await.unwrap(),
            BrowsingState::NoChatSpecified
        );
    }

    #[tokio::test]
    async fn test_corrupt_row_is_an_error() {
        let db = test_db().await;
        sqlx::query("INSERT INTO browsing_states (user_id, phase, data) VALUES (1, 'chat_selected', 'abc')")
            .execute(db.pool())
            .await
            .unwrap();

        let result = get_or_create_state(db.pool(), 1).await;
        assert!(matches!(
            result,
            Err(DatabaseError::CorruptState { user_id: 1, .. })
        ));
    }
}
