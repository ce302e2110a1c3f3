//! Racing archival attempts against an on-disk database.

use quote_store::{chat, quote, user, Chat, ChatKind, Database, InsertOutcome, NewQuote, User};

async fn file_db(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("quotes.db");
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let db = Database::connect_with_pool_size(&url, 8).await.unwrap();
    db.migrate().await.unwrap();

    user::upsert_user(db.pool(), &User::new(1, "Alice")).await.unwrap();
    user::upsert_user(db.pool(), &User::new(2, "Bob")).await.unwrap();
    chat::upsert_chat(db.pool(), &Chat::new(-1, ChatKind::Supergroup, Some("Friends")))
        .await
        .unwrap();
    db
}

fn quote_for(message_id: i64, quoted_by: i64) -> NewQuote {
    NewQuote {
        chat_id: -1,
        message_id,
        sent_at: 1_600_000_000,
        sent_by: 1,
        content: format!("message {message_id}"),
        spans: Vec::new(),
        quoted_by: Some(quoted_by),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_inserts_add_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    for message_id in 0..20 {
        let tasks: Vec<_> = (0..4)
            .map(|n| {
                let db = db.clone();
                tokio::spawn(async move {
                    quote::insert_quote(db.pool(), &quote_for(message_id, 1 + n % 2)).await
                })
            })
            .collect();

        let mut added = 0;
        let mut existing = 0;
        for task in tasks {
            match task.await.unwrap().unwrap() {
                InsertOutcome::Added => added += 1,
                InsertOutcome::AlreadyExists => existing += 1,
            }
        }
        assert_eq!(added, 1, "message {message_id}");
        assert_eq!(existing, 3, "message {message_id}");
    }

    assert_eq!(quote::quote_count(db.pool(), -1, None).await.unwrap(), 20);
    db.close().await;
}

#[tokio::test]
async fn test_schema_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = file_db(&dir).await;
        quote::insert_quote(db.pool(), &quote_for(1, 2)).await.unwrap();
        db.close().await;
    }

    let db = file_db(&dir).await;
    let outcome = quote::insert_quote(db.pool(), &quote_for(1, 2)).await.unwrap();
    assert_eq!(outcome, InsertOutcome::AlreadyExists);
    assert_eq!(quote::quote_count(db.pool(), -1, None).await.unwrap(), 1);
}
