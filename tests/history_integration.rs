//! Integration tests for chat history persistence
//!
//! Exercises the session store through a real history file: reopening,
//! retention caps, title derivation, corruption recovery, and import.

mod common;

use common::{create_temp_store, reopen};
use josai::history::{is_default_title, MAX_MESSAGES_PER_SESSION, MAX_SESSIONS};
use josai::JosaiError;
use std::fs;

#[test]
fn test_history_survives_reopen() {
    let (store, tmp) = create_temp_store();
    let session = store.create_session(None).unwrap();
    store
        .add_message(&session.id, "How do I read a file in Rust?", true)
        .unwrap();
    store
        .add_message(&session.id, "Use std::fs::read_to_string.", false)
        .unwrap();

    let before = store.list_sessions();
    drop(store);

    let reopened = reopen(&tmp);
    assert_eq!(reopened.list_sessions(), before);

    let session = reopened.get_session(&session.id).unwrap();
    assert_eq!(session.title, "How do I read a file");
    assert_eq!(session.messages.len(), 2);
    assert!(session.messages[0].is_user);
    assert!(!session.messages[1].is_user);
}

#[test]
fn test_fifty_first_session_evicts_least_recent() {
    let (store, _tmp) = create_temp_store();
    let first = store.create_session(Some("oldest")).unwrap();
    for i in 1..MAX_SESSIONS {
        store.create_session(Some(&format!("session {}", i))).unwrap();
    }
    assert_eq!(store.list_sessions().len(), MAX_SESSIONS);

    let newest = store.create_session(Some("newest")).unwrap();
    let sessions = store.list_sessions();

    assert_eq!(sessions.len(), MAX_SESSIONS);
    assert_eq!(sessions[0].id, newest.id);
    assert!(store.get_session(&first.id).is_none());
}

#[test]
fn test_touching_old_session_protects_it_from_eviction() {
    let (store, _tmp) = create_temp_store();
    let first = store.create_session(Some("oldest")).unwrap();
    let second = store.create_session(Some("second oldest")).unwrap();
    for i in 2..MAX_SESSIONS {
        store.create_session(Some(&format!("session {}", i))).unwrap();
    }

    store.add_message(&first.id, "still here", true).unwrap();
    store.create_session(Some("overflow")).unwrap();

    assert!(store.get_session(&first.id).is_some());
    assert!(store.get_session(&second.id).is_none());
}

#[test]
fn test_message_cap_keeps_newest() {
    let (store, _tmp) = create_temp_store();
    let session = store.create_session(Some("long")).unwrap();
    for i in 0..=MAX_MESSAGES_PER_SESSION {
        store
            .add_message(&session.id, &format!("msg {}", i), i % 2 == 0)
            .unwrap();
    }

    let messages = store.get_session(&session.id).unwrap().messages;
    assert_eq!(messages.len(), MAX_MESSAGES_PER_SESSION);
    assert_eq!(messages[0].text, "msg 1");
    assert_eq!(
        messages.last().unwrap().text,
        format!("msg {}", MAX_MESSAGES_PER_SESSION)
    );
}

#[test]
fn test_long_first_message_title_is_truncated() {
    let (store, _tmp) = create_temp_store();
    let session = store.create_session(None).unwrap();
    assert!(is_default_title(&session.title));

    store
        .add_message(
            &session.id,
            "Supercalifragilisticexpialidocious antidisestablishmentarianism pneumonoultramicroscopic words",
            true,
        )
        .unwrap();

    let title = store.get_session(&session.id).unwrap().title;
    assert_eq!(title.chars().count(), 50);
    assert!(title.ends_with("..."));
}

#[test]
fn test_corrupt_file_is_backed_up_and_reset() {
    let (store, tmp) = create_temp_store();
    let path = store.storage().path().to_path_buf();
    fs::write(&path, "{ this is not json").unwrap();

    assert!(store.list_sessions().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");

    let backups: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".backup."))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        fs::read_to_string(backups[0].path()).unwrap(),
        "{ this is not json"
    );

    // Store keeps working after recovery
    store.create_session(Some("fresh")).unwrap();
    assert_eq!(store.list_sessions().len(), 1);
}

#[test]
fn test_hand_written_document_loads() {
    let (store, _tmp) = create_temp_store();
    fs::write(
        store.storage().path(),
        r#"[
  {
    "id": "legacy",
    "title": "Legacy chat",
    "messages": [
      {"id": "m1", "text": "hi", "isUser": true, "timestamp": 1700000000000, "sessionId": "legacy"}
    ],
    "createdAt": 1700000000000
  }
]"#,
    )
    .unwrap();

    let session = store.get_session("legacy").unwrap();
    assert_eq!(session.last_updated_at, 1_700_000_000_000);
    assert_eq!(session.messages[0].session_id.as_deref(), Some("legacy"));
}

#[test]
fn test_search_is_case_insensitive() {
    let (store, _tmp) = create_temp_store();
    let a = store.create_session(None).unwrap();
    store.add_message(&a.id, "Tokio runtime question", true).unwrap();
    store.create_session(Some("unrelated")).unwrap();

    let results = store.search_sessions("TOKIO");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, a.id);
}

#[test]
fn test_export_import_between_stores() {
    let (source, _a) = create_temp_store();
    let s = source.create_session(None).unwrap();
    source.add_message(&s.id, "carry me over", true).unwrap();
    let exported = source.export_history().unwrap();

    let (target, _b) = create_temp_store();
    target.create_session(Some("overwritten")).unwrap();
    assert!(target.import_history(&exported).unwrap());
    assert_eq!(target.list_sessions(), source.list_sessions());

    assert!(!target.import_history("[{\"id\": 1}]").unwrap());
    assert_eq!(target.list_sessions(), source.list_sessions());
}

#[test]
fn test_write_failure_is_reported() {
    let (store, _tmp) = create_temp_store();
    store.create_session(Some("doomed")).unwrap();

    // A directory where the file should be makes every save fail
    let path = store.storage().path().to_path_buf();
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let err = store.create_session(Some("lost")).unwrap_err();
    assert!(JosaiError::is_storage_write(&err));
    assert!(store.list_sessions().is_empty());
}
