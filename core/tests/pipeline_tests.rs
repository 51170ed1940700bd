use alumni_link_core::models::{CurrentUser, NewMessage, Role};
use alumni_link_core::query::{get_message, insert_message_at, unread_total};
use alumni_link_core::seed::seed_demo;
use alumni_link_core::shell::View;
use alumni_link_core::{open_store, MessagingConfig, MessagingSession};
use tempfile::tempdir;

#[test]
fn file_store_persists_across_sessions() {
    let tmp = tempdir().expect("temp");
    let db_path = tmp.path().join("nested").join("alumni-link.sqlite");
    let config = MessagingConfig {
        database_path: db_path.clone(),
        log_dir: tmp.path().join("logs"),
        ..MessagingConfig::default()
    };

    {
        let store = open_store(&config.database_path).expect("open");
        seed_demo(&store.conn).expect("seed");
        let student = CurrentUser {
            id: "u-student".to_string(),
            role: Role::Student,
        };
        let mut session = MessagingSession::with_config(&store, student, &config);
        session.open(None);
        assert_eq!(session.conversations().len(), 2);
        session.select("u-alumni");
        assert_eq!(session.view(), View::Thread);
        session.set_draft("Thanks for the advice!");
        assert!(session.send().is_some());
    }

    let store = open_store(&db_path).expect("reopen");
    assert_eq!(unread_total(&store.conn, "u-alumni").expect("unread"), 4);

    let alumna = CurrentUser {
        id: "u-alumni".to_string(),
        role: Role::Alumni,
    };
    let mut session = MessagingSession::with_config(&store, alumna, &config);
    session.open(None);
    let student = session
        .conversations()
        .iter()
        .find(|c| c.counterpart_id == "u-student")
        .expect("student conversation");
    assert_eq!(student.counterpart_name, "Marcus Lee");
    assert_eq!(student.last_message, "Thanks for the advice!");
    assert_eq!(student.unread_count, 2);
    assert!(session.take_notices().is_empty());
    assert!(!tmp.path().join("logs").join("diagnostics.log").exists());
}

#[test]
fn sent_message_reads_back_by_id_when_not_last_in_thread() {
    let tmp = tempdir().expect("temp");
    let store = open_store(&tmp.path().join("alumni-link.sqlite")).expect("open");
    let later = NewMessage {
        sender_id: "b".to_string(),
        receiver_id: "a".to_string(),
        content: "scheduled reply".to_string(),
    };
    insert_message_at(&store.conn, &later, 4_102_444_800_000).expect("future row");

    let user = CurrentUser {
        id: "a".to_string(),
        role: Role::Student,
    };
    let mut session = MessagingSession::new(&store, user);
    session.select("b");
    session.set_draft("hello");
    let sent = session.send().expect("sent");

    assert_eq!(session.thread().last().map(|m| m.content.as_str()), Some("scheduled reply"));
    assert_eq!(get_message(&store.conn, &sent.id).expect("stored"), sent);
}
