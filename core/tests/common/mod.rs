#![allow(dead_code)]

use std::cell::Cell;

use alumni_link_core::db::{open_in_memory, SqliteStore};
use alumni_link_core::models::{Message, NewMessage, ParticipantProfile, Role};
use alumni_link_core::query::{insert_message_at, upsert_profile};
use alumni_link_core::{CoreError, MessageStore};

/// Wraps an in-memory store, counting calls and failing on demand.
pub struct ProbeStore {
    pub inner: SqliteStore,
    pub list_calls: Cell<usize>,
    pub thread_calls: Cell<usize>,
    pub profile_calls: Cell<usize>,
    pub mark_calls: Cell<usize>,
    pub insert_calls: Cell<usize>,
    pub fail_list: Cell<bool>,
    pub fail_thread: Cell<bool>,
    pub fail_mark: Cell<bool>,
    pub fail_insert: Cell<bool>,
}

fn offline() -> CoreError {
    CoreError::InvalidArgument("backend unavailable".to_string())
}

impl ProbeStore {
    pub fn new() -> Self {
        Self {
            inner: open_in_memory().expect("memory store"),
            list_calls: Cell::new(0),
            thread_calls: Cell::new(0),
            profile_calls: Cell::new(0),
            mark_calls: Cell::new(0),
            insert_calls: Cell::new(0),
            fail_list: Cell::new(false),
            fail_thread: Cell::new(false),
            fail_mark: Cell::new(false),
            fail_insert: Cell::new(false),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.get()
            + self.thread_calls.get()
            + self.profile_calls.get()
            + self.mark_calls.get()
            + self.insert_calls.get()
    }

    pub fn profile(&self, user_id: &str, name: &str, role: Role) {
        upsert_profile(
            &self.inner.conn,
            &ParticipantProfile {
                user_id: user_id.to_string(),
                full_name: Some(name.to_string()),
                role,
                email: None,
            },
        )
        .expect("profile");
    }

    pub fn message(&self, sender: &str, receiver: &str, content: &str, ts: i64) -> Message {
        insert_message_at(
            &self.inner.conn,
            &NewMessage {
                sender_id: sender.to_string(),
                receiver_id: receiver.to_string(),
                content: content.to_string(),
            },
            ts,
        )
        .expect("insert")
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl MessageStore for ProbeStore {
    fn messages_for_user(&self, user_id: &str) -> Result<Vec<Message>, CoreError> {
        bump(&self.list_calls);
        if self.fail_list.get() {
            return Err(offline());
        }
        self.inner.messages_for_user(user_id)
    }

    fn thread_between(&self, user_id: &str, counterpart_id: &str) -> Result<Vec<Message>, CoreError> {
        bump(&self.thread_calls);
        if self.fail_thread.get() {
            return Err(offline());
        }
        self.inner.thread_between(user_id, counterpart_id)
    }

    fn profiles_for(&self, user_ids: &[String]) -> Result<Vec<ParticipantProfile>, CoreError> {
        bump(&self.profile_calls);
        self.inner.profiles_for(user_ids)
    }

    fn mark_read(&self, user_id: &str, counterpart_id: &str) -> Result<usize, CoreError> {
        bump(&self.mark_calls);
        if self.fail_mark.get() {
            return Err(offline());
        }
        self.inner.mark_read(user_id, counterpart_id)
    }

    fn insert(&self, message: &NewMessage) -> Result<Message, CoreError> {
        bump(&self.insert_calls);
        if self.fail_insert.get() {
            return Err(offline());
        }
        self.inner.insert(message)
    }
}
