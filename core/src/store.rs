use crate::db::SqliteStore;
use crate::error::CoreError;
use crate::models::{Message, NewMessage, ParticipantProfile};
use crate::query;

/// The message table and profile lookup the messaging core reads and writes.
///
/// Each call is an independent operation; implementations make no atomicity
/// promise across calls.
pub trait MessageStore {
    /// Messages where the user is sender or receiver, newest first.
    fn messages_for_user(&self, user_id: &str) -> Result<Vec<Message>, CoreError>;

    /// Messages exchanged between the two users in either direction, oldest first.
    fn thread_between(&self, user_id: &str, counterpart_id: &str) -> Result<Vec<Message>, CoreError>;

    fn profiles_for(&self, user_ids: &[String]) -> Result<Vec<ParticipantProfile>, CoreError>;

    /// Sets `read` on every unread message from `counterpart_id` to `user_id`.
    fn mark_read(&self, user_id: &str, counterpart_id: &str) -> Result<usize, CoreError>;

    fn insert(&self, message: &NewMessage) -> Result<Message, CoreError>;
}

impl MessageStore for SqliteStore {
    fn messages_for_user(&self, user_id: &str) -> Result<Vec<Message>, CoreError> {
        query::list_messages_for_user(&self.conn, user_id)
    }

    fn thread_between(&self, user_id: &str, counterpart_id: &str) -> Result<Vec<Message>, CoreError> {
        query::list_thread(&self.conn, user_id, counterpart_id)
    }

    fn profiles_for(&self, user_ids: &[String]) -> Result<Vec<ParticipantProfile>, CoreError> {
        query::lookup_profiles(&self.conn, user_ids)
    }

    fn mark_read(&self, user_id: &str, counterpart_id: &str) -> Result<usize, CoreError> {
        query::mark_thread_read(&self.conn, user_id, counterpart_id)
    }

    fn insert(&self, message: &NewMessage) -> Result<Message, CoreError> {
        query::insert_message(&self.conn, message)
    }
}

impl<S: MessageStore + ?Sized> MessageStore for &S {
    fn messages_for_user(&self, user_id: &str) -> Result<Vec<Message>, CoreError> {
        (**self).messages_for_user(user_id)
    }

    fn thread_between(&self, user_id: &str, counterpart_id: &str) -> Result<Vec<Message>, CoreError> {
        (**self).thread_between(user_id, counterpart_id)
    }

    fn profiles_for(&self, user_ids: &[String]) -> Result<Vec<ParticipantProfile>, CoreError> {
        (**self).profiles_for(user_ids)
    }

    fn mark_read(&self, user_id: &str, counterpart_id: &str) -> Result<usize, CoreError> {
        (**self).mark_read(user_id, counterpart_id)
    }

    fn insert(&self, message: &NewMessage) -> Result<Message, CoreError> {
        (**self).insert(message)
    }
}
