use crate::error::CoreError;
use crate::models::Message;
use crate::store::MessageStore;

/// Loads the chronological thread with `counterpart_id`, then marks the
/// counterpart's unread messages as read.
///
/// The returned messages carry the read flags as they were fetched. Marking is
/// best effort: a failure is logged and the thread is still returned.
pub fn load_thread<S: MessageStore>(
    store: &S,
    user_id: &str,
    counterpart_id: &str,
) -> Result<Vec<Message>, CoreError> {
    let messages = store.thread_between(user_id, counterpart_id)?;

    let has_unread = messages
        .iter()
        .any(|m| m.sender_id == counterpart_id && m.is_unread_for(user_id));
    if has_unread {
        match store.mark_read(user_id, counterpart_id) {
            Ok(changed) => tracing::debug!(user_id, counterpart_id, changed, "thread marked read"),
            Err(err) => tracing::warn!(user_id, counterpart_id, error = %err, "mark-as-read failed"),
        }
    }

    Ok(messages)
}
