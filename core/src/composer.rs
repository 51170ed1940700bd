use crate::error::{CoreError, ValidationError};
use crate::models::{Message, NewMessage};
use crate::store::MessageStore;
use crate::thread::load_thread;

/// Checks a draft before anything is sent. Returns the trimmed content and the
/// receiver.
pub fn validate<'a>(
    content: &'a str,
    counterpart_id: Option<&'a str>,
) -> Result<(&'a str, &'a str), ValidationError> {
    let counterpart_id = counterpart_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ValidationError::NoCounterpart)?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok((content, counterpart_id))
}

/// Result of a successful send. `refreshed` is the thread as re-fetched after
/// the insert, or the error that reload ran into.
#[derive(Debug)]
pub struct Sent {
    pub message: Message,
    pub refreshed: Result<Vec<Message>, CoreError>,
}

/// Holds the draft text for the active thread.
#[derive(Debug, Default, Clone)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn can_send(&self, counterpart_id: Option<&str>) -> bool {
        validate(&self.draft, counterpart_id).is_ok()
    }

    /// Builds the insert payload from the current draft without touching it.
    pub fn prepare(&self, user_id: &str, counterpart_id: Option<&str>) -> Result<NewMessage, ValidationError> {
        let (content, receiver) = validate(&self.draft, counterpart_id)?;
        Ok(NewMessage {
            sender_id: user_id.to_string(),
            receiver_id: receiver.to_string(),
            content: content.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    /// Inserts the draft and reloads the thread.
    ///
    /// Nothing touches the store when validation fails. The draft is cleared
    /// only after the insert succeeds, so a failed send can be retried as is.
    pub fn send<S: MessageStore>(
        &mut self,
        store: &S,
        user_id: &str,
        counterpart_id: Option<&str>,
    ) -> Result<Sent, CoreError> {
        let new = self.prepare(user_id, counterpart_id)?;
        let message = store.insert(&new)?;
        self.clear();
        tracing::info!(message_id = %message.id, sender = user_id, receiver = %new.receiver_id, "message sent");

        let refreshed = load_thread(store, user_id, &new.receiver_id);
        Ok(Sent { message, refreshed })
    }
}
