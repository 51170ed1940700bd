pub mod render;

use std::path::PathBuf;

use chrono::TimeZone;
use serde::Serialize;

use crate::composer::Composer;
use crate::config::MessagingConfig;
use crate::conversations::{load_conversations, ProfileFallback};
use crate::diagnostics::{self, kind};
use crate::error::CoreError;
use crate::models::{Conversation, CurrentUser, Message, NewMessage};
use crate::store::MessageStore;
use crate::thread::load_thread;

pub use render::{with_date_separators, ThreadItem};

/// Role label used when a thread is opened directly on a recipient that has
/// no conversation yet.
pub const DIRECT_RECIPIENT_ROLE: &str = "mentor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    List,
    Thread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn error(description: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: description.to_string(),
        }
    }

    fn success(description: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            description: description.to_string(),
        }
    }
}

/// A counterpart to open a thread with before any conversation exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub name: String,
}

/// State behind the messaging panel: the conversation list, the active
/// thread and its draft, and pending notices.
///
/// Every store round trip is a plain call; a failure leaves the previous state
/// in place and queues a notice.
pub struct MessagingSession<S: MessageStore> {
    store: S,
    user: CurrentUser,
    fallback: ProfileFallback,
    log_dir: Option<PathBuf>,
    view: View,
    loading: bool,
    sending: bool,
    conversations: Vec<Conversation>,
    selected: Option<Conversation>,
    thread: Vec<Message>,
    composer: Composer,
    notices: Vec<Notice>,
}

impl<S: MessageStore> MessagingSession<S> {
    pub fn new(store: S, user: CurrentUser) -> Self {
        Self {
            store,
            user,
            fallback: ProfileFallback::default(),
            log_dir: None,
            view: View::List,
            loading: false,
            sending: false,
            conversations: Vec::new(),
            selected: None,
            thread: Vec::new(),
            composer: Composer::new(),
            notices: Vec::new(),
        }
    }

    pub fn with_config(store: S, user: CurrentUser, config: &MessagingConfig) -> Self {
        let mut session = Self::new(store, user);
        session.fallback = config.fallback();
        session.log_dir = Some(config.log_dir.clone());
        session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.as_ref()
    }

    pub fn thread(&self) -> &[Message] {
        &self.thread
    }

    pub fn draft(&self) -> &str {
        self.composer.draft()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.composer.set_draft(text);
    }

    pub fn can_send(&self) -> bool {
        !self.sending && self.composer.can_send(self.selected_id())
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Loads the conversation list and, when given a recipient, opens the
    /// thread with them straight away.
    pub fn open(&mut self, recipient: Option<Recipient>) {
        self.refresh_conversations();
        if let Some(recipient) = recipient {
            let conversation = self
                .conversations
                .iter()
                .find(|c| c.counterpart_id == recipient.id)
                .cloned()
                .unwrap_or_else(|| Conversation {
                    counterpart_id: recipient.id,
                    counterpart_name: recipient.name,
                    counterpart_role: DIRECT_RECIPIENT_ROLE.to_string(),
                    last_message: String::new(),
                    last_message_at: None,
                    unread_count: 0,
                });
            self.activate(conversation);
        }
    }

    pub fn refresh_conversations(&mut self) {
        self.begin_refresh();
        let result = load_conversations(&self.store, &self.user.id, &self.fallback);
        self.finish_refresh(result);
    }

    /// Marks the list as loading. Pair with [`finish_refresh`](Self::finish_refresh)
    /// when the fetch runs elsewhere.
    pub fn begin_refresh(&mut self) {
        self.loading = true;
    }

    /// Applies a conversation fetch. Whichever result arrives last wins.
    pub fn finish_refresh(&mut self, result: Result<Vec<Conversation>, CoreError>) {
        self.loading = false;
        match result {
            Ok(conversations) => self.conversations = conversations,
            Err(err) => self.report(kind::QUERY_ERROR, "load conversations", &err, "Failed to load conversations"),
        }
    }

    /// Opens the thread with `counterpart_id`. Unknown counterparts get the
    /// fallback labels.
    pub fn select(&mut self, counterpart_id: &str) {
        let conversation = self
            .conversations
            .iter()
            .find(|c| c.counterpart_id == counterpart_id)
            .cloned()
            .unwrap_or_else(|| Conversation {
                counterpart_id: counterpart_id.to_string(),
                counterpart_name: self.fallback.name.clone(),
                counterpart_role: self.fallback.role.clone(),
                last_message: String::new(),
                last_message_at: None,
                unread_count: 0,
            });
        self.activate(conversation);
    }

    /// Returns to the conversation list. The draft is kept.
    pub fn back(&mut self) {
        self.view = View::List;
        self.selected = None;
        self.thread.clear();
    }

    /// Sends the draft to the selected counterpart and returns the stored
    /// message. Validation failures and insert errors return `None`.
    pub fn send(&mut self) -> Option<Message> {
        let new = self.begin_send()?;
        let result = self.store.insert(&new);
        self.finish_send(result)
    }

    /// Validates the draft and marks the session as sending. Pair with
    /// [`finish_send`](Self::finish_send) when the insert runs elsewhere.
    ///
    /// Returns `None` without changing state while a send is in flight or when
    /// the draft cannot be sent.
    pub fn begin_send(&mut self) -> Option<NewMessage> {
        if self.sending {
            return None;
        }
        let new = self.composer.prepare(&self.user.id, self.selected_id()).ok()?;
        self.sending = true;
        Some(new)
    }

    /// Applies an insert result. On success the draft is cleared and the
    /// thread reloaded; on failure the draft is kept for a retry.
    pub fn finish_send(&mut self, result: Result<Message, CoreError>) -> Option<Message> {
        self.sending = false;
        match result {
            Ok(message) => {
                self.composer.clear();
                tracing::info!(message_id = %message.id, sender = %message.sender_id, receiver = %message.receiver_id, "message sent");
                self.notices.push(Notice::success("Message sent!"));
                if self.selected_id() == Some(message.receiver_id.as_str()) {
                    match load_thread(&self.store, &self.user.id, &message.receiver_id) {
                        Ok(thread) => self.thread = thread,
                        Err(err) => self.report(kind::QUERY_ERROR, "reload thread", &err, "Failed to load messages"),
                    }
                }
                Some(message)
            }
            Err(err) => {
                self.report(kind::MUTATION_ERROR, "send message", &err, "Failed to send message");
                None
            }
        }
    }

    pub fn thread_items<Tz: TimeZone>(&self, tz: &Tz) -> Vec<ThreadItem<'_>> {
        with_date_separators(&self.thread, tz)
    }

    /// Placeholder text for the conversation list, if any applies.
    pub fn list_placeholder(&self) -> Option<&'static str> {
        if self.loading {
            Some(render::LOADING_CONVERSATIONS)
        } else if self.conversations.is_empty() {
            Some(render::NO_CONVERSATIONS)
        } else {
            None
        }
    }

    /// Placeholder text for the thread pane, if any applies.
    pub fn thread_placeholder(&self) -> Option<&'static str> {
        match (&self.selected, self.thread.is_empty()) {
            (Some(_), true) => Some(render::START_CONVERSATION),
            _ => None,
        }
    }

    /// Label for the send control while an insert is in flight.
    pub fn send_status(&self) -> Option<&'static str> {
        self.sending.then_some(render::SENDING)
    }

    fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|c| c.counterpart_id.as_str())
    }

    fn activate(&mut self, conversation: Conversation) {
        let switching = self.selected_id() != Some(conversation.counterpart_id.as_str());
        if switching {
            self.thread.clear();
        }
        let counterpart_id = conversation.counterpart_id.clone();
        self.selected = Some(conversation);
        self.view = View::Thread;

        match load_thread(&self.store, &self.user.id, &counterpart_id) {
            Ok(thread) => self.thread = thread,
            Err(err) => self.report(kind::QUERY_ERROR, "load thread", &err, "Failed to load messages"),
        }
    }

    fn report(&mut self, log_kind: &str, action: &str, err: &CoreError, description: &str) {
        tracing::error!(user_id = %self.user.id, error = %err, "{action} failed");
        if let Some(log_dir) = &self.log_dir {
            let _ = diagnostics::log_event(log_dir, log_kind, &format!("{action} failed: {err}"));
        }
        self.notices.push(Notice::error(description));
    }
}
