use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::models::{Conversation, Message, ParticipantProfile};
use crate::store::MessageStore;

pub const UNKNOWN_NAME: &str = "Unknown User";
pub const UNKNOWN_ROLE: &str = "user";

/// Labels used for counterparts whose profile cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFallback {
    pub name: String,
    pub role: String,
}

impl Default for ProfileFallback {
    fn default() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            role: UNKNOWN_ROLE.to_string(),
        }
    }
}

/// Distinct counterparts in order of first appearance.
pub fn counterpart_ids(user_id: &str, messages: &[Message]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for message in messages {
        let other = message.counterpart_of(user_id);
        if seen.insert(other) {
            ids.push(other.to_string());
        }
    }
    ids
}

/// Folds a newest-first message list into one conversation per counterpart.
///
/// The first message seen for a counterpart supplies the preview, so the input
/// order matters. Unread counts only consider messages addressed to `user_id`.
/// Output keeps the order in which counterparts first appear.
pub fn fold_conversations(
    user_id: &str,
    messages: &[Message],
    profiles: &[ParticipantProfile],
    fallback: &ProfileFallback,
) -> Vec<Conversation> {
    let profile_map: HashMap<&str, &ParticipantProfile> =
        profiles.iter().map(|p| (p.user_id.as_str(), p)).collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut conversations: Vec<Conversation> = Vec::new();

    for message in messages {
        let other = message.counterpart_of(user_id);
        let slot = match index.get(other) {
            Some(slot) => *slot,
            None => {
                let profile = profile_map.get(other);
                let name = profile
                    .and_then(|p| p.full_name.as_deref())
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(fallback.name.as_str());
                let role = profile
                    .map(|p| p.role.as_str())
                    .unwrap_or(fallback.role.as_str());
                conversations.push(Conversation {
                    counterpart_id: other.to_string(),
                    counterpart_name: name.to_string(),
                    counterpart_role: role.to_string(),
                    last_message: message.content.clone(),
                    last_message_at: Some(message.created_at),
                    unread_count: 0,
                });
                index.insert(other, conversations.len() - 1);
                conversations.len() - 1
            }
        };
        if message.is_unread_for(user_id) {
            conversations[slot].unread_count += 1;
        }
    }

    conversations
}

pub fn load_conversations<S: MessageStore>(
    store: &S,
    user_id: &str,
    fallback: &ProfileFallback,
) -> Result<Vec<Conversation>, CoreError> {
    let messages = store.messages_for_user(user_id)?;
    if messages.is_empty() {
        return Ok(Vec::new());
    }
    let ids = counterpart_ids(user_id, &messages);
    let profiles = store.profiles_for(&ids)?;
    let conversations = fold_conversations(user_id, &messages, &profiles, fallback);
    tracing::debug!(
        user_id,
        messages = messages.len(),
        conversations = conversations.len(),
        "conversations aggregated"
    );
    Ok(conversations)
}
