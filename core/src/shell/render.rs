use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::models::{Conversation, Message};

pub const LOADING_CONVERSATIONS: &str = "Loading conversations...";
pub const NO_CONVERSATIONS: &str = "No conversations yet";
pub const START_CONVERSATION: &str = "Start a conversation";
pub const SENDING: &str = "Sending...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadItem<'a> {
    DateSeparator(NaiveDate),
    Message(&'a Message),
}

/// Interleaves date headers into an oldest-first thread. A header precedes
/// the first message and every message whose calendar date in `tz` differs
/// from the one before it.
pub fn with_date_separators<'a, Tz: TimeZone>(messages: &'a [Message], tz: &Tz) -> Vec<ThreadItem<'a>> {
    let mut items = Vec::with_capacity(messages.len() + 1);
    let mut previous: Option<NaiveDate> = None;
    for message in messages {
        let date = message
            .created_at_utc()
            .map(|ts| ts.with_timezone(tz).date_naive());
        if let Some(date) = date {
            if previous != Some(date) {
                items.push(ThreadItem::DateSeparator(date));
                previous = Some(date);
            }
        }
        items.push(ThreadItem::Message(message));
    }
    items
}

/// `"3:07 PM"` style clock time.
pub fn format_time<Tz>(created_at: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp_millis(created_at) {
        Some(ts) => ts.with_timezone(tz).format("%-I:%M %p").to_string(),
        None => String::new(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Avatar initials: the first letter of each word, upper-cased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn preview(conversation: &Conversation) -> &str {
    if conversation.last_message.is_empty() {
        START_CONVERSATION
    } else {
        &conversation.last_message
    }
}
