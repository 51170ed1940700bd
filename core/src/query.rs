use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::models::{Message, NewMessage, ParticipantProfile};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, content, read, created_at, updated_at";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        content: row.get(3)?,
        read: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Every message the user sent or received, newest first.
pub fn list_messages_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Message>, CoreError> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} \
         FROM messages \
         WHERE sender_id = ?1 OR receiver_id = ?1 \
         ORDER BY created_at DESC, id DESC;"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], message_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Both directions between `user_id` and `counterpart_id`, oldest first.
pub fn list_thread(
    conn: &Connection,
    user_id: &str,
    counterpart_id: &str,
) -> Result<Vec<Message>, CoreError> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} \
         FROM messages \
         WHERE (sender_id = ?1 AND receiver_id = ?2) \
            OR (sender_id = ?2 AND receiver_id = ?1) \
         ORDER BY created_at ASC, id ASC;"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, counterpart_id], message_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get_message(conn: &Connection, message_id: &str) -> Result<Message, CoreError> {
    let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1;");
    conn.query_row(&sql, params![message_id], message_from_row)
        .optional()?
        .ok_or_else(|| CoreError::NotFound(format!("message {message_id}")))
}

pub fn lookup_profiles(conn: &Connection, user_ids: &[String]) -> Result<Vec<ParticipantProfile>, CoreError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = std::iter::repeat("?")
        .take(user_ids.len())
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT user_id, full_name, role, email \
         FROM profiles \
         WHERE user_id IN ({}) \
         ORDER BY user_id ASC;",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(user_ids.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut profiles = Vec::with_capacity(user_ids.len());
    for row in rows {
        let (user_id, full_name, role, email) = row?;
        profiles.push(ParticipantProfile {
            user_id,
            full_name,
            role: role.parse()?,
            email,
        });
    }
    Ok(profiles)
}

pub fn upsert_profile(conn: &Connection, profile: &ParticipantProfile) -> Result<(), CoreError> {
    let now = now_millis();
    conn.execute(
        "INSERT INTO profiles (user_id, full_name, role, email, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
         ON CONFLICT(user_id) DO UPDATE SET \
           full_name = excluded.full_name, \
           role = excluded.role, \
           email = excluded.email, \
           updated_at = excluded.updated_at;",
        params![
            profile.user_id,
            profile.full_name,
            profile.role.as_str(),
            profile.email,
            now
        ],
    )?;
    Ok(())
}

/// Flips every unread message from `counterpart_id` to `user_id`. Returns the
/// number of rows changed.
pub fn mark_thread_read(conn: &Connection, user_id: &str, counterpart_id: &str) -> Result<usize, CoreError> {
    let changed = conn.execute(
        "UPDATE messages SET read = 1 \
         WHERE sender_id = ?1 AND receiver_id = ?2 AND read = 0;",
        params![counterpart_id, user_id],
    )?;
    Ok(changed)
}

pub fn insert_message(conn: &Connection, new: &NewMessage) -> Result<Message, CoreError> {
    insert_message_at(conn, new, now_millis())
}

/// Inserts with an explicit timestamp. Content is stored trimmed.
pub fn insert_message_at(conn: &Connection, new: &NewMessage, created_at: i64) -> Result<Message, CoreError> {
    let content = new.content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyContent.into());
    }
    if new.sender_id.is_empty() || new.receiver_id.is_empty() {
        return Err(CoreError::InvalidArgument("sender and receiver are required".to_string()));
    }
    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender_id: new.sender_id.clone(),
        receiver_id: new.receiver_id.clone(),
        content: content.to_string(),
        read: false,
        created_at,
        updated_at: created_at,
    };
    conn.execute(
        "INSERT INTO messages (id, sender_id, receiver_id, content, read, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6);",
        params![
            message.id,
            message.sender_id,
            message.receiver_id,
            message.content,
            message.created_at,
            message.updated_at
        ],
    )?;
    Ok(message)
}

pub fn unread_total(conn: &Connection, user_id: &str) -> Result<i64, CoreError> {
    let count = conn.query_row(
        "SELECT COUNT(1) FROM messages WHERE receiver_id = ?1 AND read = 0;",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
