use rusqlite::Connection;

use crate::error::CoreError;
use crate::models::{NewMessage, ParticipantProfile, Role};
use crate::query::{insert_message_at, mark_thread_read, upsert_profile};

const DEMO_PROFILES: &[(&str, &str, Role)] = &[
    ("u-alumni", "Priya Natarajan", Role::Alumni),
    ("u-student", "Marcus Lee", Role::Student),
    ("u-faculty", "Dr. Helen Ortiz", Role::Faculty),
    ("u-admin", "Campus Admin", Role::Admin),
];

/// (sender, receiver, content, minutes after base)
const DEMO_MESSAGES: &[(&str, &str, &str, i64)] = &[
    ("u-student", "u-alumni", "Hi! I saw you work in data engineering.", 0),
    ("u-alumni", "u-student", "Happy to help. What are you working on?", 12),
    ("u-student", "u-alumni", "Applying for summer internships.", 25),
    ("u-faculty", "u-alumni", "Would you speak at the career panel?", 60 * 24),
    ("u-alumni", "u-faculty", "Sure, send me the details.", 60 * 24 + 30),
    ("u-admin", "u-alumni", "Your profile update was approved.", 60 * 48),
    ("u-student", "u-faculty", "Is the thesis deadline still Friday?", 60 * 49),
];

pub const DEMO_BASE_TS: i64 = 1_704_103_200_000; // 2024-01-01T10:00:00Z

/// Inserts demo profiles and a short history. The student's opening message
/// to the alumna is already read.
pub fn seed_demo(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch("BEGIN;")?;
    let result = (|| -> Result<(), CoreError> {
        for (user_id, name, role) in DEMO_PROFILES {
            upsert_profile(
                conn,
                &ParticipantProfile {
                    user_id: user_id.to_string(),
                    full_name: Some(name.to_string()),
                    role: *role,
                    email: None,
                },
            )?;
        }
        for (idx, (sender, receiver, content, minutes)) in DEMO_MESSAGES.iter().enumerate() {
            let new = NewMessage {
                sender_id: sender.to_string(),
                receiver_id: receiver.to_string(),
                content: content.to_string(),
            };
            insert_message_at(conn, &new, DEMO_BASE_TS + minutes * 60_000)?;
            if idx == 1 {
                mark_thread_read(conn, "u-alumni", "u-student")?;
            }
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT;")?;
            Ok(())
        }
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(err)
        }
    }
}
