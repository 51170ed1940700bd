pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
      user_id TEXT PRIMARY KEY,
      full_name TEXT,
      role TEXT NOT NULL DEFAULT 'student'
        CHECK (role IN ('student', 'alumni', 'faculty', 'admin')),
      email TEXT,
      created_at INTEGER NOT NULL,
      updated_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS messages (
      id TEXT PRIMARY KEY,
      sender_id TEXT NOT NULL,
      receiver_id TEXT NOT NULL,
      content TEXT NOT NULL CHECK (length(trim(content)) > 0),
      read INTEGER NOT NULL DEFAULT 0,
      created_at INTEGER NOT NULL,
      updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_messages_sender_created
      ON messages(sender_id, created_at DESC);
    CREATE INDEX IF NOT EXISTS idx_messages_receiver_created
      ON messages(receiver_id, created_at DESC);
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_messages_unread
      ON messages(receiver_id, sender_id, read);
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS trg_messages_read_updated_at
    AFTER UPDATE OF read ON messages
    FOR EACH ROW
    WHEN NEW.read != OLD.read
    BEGIN
      UPDATE messages
      SET updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
      WHERE id = NEW.id;
    END;
    "#,
];
