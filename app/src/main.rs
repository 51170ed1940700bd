use std::fs;
use std::path::{Path, PathBuf};

use alumni_link_core::diagnostics::{self, kind};
use alumni_link_core::models::{CurrentUser, ParticipantProfile, Role};
use alumni_link_core::query::{get_message, unread_total, upsert_profile};
use alumni_link_core::shell::render::{format_date, format_time, initials, preview};
use alumni_link_core::shell::{Notice, NoticeLevel, Recipient, ThreadItem};
use alumni_link_core::{open_store, seed, CoreError, MessagingConfig, MessagingSession, SqliteStore};
use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alumni-link", about = "Direct messages between alumni, students, and faculty")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Message store path; overrides the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert demo profiles and messages
    Seed,
    /// Create or update a participant profile
    Profile {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "student")]
        role: Role,
        #[arg(long)]
        email: Option<String>,
    },
    /// List conversations, newest activity first
    Conversations {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "student")]
        role: Role,
        #[arg(long)]
        pretty: bool,
    },
    /// Show the thread with one counterpart and mark it read
    Thread {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "student")]
        role: Role,
        #[arg(long = "with")]
        counterpart: String,
        /// Display name to use if there is no conversation yet
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Send a message
    Send {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "student")]
        role: Role,
        #[arg(long)]
        to: String,
        #[arg(long)]
        content: String,
    },
    /// Count unread messages addressed to a user
    Unread {
        #[arg(long)]
        user: String,
    },
    /// Print the diagnostics log
    Diagnostics,
    /// Delete the message store
    Reset,
}

#[derive(Serialize)]
struct UnreadSummary<'a> {
    user_id: &'a str,
    unread: i64,
}

fn init_logging(config: &MessagingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn with_store<F, T>(db_path: &Path, log_dir: &Path, action: &str, f: F) -> Result<T, CoreError>
where
    F: FnOnce(&SqliteStore) -> Result<T, CoreError>,
{
    let result = open_store(db_path).and_then(|store| f(&store));
    if let Err(ref err) = result {
        let _ = diagnostics::log_event(log_dir, kind::QUERY_ERROR, &format!("{action} failed: {err}"));
    }
    result
}

/// Writes notices to stderr. Fails when any of them is an error.
fn flush_notices(notices: Vec<Notice>) -> anyhow::Result<()> {
    let mut failed = None;
    for notice in notices {
        eprintln!("{}: {}", notice.title, notice.description);
        if notice.level == NoticeLevel::Error {
            failed = Some(notice.description);
        }
    }
    match failed {
        Some(description) => bail!(description),
        None => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_thread(session: &MessagingSession<&SqliteStore>) {
    let Some(selected) = session.selected() else {
        return;
    };
    println!("{} ({}) [{}]", selected.counterpart_name, selected.counterpart_role, initials(&selected.counterpart_name));
    if let Some(placeholder) = session.thread_placeholder() {
        println!("  {placeholder}");
        return;
    }
    for item in session.thread_items(&Local) {
        match item {
            ThreadItem::DateSeparator(date) => println!("-- {} --", format_date(date)),
            ThreadItem::Message(message) => {
                let author = if message.sender_id == session.user().id {
                    "You"
                } else {
                    selected.counterpart_name.as_str()
                };
                println!("[{}] {}: {}", format_time(message.created_at, &Local), author, message.content);
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = MessagingConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config);
    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());
    let log_dir = config.log_dir.clone();
    tracing::debug!(db = %db_path.display(), "using message store");

    match cli.command {
        Command::Seed => {
            with_store(&db_path, &log_dir, "seed", |store| seed::seed_demo(&store.conn))?;
            println!("seeded demo data into {}", db_path.display());
        }
        Command::Profile { user, name, role, email } => {
            let profile = ParticipantProfile {
                user_id: user,
                full_name: name,
                role,
                email,
            };
            with_store(&db_path, &log_dir, "upsert profile", |store| upsert_profile(&store.conn, &profile))?;
            print_json(&profile)?;
        }
        Command::Conversations { user, role, pretty } => {
            let store = open_store(&db_path)?;
            let mut session = MessagingSession::with_config(&store, CurrentUser { id: user, role }, &config);
            session.open(None);
            if pretty {
                if let Some(placeholder) = session.list_placeholder() {
                    println!("{placeholder}");
                }
                for conversation in session.conversations() {
                    let badge = match conversation.unread_count {
                        0 => String::new(),
                        n => format!(" ({n} unread)"),
                    };
                    println!(
                        "{} [{}]{}: {}",
                        conversation.counterpart_name,
                        conversation.counterpart_role,
                        badge,
                        preview(conversation)
                    );
                }
            } else {
                print_json(&session.conversations())?;
            }
            flush_notices(session.take_notices())?;
        }
        Command::Thread { user, role, counterpart, name, pretty } => {
            let store = open_store(&db_path)?;
            let mut session = MessagingSession::with_config(&store, CurrentUser { id: user, role }, &config);
            let recipient = name.map(|name| Recipient {
                id: counterpart.clone(),
                name,
            });
            match recipient {
                Some(recipient) => session.open(Some(recipient)),
                None => {
                    session.open(None);
                    session.select(&counterpart);
                }
            }
            if pretty {
                print_thread(&session);
            } else {
                print_json(&session.thread())?;
            }
            flush_notices(session.take_notices())?;
        }
        Command::Send { user, role, to, content } => {
            let store = open_store(&db_path)?;
            let mut session = MessagingSession::with_config(&store, CurrentUser { id: user, role }, &config);
            session.select(&to);
            session.set_draft(content);
            if !session.can_send() {
                bail!("message content is empty");
            }
            let sent = session.send();
            flush_notices(session.take_notices())?;
            if let Some(sent) = sent {
                print_json(&get_message(&store.conn, &sent.id)?)?;
            }
        }
        Command::Unread { user } => {
            let unread = with_store(&db_path, &log_dir, "unread total", |store| unread_total(&store.conn, &user))?;
            print_json(&UnreadSummary { user_id: &user, unread })?;
        }
        Command::Diagnostics => {
            let path = log_dir.join("diagnostics.log");
            if !path.exists() {
                println!("No diagnostics available.");
            } else {
                print!("{}", fs::read_to_string(&path)?);
            }
        }
        Command::Reset => {
            for suffix in ["", "-wal", "-shm"] {
                let mut name = db_path.clone().into_os_string();
                name.push(suffix);
                let path = PathBuf::from(name);
                if path.exists() {
                    fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
                }
            }
            println!("removed {}", db_path.display());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}
