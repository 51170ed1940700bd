pub mod composer;
pub mod config;
pub mod conversations;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod query;
pub mod seed;
pub mod shell;
pub mod store;
pub mod thread;
mod migrations;

pub use composer::Composer;
pub use config::MessagingConfig;
pub use conversations::load_conversations;
pub use db::{open_in_memory, open_store, SqliteStore};
pub use error::{CoreError, ValidationError};
pub use shell::MessagingSession;
pub use store::MessageStore;
pub use thread::load_thread;
