//! Chat command parsing and handling.
//!
//! Commands are plain messages written by the account itself, starting with
//! the prefix from `config.json` (e.g. `!help`).

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{BotCommand, CommandInvocation, CommandResult, KNOWN_COMMANDS, Reply};
