//! Command types and definitions.

use std::fmt;

use crate::revolt::SendableEmbed;

/// Names the dispatcher recognises, matched case-sensitively.
pub const KNOWN_COMMANDS: [&str; 6] = [
    "help",
    "hello",
    "userinfo",
    "username",
    "reloadnames",
    "customstatus",
];

/// A prefixed message split into command name and argument remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// Splits a message into name and arguments.
    ///
    /// Returns `None` when the trimmed text does not start with `prefix`.
    /// Only the first whitespace run separates the name from the arguments;
    /// whitespace inside the arguments is kept.
    #[must_use]
    pub fn parse(text: &'a str, prefix: &str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }

        let after_prefix = text.trim().strip_prefix(prefix)?.trim_start();

        let (name, args) = match after_prefix.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim_start()),
            None => (after_prefix, ""),
        };

        Some(Self { name, args })
    }
}

/// Commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// List configured command descriptions.
    Help,

    /// Reply with a greeting.
    Hello,

    /// Show a user's bio and banner. Carries the raw argument.
    UserInfo(String),

    /// Change the display name.
    Username(String),

    /// Re-read the username rotation list.
    ReloadNames,

    /// Push a custom status text.
    CustomStatus(String),

    /// Anything else after the prefix.
    Unknown(String),
}

impl BotCommand {
    /// Parses a command from message text.
    ///
    /// Returns `None` if the message is not addressed to the bot.
    #[must_use]
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        CommandInvocation::parse(text, prefix).map(Self::from_invocation)
    }

    /// Maps an invocation to a command. Argument validation is left to the handlers.
    #[must_use]
    pub fn from_invocation(invocation: CommandInvocation<'_>) -> Self {
        let args = invocation.args.to_owned();
        match invocation.name {
            "help" => Self::Help,
            "hello" => Self::Hello,
            "userinfo" => Self::UserInfo(args),
            "username" => Self::Username(args),
            "reloadnames" => Self::ReloadNames,
            "customstatus" => Self::CustomStatus(args),
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Returns the command name as typed by the user.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Help => "help",
            Self::Hello => "hello",
            Self::UserInfo(_) => "userinfo",
            Self::Username(_) => "username",
            Self::ReloadNames => "reloadnames",
            Self::CustomStatus(_) => "customstatus",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserInfo(args) | Self::Username(args) | Self::CustomStatus(args)
                if !args.is_empty() =>
            {
                write!(f, "{} {args}", self.name())
            }
            Self::Unknown(name) => write!(f, "unknown({name})"),
            _ => f.write_str(self.name()),
        }
    }
}

/// What to post back to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message.
    Text(String),

    /// Message with an embed; `fallback` is sent as text if posting fails.
    Embed {
        content: String,
        embed: SendableEmbed,
        fallback: Option<String>,
    },
}

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command did what was asked.
    pub success: bool,

    /// Response to post in the channel.
    pub reply: Reply,
}

impl CommandResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            reply: Reply::Text(message.into()),
        }
    }

    /// Creates a failed text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            reply: Reply::Text(message.into()),
        }
    }

    /// Creates a successful embed result.
    #[must_use]
    pub fn embed(
        content: impl Into<String>,
        embed: SendableEmbed,
        fallback: Option<String>,
    ) -> Self {
        Self {
            success: true,
            reply: Reply::Embed {
                content: content.into(),
                embed,
                fallback,
            },
        }
    }
}
