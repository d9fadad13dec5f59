//! Command handler implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::types::{BotCommand, CommandResult, Reply};
use crate::config::{BotConfig, ConfigStore, RuntimeSettings};
use crate::revolt::{MessageEvent, Platform, SendableEmbed, UserProfile};
use crate::scheduler::SchedulerMessage;

const HELLO_TEXT: &str = "Hello there! 👋";
const HELP_TITLE: &str = "Revolt.chat Selfbot - Bot Help";
const HELP_COLOUR: &str = "#ff5733";
const HELP_FAILED: &str = "Failed to display help. Check logs for details.";
const USERINFO_TITLE: &str = "Revolt.chat Selfbot - User Info";
const USERINFO_COLOUR: &str = "#3498db";
const USERINFO_FAILED: &str = "Failed to fetch user info.";
const USERINFO_SEND_FAILED: &str = "Failed to send user info. Check logs for details.";
const NO_BIO: &str = "No bio available";

/// Parses self-authored messages and runs the matching command.
pub struct CommandHandler {
    platform: Arc<dyn Platform>,
    store: Arc<ConfigStore>,
    settings: RuntimeSettings,
    rotation: Option<mpsc::Sender<SchedulerMessage>>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(
        platform: Arc<dyn Platform>,
        store: Arc<ConfigStore>,
        settings: RuntimeSettings,
    ) -> Self {
        Self {
            platform,
            store,
            settings,
            rotation: None,
        }
    }

    /// Restarts username rotation through `rotation` after `reloadnames`.
    #[must_use]
    pub fn with_rotation_control(mut self, rotation: mpsc::Sender<SchedulerMessage>) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Handles one inbound message.
    ///
    /// Returns `None` if the message was not written by `self_id` or is not a
    /// command. Otherwise the reply has already been posted when this returns.
    pub async fn handle_message(
        &self,
        message: &MessageEvent,
        self_id: &str,
    ) -> Option<CommandResult> {
        if message.author != self_id {
            return None;
        }

        // Empty messages never reach the config file.
        if message.text().trim().is_empty() {
            return None;
        }

        let config = self.store.current().await;
        let command = BotCommand::parse(message.text(), &config.prefix)?;

        debug!("Handling command: {}", command);
        let result = self.execute(command, &config, &message.channel).await;
        self.deliver(&message.channel, &result).await;
        info!("Command result: success={}", result.success);

        Some(result)
    }

    /// Runs a parsed command against a configuration snapshot.
    async fn execute(&self, command: BotCommand, config: &BotConfig, channel: &str) -> CommandResult {
        match command {
            BotCommand::Help => handle_help(config),
            BotCommand::Hello => CommandResult::success(HELLO_TEXT),
            BotCommand::UserInfo(args) => self.handle_userinfo(&args, config, channel).await,
            BotCommand::Username(args) => self.handle_username(&args, config).await,
            BotCommand::ReloadNames => self.handle_reload_names(),
            BotCommand::CustomStatus(args) => self.handle_custom_status(&args, config).await,
            BotCommand::Unknown(name) => {
                CommandResult::error(format!("Unknown command: {name}"))
            }
        }
    }

    async fn handle_userinfo(&self, args: &str, config: &BotConfig, channel: &str) -> CommandResult {
        let user_id = args
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_matches(|c| matches!(c, '<' | '@' | '>'));

        if user_id.is_empty() {
            return CommandResult::error(format!(
                "Usage: {}userinfo <mention or user id>",
                config.prefix
            ));
        }

        self.platform.begin_typing(channel).await;
        let fetched = self.platform.fetch_profile(user_id).await;
        self.platform.end_typing(channel).await;

        match fetched {
            Ok(profile) => {
                let description = render_profile(user_id, &profile, &self.settings);
                CommandResult::embed(
                    "",
                    SendableEmbed::new(USERINFO_TITLE, description, USERINFO_COLOUR),
                    Some(USERINFO_SEND_FAILED.to_owned()),
                )
            }
            Err(e) => {
                error!("Failed to fetch profile of {}: {}", user_id, e);
                CommandResult::error(USERINFO_FAILED)
            }
        }
    }

    async fn handle_username(&self, args: &str, config: &BotConfig) -> CommandResult {
        let name = args.trim();
        if name.is_empty() {
            return CommandResult::error(format!("Usage: {}username <new_name>", config.prefix));
        }

        match self.platform.set_display_name(name).await {
            Ok(()) => CommandResult::success(format!("Display name changed to **{name}**")),
            Err(e) => {
                error!("Failed to change display name: {}", e);
                CommandResult::error(format!("Failed to change display name: {e}"))
            }
        }
    }

    fn handle_reload_names(&self) -> CommandResult {
        let path = self.store.usernames_path().display();
        match self.store.usernames() {
            Ok(names) if names.is_empty() => {
                CommandResult::error(format!("No usernames found in {path}."))
            }
            Ok(names) => {
                info!("Reloaded {} usernames", names.len());
                if let Some(rotation) = &self.rotation
                    && let Err(e) = rotation.try_send(SchedulerMessage::Reload)
                {
                    debug!("Could not restart username rotation: {}", e);
                }
                CommandResult::success(format!("Reloaded {} username(s).", names.len()))
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path, e);
                CommandResult::error(format!("No usernames found in {path}."))
            }
        }
    }

    async fn handle_custom_status(&self, args: &str, config: &BotConfig) -> CommandResult {
        let text = args.trim();
        if text.is_empty() {
            return CommandResult::error(format!("Usage: {}customstatus <text>", config.prefix));
        }

        let presence = match config.status_presence() {
            Ok(presence) => presence,
            Err(e) => return CommandResult::error(e.to_string()),
        };

        match self.platform.set_presence(text, presence).await {
            Ok(()) => CommandResult::success(format!("Custom status set to **{text}** ({presence})")),
            Err(e) => {
                error!("Failed to set custom status: {}", e);
                CommandResult::error(format!("Failed to set custom status: {e}"))
            }
        }
    }

    /// Posts the reply. Send failures are logged and never propagated.
    async fn deliver(&self, channel: &str, result: &CommandResult) {
        match &result.reply {
            Reply::Text(text) => {
                if let Err(e) = self.platform.send_message(channel, text, None).await {
                    error!("Failed to send reply: {}", e);
                }
            }
            Reply::Embed {
                content,
                embed,
                fallback,
            } => {
                let Err(e) = self
                    .platform
                    .send_message(channel, content, Some(embed.clone()))
                    .await
                else {
                    return;
                };

                error!("Failed to send embed: {}", e);
                if let Some(fallback) = fallback
                    && let Err(e) = self.platform.send_message(channel, fallback, None).await
                {
                    error!("Failed to send fallback reply: {}", e);
                }
            }
        }
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Builds the help embed from the configured command descriptions.
fn handle_help(config: &BotConfig) -> CommandResult {
    let lines = config
        .commands
        .iter()
        .map(|(name, desc)| format!("**{name}**: {desc}"))
        .collect::<Vec<_>>()
        .join("\n");

    CommandResult::embed(
        "Here's the help information:",
        SendableEmbed::new(
            HELP_TITLE,
            format!("Here are the available commands:\n\n{lines}"),
            HELP_COLOUR,
        ),
        Some(HELP_FAILED.to_owned()),
    )
}

/// Formats the `userinfo` embed body.
fn render_profile(user_id: &str, profile: &UserProfile, settings: &RuntimeSettings) -> String {
    let bio = profile.bio().unwrap_or(NO_BIO);
    let mut description = format!("User: <@{user_id}>\n\nUser description:\n\n`{bio}`");

    if let Some(background) = profile.background_id() {
        description.push_str("\n\nBanner URL: ");
        description.push_str(&settings.banner_url(background));
    }

    description
}
