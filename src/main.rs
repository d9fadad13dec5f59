//! Revolt Selfbot - Main Entry Point
//!
//! Connects to Revolt as a user account, answers commands written by that
//! account, and runs the username rotation and status refresh loops.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use revolt_selfbot::commands::CommandHandler;
use revolt_selfbot::config::{
    BotConfig, ConfigStore, DEFAULT_CONFIG_PATH, DEFAULT_USERNAMES_PATH, RuntimeSettings,
    UsernameList,
};
use revolt_selfbot::revolt::{
    Gateway, GatewayConfig, Platform, RestClient, RevoltPlatform, ServerEvent,
};
use revolt_selfbot::scheduler::{
    PeriodicTask, SchedulerMessage, StatusRefresher, UsernameRotator, run_periodic,
};

/// Revolt selfbot with chat commands, username rotation and custom status.
#[derive(Parser, Debug)]
#[command(name = "revolt_selfbot")]
#[command(about = "Personal automation bot for Revolt")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Path to the username rotation list.
    #[arg(short, long, default_value = DEFAULT_USERNAMES_PATH)]
    usernames: PathBuf,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// A spawned periodic task and its control channel.
struct BackgroundTask {
    tx: mpsc::Sender<SchedulerMessage>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    fn spawn<T: PeriodicTask + 'static>(
        task: T,
        (tx, rx): (mpsc::Sender<SchedulerMessage>, mpsc::Receiver<SchedulerMessage>),
    ) -> Self {
        let handle = tokio::spawn(run_periodic(task, rx));
        Self { tx, handle }
    }

    async fn stop(self) {
        let _ = self.tx.send(SchedulerMessage::Shutdown).await;
        if let Err(e) = self.handle.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let settings = RuntimeSettings::from_env_with_defaults();

    let mut config = BotConfig::load_or_create(&args.config).unwrap_or_else(|e| {
        error!("Error loading {}: {}", args.config.display(), e);
        BotConfig::fallback()
    });

    if let Some(token) = &settings.token_override {
        config.token.clone_from(token);
    }

    if !config.has_usable_token() {
        error!(
            "Please edit {} and set your token (or set REVOLT_TOKEN)",
            args.config.display()
        );
        bail!("No usable session token configured");
    }

    match UsernameList::load_or_create(&args.usernames) {
        Ok(names) => info!("Loaded {} usernames", names.len()),
        Err(e) => warn!("Could not load {}: {}", args.usernames.display(), e),
    }

    info!("Using command prefix: {}", config.prefix);

    let token = config.token.clone();
    let rest = RestClient::new(&settings, token.as_str()).context("Failed to build HTTP client")?;

    let (gateway, mut events) = Gateway::connect(GatewayConfig {
        url: settings.ws_url.clone(),
        token,
        connect_timeout: settings.request_timeout(),
    })
    .await
    .context("Failed to connect to Revolt gateway")?;

    let platform = Arc::new(RevoltPlatform::new(
        rest,
        gateway.sender(),
        settings.min_profile_update_secs,
    ));
    let store = Arc::new(ConfigStore::new(&args.config, &args.usernames, config));

    // The rotation loop starts on `Ready`; `reloadnames` can queue on it before then.
    let (rotation_tx, rotation_rx) = mpsc::channel(8);
    let mut rotation_rx = Some(rotation_rx);

    let handler = Arc::new(
        CommandHandler::new(
            Arc::clone(&platform) as Arc<dyn Platform>,
            Arc::clone(&store),
            settings.clone(),
        )
        .with_rotation_control(rotation_tx.clone()),
    );

    let mut background: Vec<BackgroundTask> = Vec::new();

    info!("Bot is running. Use Ctrl+C to stop.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("Gateway connection lost");
                    break;
                };

                match event {
                    ServerEvent::Authenticated => info!("Authenticated with Revolt"),
                    ServerEvent::Ready { users, servers } => {
                        let Some(me) = platform.resolve_self(&users).await else {
                            error!("Could not determine own account id, commands are disabled");
                            continue;
                        };

                        platform.set_self_id(me.id.as_str());
                        info!(
                            "Logged in as user: {} ({}), {} servers",
                            me.shown_name(),
                            me.id,
                            servers.len()
                        );

                        if let Some(rotation_rx) = rotation_rx.take() {
                            let shared = Arc::clone(&platform) as Arc<dyn Platform>;
                            background.push(BackgroundTask::spawn(
                                UsernameRotator::new(Arc::clone(&shared), Arc::clone(&store)),
                                (rotation_tx.clone(), rotation_rx),
                            ));
                            background.push(BackgroundTask::spawn(
                                StatusRefresher::new(
                                    shared,
                                    Arc::clone(&store),
                                    settings.status_refresh_interval(),
                                ),
                                mpsc::channel(8),
                            ));
                        }
                    }
                    ServerEvent::Message(message) => {
                        let Some(self_id) = platform.self_id() else {
                            continue;
                        };
                        if message.author != self_id {
                            continue;
                        }

                        // Handlers may wait on the network; keep the receive loop free.
                        let self_id = self_id.to_owned();
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            handler.handle_message(&message, &self_id).await;
                        });
                    }
                    ServerEvent::Error { error } => error!("Gateway error: {}", error),
                    ServerEvent::Ping { .. } | ServerEvent::Unknown => {}
                }
            }
        }
    }

    // Cleanup
    info!("Shutting down...");
    for task in background {
        task.stop().await;
    }
    gateway.close().await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
