//! Periodic task runner.
//!
//! Each task follows the same loop:
//! 1. Re-read configuration (and, for rotation, the username list)
//! 2. Perform one action if the feature is enabled
//! 3. Sleep for the delay the action returned
//!
//! Control messages are handled while sleeping and do not cut the sleep
//! short. Action errors are logged and the loop continues.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::RotationState;
use crate::config::ConfigStore;
use crate::revolt::Platform;

/// How often a disabled task checks whether it has been enabled.
const DISABLED_RECHECK: Duration = Duration::from_secs(60);

/// Messages that can be sent to a running task.
#[derive(Debug, Clone)]
pub enum SchedulerMessage {
    /// The underlying data was reloaded; reset any progress through it.
    Reload,
    /// Stop the task.
    Shutdown,
}

/// A fixed-interval background action.
#[async_trait]
pub trait PeriodicTask: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Performs one iteration and returns the delay before the next one.
    async fn tick(&mut self) -> Duration;

    /// Handles [`SchedulerMessage::Reload`].
    fn reload(&mut self) {}
}

/// Runs `task` until [`SchedulerMessage::Shutdown`] arrives or the channel closes.
pub async fn run_periodic<T: PeriodicTask>(mut task: T, mut rx: mpsc::Receiver<SchedulerMessage>) {
    info!("{} started", task.name());

    loop {
        let sleep = tokio::time::sleep(task.tick().await);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => break,
                msg = rx.recv() => match msg {
                    Some(SchedulerMessage::Reload) => {
                        debug!("{}: received reload message", task.name());
                        task.reload();
                    }
                    Some(SchedulerMessage::Shutdown) | None => {
                        info!("{} shutting down", task.name());
                        return;
                    }
                },
            }
        }
    }
}

/// Rotates the display name through `config/usernames.txt`.
pub struct UsernameRotator {
    platform: Arc<dyn Platform>,
    store: Arc<ConfigStore>,
    state: RotationState,
}

impl UsernameRotator {
    /// Creates a rotator starting at the first name.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, store: Arc<ConfigStore>) -> Self {
        Self {
            platform,
            store,
            state: RotationState::new(),
        }
    }
}

#[async_trait]
impl PeriodicTask for UsernameRotator {
    fn name(&self) -> &'static str {
        "Username rotation"
    }

    async fn tick(&mut self) -> Duration {
        let config = self.store.current().await;
        let Some(rotation) = config.username_rotation() else {
            debug!("Username rotation disabled");
            return DISABLED_RECHECK;
        };
        let delay = Duration::from_secs(rotation.delay.max(1));

        let names = match self.store.usernames() {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    "Could not read {}: {}",
                    self.store.usernames_path().display(),
                    e
                );
                return delay;
            }
        };

        let Some(name) = self.state.next_name(&names) else {
            warn!("Username list is empty, rotation paused");
            return delay;
        };

        if let Err(e) = self.platform.set_display_name(name).await {
            error!("Failed to rotate display name to \"{}\": {}", name, e);
        }

        delay
    }

    fn reload(&mut self) {
        self.state.reset();
        info!("Username rotation restarted from the first name");
    }
}

impl std::fmt::Debug for UsernameRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernameRotator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Keeps the configured custom status pushed.
pub struct StatusRefresher {
    platform: Arc<dyn Platform>,
    store: Arc<ConfigStore>,
    interval: Duration,
}

impl StatusRefresher {
    /// Creates a refresher pushing the status every `interval`.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, store: Arc<ConfigStore>, interval: Duration) -> Self {
        Self {
            platform,
            store,
            interval,
        }
    }
}

#[async_trait]
impl PeriodicTask for StatusRefresher {
    fn name(&self) -> &'static str {
        "Status refresh"
    }

    async fn tick(&mut self) -> Duration {
        let config = self.store.current().await;

        let presence = match config.status_presence() {
            Ok(presence) => presence,
            Err(e) => {
                debug!("Status refresh skipped: {}", e);
                return self.interval;
            }
        };

        let text = config.status_text();
        if text.trim().is_empty() {
            debug!("Status refresh skipped: custom_status_text is empty");
            return self.interval;
        }

        if let Err(e) = self.platform.set_presence(text, presence).await {
            error!("Failed to refresh custom status: {}", e);
        }

        self.interval
    }
}

impl std::fmt::Debug for StatusRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusRefresher")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
