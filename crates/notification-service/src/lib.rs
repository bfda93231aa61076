mod messages;

pub use messages::{render, render_summary};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sentinel_core::NotificationEvent;

/// A rendered notification ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub event: NotificationEvent,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn from_event(event: NotificationEvent) -> Self {
        let (title, message) = messages::render(&event);
        Self {
            event,
            timestamp: chrono::Utc::now(),
            title,
            message,
        }
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Channel error: {0}")]
    Channel(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Dispatches events to all configured channels. A failing channel is
/// logged and skipped so one broken transport cannot silence the rest.
pub struct NotificationService {
    channels: std::sync::Arc<Vec<Box<dyn NotificationChannel>>>,
}

impl NotificationService {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        if channels.is_empty() {
            tracing::info!("No notification channels configured, events will only be logged");
        }
        Self {
            channels: std::sync::Arc::new(channels),
        }
    }

    /// Send an event to all channels (fire-and-forget via tokio::spawn).
    pub fn send_event(&self, event: NotificationEvent) {
        let channels = self.channels.clone();
        let alert = Alert::from_event(event);
        tokio::spawn(async move {
            for channel in channels.iter() {
                match channel.send(&alert).await {
                    Ok(()) => tracing::debug!("Sent notification via {}", channel.name()),
                    Err(e) => {
                        tracing::warn!("Failed to send notification via {}: {}", channel.name(), e)
                    }
                }
            }
        });
    }

    /// Send an event to all channels, awaiting completion.
    pub async fn send_event_async(&self, event: NotificationEvent) {
        let alert = Alert::from_event(event);
        for channel in self.channels.iter() {
            match channel.send(&alert).await {
                Ok(()) => tracing::debug!("Sent notification via {}", channel.name()),
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e)
                }
            }
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// Channel that writes alerts to the log. Always available; the default
/// when no external transport is configured.
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        tracing::info!(
            kind = alert.event.kind(),
            ticker = alert.event.ticker(),
            title = %alert.title,
            "{}",
            alert.message
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
