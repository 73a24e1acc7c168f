//! Portal event bus.  Front ends subscribe to show toasts and react to
//! login / progress changes.

use serde::Serialize;
use tokio::sync::broadcast;

pub const EVENT_NOTIFICATION: &str = "notification";
pub const EVENT_LOGIN_STATE_CHANGED: &str = "login-state-changed";
pub const EVENT_PROGRESS_LOADED: &str = "progress-loaded";
pub const EVENT_PROGRESS_SAVED: &str = "progress-saved";
pub const EVENT_HIGH_SCORE: &str = "high-score";
pub const EVENT_LEVEL_UP: &str = "level-up";
pub const EVENT_LOGIN_PROMPT_SHOWN: &str = "login-prompt-shown";
pub const EVENT_LOGIN_PROMPT_HIDDEN: &str = "login-prompt-hidden";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PortalEvent {
    Notification {
        kind: NotificationKind,
        message: String,
    },
    LoginStateChanged {
        logged_in: bool,
    },
    ProgressLoaded {
        game: String,
        level: u32,
        score: i64,
    },
    ProgressSaved {
        game: String,
    },
    HighScore {
        game: String,
        score: i64,
    },
    LevelUp {
        game: String,
        level: u32,
    },
    LoginPromptShown {
        game: String,
    },
    LoginPromptHidden {
        game: String,
    },
}

impl PortalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Notification { .. } => EVENT_NOTIFICATION,
            Self::LoginStateChanged { .. } => EVENT_LOGIN_STATE_CHANGED,
            Self::ProgressLoaded { .. } => EVENT_PROGRESS_LOADED,
            Self::ProgressSaved { .. } => EVENT_PROGRESS_SAVED,
            Self::HighScore { .. } => EVENT_HIGH_SCORE,
            Self::LevelUp { .. } => EVENT_LEVEL_UP,
            Self::LoginPromptShown { .. } => EVENT_LOGIN_PROMPT_SHOWN,
            Self::LoginPromptHidden { .. } => EVENT_LOGIN_PROMPT_HIDDEN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PortalEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PortalEvent) {
        let name = event.name();
        // nobody listening is normal for headless use
        if self.tx.send(event).is_err() {
            tracing::debug!(event = name, "event dropped, no subscribers");
        }
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        self.emit(PortalEvent::Notification {
            kind,
            message: message.into(),
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
