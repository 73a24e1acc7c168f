//! Terminal rendering of portal events.

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

use gamemaster_client::{NotificationKind, PortalEvent};

/// Print everything queued on `rx` without waiting.
pub fn drain(rx: &mut Receiver<PortalEvent>) {
    loop {
        match rx.try_recv() {
            Ok(event) => print_event(&event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

pub fn print_event(event: &PortalEvent) {
    if let Some(line) = render(event) {
        println!("{line}");
    }
}

fn render(event: &PortalEvent) -> Option<String> {
    let line = match event {
        PortalEvent::Notification { kind, message } => {
            let tag = match kind {
                NotificationKind::Success => "ok",
                NotificationKind::Error => "error",
                NotificationKind::Info => "info",
            };
            format!("[{tag}] {message}")
        }
        PortalEvent::HighScore { score, .. } => format!("[info] New high score: {score}"),
        PortalEvent::LevelUp { level, .. } => format!("[info] Level up! Now on level {level}"),
        PortalEvent::LoginPromptShown { .. } => {
            "[info] Sign in to save your progress! (login ID PW, or dismiss)".to_string()
        }
        PortalEvent::ProgressLoaded { level, score, .. } => {
            format!("[info] Progress loaded: level {level}, score {score}")
        }
        _ => return None,
    };
    Some(line)
}
