//! `gamemaster play <title>`: a tracker session driven line by line from stdin.

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::info;

use gamemaster_client::state::{lock, SharedAuth};
use gamemaster_client::{GameProgressTracker, PortalEvent, TrackerConfig};
use gamemaster_shared::catalog::GameEntry;

use crate::notify;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayCommand {
    Score(i64),
    Level(u32),
    Set(String, Value),
    Save,
    Hide,
    Show,
    Login { identifier: String, password: String },
    Logout,
    Dismiss,
    Status,
    Quit,
}

const HELP: &str = "commands: score N | level N | set KEY VALUE | save | hide | show | \
                    login ID PW | logout | dismiss | status | quit";

pub fn parse_command(line: &str) -> Result<PlayCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err(HELP.to_string());
    };

    let cmd = match verb.to_lowercase().as_str() {
        "score" => PlayCommand::Score(number(parts.next(), "score")?),
        "level" => PlayCommand::Level(number(parts.next(), "level")?),
        "set" => {
            let key = parts.next().ok_or("usage: set KEY VALUE")?;
            let raw = parts.collect::<Vec<_>>().join(" ");
            if raw.is_empty() {
                return Err("usage: set KEY VALUE".to_string());
            }
            // bare words are stored as strings
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            PlayCommand::Set(key.to_string(), value)
        }
        "save" => PlayCommand::Save,
        "hide" => PlayCommand::Hide,
        "show" => PlayCommand::Show,
        "login" => match (parts.next(), parts.next()) {
            (Some(id), Some(pw)) => PlayCommand::Login {
                identifier: id.to_string(),
                password: pw.to_string(),
            },
            _ => return Err("usage: login ID PASSWORD".to_string()),
        },
        "logout" => PlayCommand::Logout,
        "dismiss" => PlayCommand::Dismiss,
        "status" => PlayCommand::Status,
        "quit" | "exit" => PlayCommand::Quit,
        _ => return Err(HELP.to_string()),
    };
    Ok(cmd)
}

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
    arg.and_then(|a| a.parse().ok())
        .ok_or_else(|| format!("usage: {what} N"))
}

/// Run the session until `quit` or end of input, then save.  Events are
/// printed as they arrive.
pub async fn run(
    auth: SharedAuth,
    game: &GameEntry,
    config: TrackerConfig,
    events: &mut Receiver<PortalEvent>,
) -> Result<()> {
    lock(&auth)?.database().record_played(game)?;

    let tracker = GameProgressTracker::start(auth.clone(), game.title.clone(), config)?;
    println!(
        "Playing {} (level {}, score {}). {HELP}",
        game.title,
        tracker.level(),
        tracker.score()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let cmd = match parse_command(&line) {
                    Ok(cmd) => cmd,
                    Err(usage) => {
                        println!("{usage}");
                        continue;
                    }
                };
                if cmd == PlayCommand::Quit {
                    break;
                }
                // account failures are already reported as notifications
                if let Err(e) = apply(&tracker, &auth, cmd) {
                    tracing::debug!(error = %e, "play command failed");
                }
            }
            event = events.recv() => match event {
                Ok(event) => notify::print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notification output lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    let saved = tracker.end_session()?;
    info!(game = %game.title, saved, "play session finished");
    if !saved {
        println!("Progress not saved: log in to keep it.");
    }
    Ok(())
}

fn apply(tracker: &GameProgressTracker, auth: &SharedAuth, cmd: PlayCommand) -> Result<()> {
    match cmd {
        PlayCommand::Score(n) => {
            tracker.update_score(n)?;
        }
        PlayCommand::Level(n) => {
            tracker.update_level(n)?;
        }
        PlayCommand::Set(key, value) => tracker.set_custom_data(key, value)?,
        PlayCommand::Save => {
            if !tracker.save_progress()? {
                println!("Not logged in, nothing saved.");
            }
        }
        PlayCommand::Hide => {
            tracker.suspend()?;
        }
        PlayCommand::Show => tracker.resume()?,
        PlayCommand::Login {
            identifier,
            password,
        } => {
            lock(auth)?.authenticate(&identifier, &password)?;
        }
        PlayCommand::Logout => lock(auth)?.logout()?,
        PlayCommand::Dismiss => tracker.dismiss_login_prompt()?,
        PlayCommand::Status => {
            let progress = tracker.progress()?;
            let who = tracker
                .current_user()
                .map(|u| u.username)
                .unwrap_or_else(|| "guest".to_string());
            println!(
                "{who}: score {} level {} time {}s data {}",
                progress.score,
                progress.level,
                progress.play_time,
                Value::Object(progress.custom_data)
            );
        }
        PlayCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_command("score 1200"), Ok(PlayCommand::Score(1200)));
        assert_eq!(parse_command("LEVEL 3"), Ok(PlayCommand::Level(3)));
        assert!(parse_command("level -1").is_err());
        assert!(parse_command("score").is_err());
    }

    #[test]
    fn test_parse_set_values() {
        assert_eq!(
            parse_command("set coins 7"),
            Ok(PlayCommand::Set("coins".into(), json!(7)))
        );
        assert_eq!(
            parse_command("set hat red cap"),
            Ok(PlayCommand::Set("hat".into(), json!("red cap")))
        );
        assert_eq!(
            parse_command(r#"set inv ["key","map"]"#),
            Ok(PlayCommand::Set("inv".into(), json!(["key", "map"])))
        );
        assert!(parse_command("set lonely").is_err());
    }

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse_command("login mario pw"),
            Ok(PlayCommand::Login {
                identifier: "mario".into(),
                password: "pw".into(),
            })
        );
        assert!(parse_command("login mario").is_err());
    }

    #[test]
    fn test_unknown_shows_help() {
        assert_eq!(parse_command("jump"), Err(HELP.to_string()));
        assert_eq!(parse_command("exit"), Ok(PlayCommand::Quit));
    }
}
