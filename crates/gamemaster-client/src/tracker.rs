//! Per-game progress tracking.
//!
//! A [`GameProgressTracker`] is what an embedded game talks to.  It keeps the
//! game's score, level, play time and custom data for the current session,
//! autosaves on a timer, watches the login state and nags anonymous players
//! with a "sign in to save" prompt.
//!
//! Timers are tokio tasks holding an `Arc` of the tracker internals.  They
//! are aborted by [`GameProgressTracker::end_session`] or on drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use gamemaster_store::ProgressSnapshot;

use crate::auth::PublicUser;
use crate::config::TrackerConfig;
use crate::error::{AuthError, Result};
use crate::events::{EventBus, PortalEvent};
use crate::state::{lock, SharedAuth};

struct TrackerState {
    snapshot: ProgressSnapshot,
    /// `None` while suspended.
    clock_start: Option<Instant>,
    /// Sub-second remainder carried into the next accumulation.
    carry: Duration,
    /// Seconds counted but not yet added to the user's total.
    unsaved_secs: u64,
}

impl TrackerState {
    fn new(snapshot: ProgressSnapshot) -> Self {
        Self {
            snapshot,
            clock_start: Some(Instant::now()),
            carry: Duration::ZERO,
            unsaved_secs: 0,
        }
    }

    fn accumulate(&mut self) {
        let Some(start) = self.clock_start else {
            return;
        };
        let now = Instant::now();
        let elapsed = now.duration_since(start) + self.carry;
        let whole = elapsed.as_secs();

        self.carry = elapsed - Duration::from_secs(whole);
        self.snapshot.play_time += whole;
        self.unsaved_secs += whole;
        self.clock_start = Some(now);
    }
}

struct TrackerInner {
    game: String,
    auth: SharedAuth,
    events: EventBus,
    config: TrackerConfig,
    state: Mutex<TrackerState>,
    was_logged_in: AtomicBool,
    prompt_visible: AtomicBool,
    prompt_task: Mutex<Option<JoinHandle<()>>>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

pub struct GameProgressTracker {
    inner: Arc<TrackerInner>,
}

impl GameProgressTracker {
    /// Load saved progress for `game` and start the autosave timer, the login
    /// poller and the login prompt.  Must be called inside a tokio runtime.
    pub fn start(auth: SharedAuth, game: impl Into<String>, config: TrackerConfig) -> Result<Self> {
        let game = game.into();
        let (events, logged_in) = {
            let guard = lock(&auth)?;
            (guard.events().clone(), guard.is_logged_in())
        };

        let inner = Arc::new(TrackerInner {
            game,
            auth,
            events,
            config,
            state: Mutex::new(TrackerState::new(ProgressSnapshot::default())),
            was_logged_in: AtomicBool::new(logged_in),
            prompt_visible: AtomicBool::new(false),
            prompt_task: Mutex::new(None),
            timers: Mutex::new(Vec::new()),
        });

        inner.load_progress()?;

        let autosave = spawn_autosave(Arc::clone(&inner));
        let poller = spawn_login_poller(Arc::clone(&inner));
        inner.timers()?.extend([autosave, poller]);

        inner.schedule_login_prompt();

        info!(game = %inner.game, logged_in, "progress tracker started");
        Ok(Self { inner })
    }

    // ------------------------------------------------------------------
    // Game-facing API
    // ------------------------------------------------------------------

    /// Raise the score.  Returns `true` if `score` beat the current one.
    pub fn update_score(&self, score: i64) -> Result<bool> {
        let raised = {
            let mut state = self.inner.state()?;
            if score > state.snapshot.score {
                state.snapshot.score = score;
                true
            } else {
                false
            }
        };

        if raised && self.is_logged_in() {
            self.inner.events.emit(PortalEvent::HighScore {
                game: self.inner.game.clone(),
                score,
            });
        }
        Ok(raised)
    }

    /// Raise the level.  Returns `true` if `level` is past the current one.
    pub fn update_level(&self, level: u32) -> Result<bool> {
        let raised = {
            let mut state = self.inner.state()?;
            if level > state.snapshot.level {
                state.snapshot.level = level;
                true
            } else {
                false
            }
        };

        if raised && self.is_logged_in() {
            self.inner.events.emit(PortalEvent::LevelUp {
                game: self.inner.game.clone(),
                level,
            });
        }
        Ok(raised)
    }

    pub fn set_custom_data(&self, key: impl Into<String>, value: Value) -> Result<()> {
        self.inner
            .state()?
            .snapshot
            .custom_data
            .insert(key.into(), value);
        Ok(())
    }

    pub fn custom_data(&self, key: &str) -> Option<Value> {
        let state = self.inner.state().ok()?;
        state.snapshot.custom_data.get(key).cloned()
    }

    /// Current snapshot, with play time brought up to date.
    pub fn progress(&self) -> Result<ProgressSnapshot> {
        let mut state = self.inner.state()?;
        state.accumulate();
        Ok(state.snapshot.clone())
    }

    pub fn score(&self) -> i64 {
        self.inner.state().map(|s| s.snapshot.score).unwrap_or(0)
    }

    pub fn level(&self) -> u32 {
        self.inner.state().map(|s| s.snapshot.level).unwrap_or(1)
    }

    /// Seconds as of the last accumulation.
    pub fn play_time(&self) -> u64 {
        self.inner.state().map(|s| s.snapshot.play_time).unwrap_or(0)
    }

    pub fn is_logged_in(&self) -> bool {
        lock(&self.inner.auth)
            .map(|auth| auth.is_logged_in())
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        lock(&self.inner.auth).ok()?.current_user()
    }

    /// Accumulate play time and save when logged in.
    pub fn save_progress(&self) -> Result<bool> {
        self.inner.save_progress()
    }

    // ------------------------------------------------------------------
    // Page lifecycle
    // ------------------------------------------------------------------

    /// Page hidden: save, then stop counting time until [`resume`](Self::resume).
    pub fn suspend(&self) -> Result<bool> {
        let saved = self.inner.save_progress()?;
        let mut state = self.inner.state()?;
        state.clock_start = None;
        state.carry = Duration::ZERO;
        debug!(game = %self.inner.game, "tracker suspended");
        Ok(saved)
    }

    pub fn resume(&self) -> Result<()> {
        let mut state = self.inner.state()?;
        if state.clock_start.is_none() {
            state.clock_start = Some(Instant::now());
            debug!(game = %self.inner.game, "tracker resumed");
        }
        Ok(())
    }

    /// Page unload: stop all timers and save one last time.
    pub fn end_session(&self) -> Result<bool> {
        self.inner.stop_timers();
        let saved = self.inner.save_progress()?;
        info!(game = %self.inner.game, saved, "progress tracker stopped");
        Ok(saved)
    }

    // ------------------------------------------------------------------
    // Login prompt
    // ------------------------------------------------------------------

    pub fn login_prompt_visible(&self) -> bool {
        self.inner.prompt_visible.load(Ordering::SeqCst)
    }

    /// Hide the prompt and start the cooldown.
    pub fn dismiss_login_prompt(&self) -> Result<()> {
        self.inner.cancel_prompt_task();
        self.inner.hide_login_prompt();
        self.inner.record_dismissal()
    }
}

impl Drop for GameProgressTracker {
    fn drop(&mut self) {
        self.inner.stop_timers();
    }
}

impl TrackerInner {
    fn state(&self) -> Result<MutexGuard<'_, TrackerState>> {
        self.state.lock().map_err(|_| AuthError::LockPoisoned)
    }

    fn timers(&self) -> Result<MutexGuard<'_, Vec<JoinHandle<()>>>> {
        self.timers.lock().map_err(|_| AuthError::LockPoisoned)
    }

    fn auth_logged_in(&self) -> bool {
        lock(&self.auth)
            .map(|auth| auth.is_logged_in())
            .unwrap_or(false)
    }

    /// Replace the session snapshot with the stored one.  Without a stored
    /// record the current session carries on and is saved as-is later.
    fn load_progress(&self) -> Result<()> {
        let stored = {
            let auth = lock(&self.auth)?;
            auth.game_progress(&self.game).map(|p| p.snapshot.clone())
        };
        let Some(stored) = stored else {
            debug!(game = %self.game, "no saved progress");
            return Ok(());
        };

        let (level, score) = {
            let mut state = self.state()?;
            state.snapshot = stored;
            state.unsaved_secs = 0;
            (state.snapshot.level, state.snapshot.score)
        };

        debug!(game = %self.game, level, score, "progress loaded");
        self.events.emit(PortalEvent::ProgressLoaded {
            game: self.game.clone(),
            level,
            score,
        });
        Ok(())
    }

    fn save_progress(&self) -> Result<bool> {
        let (snapshot, unsaved) = {
            let mut state = self.state()?;
            state.accumulate();
            (state.snapshot.clone(), state.unsaved_secs)
        };

        let saved = lock(&self.auth)?.save_game_progress(&self.game, &snapshot, unsaved)?;

        if saved {
            let mut state = self.state()?;
            state.unsaved_secs = state.unsaved_secs.saturating_sub(unsaved);
        }
        Ok(saved)
    }

    fn stop_timers(&self) {
        self.cancel_prompt_task();
        if let Ok(mut timers) = self.timers() {
            for handle in timers.drain(..) {
                handle.abort();
            }
        }
    }

    fn cancel_prompt_task(&self) {
        if let Ok(mut task) = self.prompt_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }

    fn show_login_prompt(&self) {
        if !self.prompt_visible.swap(true, Ordering::SeqCst) {
            self.events.emit(PortalEvent::LoginPromptShown {
                game: self.game.clone(),
            });
        }
    }

    fn hide_login_prompt(&self) {
        if self.prompt_visible.swap(false, Ordering::SeqCst) {
            self.events.emit(PortalEvent::LoginPromptHidden {
                game: self.game.clone(),
            });
        }
    }

    fn record_dismissal(&self) -> Result<()> {
        lock(&self.auth)?
            .database()
            .record_prompt_dismissal(Utc::now())?;
        Ok(())
    }

    fn prompt_on_cooldown(&self) -> Result<bool> {
        let last = lock(&self.auth)?.database().last_prompt_dismissal()?;
        Ok(last.is_some_and(|at| Utc::now() - at < self.config.prompt_cooldown))
    }

    /// Queue the prompt for anonymous players outside the cooldown window.
    fn schedule_login_prompt(self: &Arc<Self>) {
        if self.auth_logged_in() {
            return;
        }
        match self.prompt_on_cooldown() {
            Ok(false) => {}
            Ok(true) => {
                debug!(game = %self.game, "login prompt on cooldown");
                return;
            }
            Err(e) => {
                warn!(game = %self.game, error = %e, "failed to read prompt state");
                return;
            }
        }

        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.config.prompt_delay).await;
            if inner.auth_logged_in() {
                return;
            }
            inner.show_login_prompt();

            tokio::time::sleep(inner.config.prompt_auto_close).await;
            if inner.prompt_visible.load(Ordering::SeqCst) {
                inner.hide_login_prompt();
                if let Err(e) = inner.record_dismissal() {
                    warn!(game = %inner.game, error = %e, "failed to record prompt dismissal");
                }
            }
        });

        if let Ok(mut task) = self.prompt_task.lock() {
            if let Some(old) = task.replace(handle) {
                old.abort();
            }
        }
    }

    /// One poll of the login state.
    fn poll_login_state(self: &Arc<Self>) -> Result<()> {
        let logged_in = {
            let mut auth = lock(&self.auth)?;
            auth.reload()?;
            auth.is_logged_in()
        };
        let was = self.was_logged_in.swap(logged_in, Ordering::SeqCst);

        match (was, logged_in) {
            (false, true) => {
                info!(game = %self.game, "player logged in, reloading progress");
                self.cancel_prompt_task();
                self.hide_login_prompt();
                self.load_progress()?;
            }
            (true, false) => {
                info!(game = %self.game, "player logged out");
                self.schedule_login_prompt();
            }
            _ => {}
        }
        Ok(())
    }
}

fn spawn_autosave(inner: Arc<TrackerInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = inner.config.autosave_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            match inner.save_progress() {
                Ok(saved) => debug!(game = %inner.game, saved, "autosave"),
                Err(e) => warn!(game = %inner.game, error = %e, "autosave failed"),
            }
        }
    })
}

fn spawn_login_poller(inner: Arc<TrackerInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = inner.config.login_poll_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            if let Err(e) = inner.poll_login_state() {
                warn!(game = %inner.game, error = %e, "login poll failed");
            }
        }
    })
}
