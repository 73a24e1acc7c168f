//! Local accounts, session and per-user game progress.
//!
//! [`AuthSystem`] keeps the users, session and progress documents in memory
//! and rewrites the whole document on every mutation.  Nothing here is real
//! security: the password digest is a 32-bit rolling hash and the session is
//! an unsigned pointer anyone with storage access can forge.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use gamemaster_shared::catalog::GameEntry;
use gamemaster_shared::constants::{APP_NAME, MIN_USERNAME_LEN};
use gamemaster_shared::hash::password_digest;
use gamemaster_shared::identity::{FederatedProfile, IdentityProvider};
use gamemaster_shared::types::{AccountKind, UserId};
use gamemaster_store::{
    Database, GameProgress, ProgressMap, ProgressSnapshot, SessionRecord, UserMap, UserProgress,
    UserRecord, UserStats,
};

use crate::error::{AuthError, Result};
use crate::events::{EventBus, NotificationKind, PortalEvent};

/// What games and pages get to see about the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub username: String,
    pub email: Option<String>,
    pub account_type: AccountKind,
    pub join_date: DateTime<Utc>,
    pub linked_federated: bool,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            account_type: user.account_type,
            join_date: user.join_date,
            linked_federated: user.linked_federated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub username: String,
    pub account_label: &'static str,
    pub email: String,
    pub join_date: DateTime<Utc>,
    pub games_played: u64,
    pub favorite_count: usize,
    pub play_minutes: u64,
    pub progress: Vec<(String, GameProgress)>,
}

pub struct AuthSystem {
    db: Database,
    events: EventBus,
    users: UserMap,
    session: Option<SessionRecord>,
    progress: ProgressMap,
    current: Option<UserId>,
}

impl AuthSystem {
    /// Load all documents and re-attach a stored session, if any.
    pub fn open(db: Database, events: EventBus) -> Result<Self> {
        let users = db.load_users()?;
        let session = db.load_session()?;
        let progress = db.load_progress()?;

        let mut auth = Self {
            db,
            events,
            users,
            session,
            progress,
            current: None,
        };
        auth.check_existing_session();

        info!(
            users = auth.users.len(),
            logged_in = auth.is_logged_in(),
            "auth system ready"
        );
        Ok(auth)
    }

    // No expiry or integrity check: the user id just has to exist.
    fn check_existing_session(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        if self.users.contains_key(&session.user_id) {
            self.current = Some(session.user_id.clone());
        } else {
            warn!(user_id = %session.user_id, "stored session points at unknown user");
        }
    }

    /// Re-read every document, picking up writes from other handles on the
    /// same storage (another tab logging out, storage being cleared).
    pub fn reload(&mut self) -> Result<()> {
        self.users = self.db.load_users()?;
        self.session = self.db.load_session()?;
        self.progress = self.db.load_progress()?;
        self.current = None;
        self.check_existing_session();
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ------------------------------------------------------------------
    // Registration / login
    // ------------------------------------------------------------------

    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<PublicUser> {
        let username = username.trim();
        let email = email.map(str::trim).filter(|e| !e.is_empty());

        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(self.fail(AuthError::UsernameTooShort {
                min: MIN_USERNAME_LEN,
            }));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(self.fail(AuthError::UsernameHasWhitespace));
        }
        if password.is_empty() {
            return Err(self.fail(AuthError::PasswordRequired));
        }

        let key = username.to_lowercase();
        let email_key = email.map(str::to_lowercase);

        for existing in self.users.values() {
            let existing_key = existing.lookup_key();
            let existing_email = existing.email_key();

            if existing_key == key || existing_email.as_deref() == Some(key.as_str()) {
                return Err(self.fail(AuthError::UsernameTaken));
            }
            if let Some(email_key) = &email_key {
                if existing_email.as_ref() == Some(email_key) || &existing_key == email_key {
                    return Err(self.fail(AuthError::EmailTaken));
                }
            }
        }

        let user_id = UserId::generate();
        let user = UserRecord {
            username: username.to_string(),
            username_key: Some(key),
            email: email.map(str::to_string),
            password: Some(password_digest(password)),
            account_type: AccountKind::Local,
            linked_federated: false,
            federated_subject: None,
            profile_picture: None,
            join_date: Utc::now(),
            stats: UserStats::default(),
        };

        self.users.insert(user_id.clone(), user);
        self.db.save_users(&self.users)?;

        info!(user_id = %user_id, username, "registered local account");
        self.login_user(user_id.clone())?;
        self.notify(
            NotificationKind::Success,
            format!("Welcome to {APP_NAME}, {username}!"),
        );

        Ok(self.public_user(&user_id))
    }

    /// Match `identifier` against lookup key, email or user id, case-insensitively.
    pub fn authenticate(&mut self, identifier: &str, password: &str) -> Result<PublicUser> {
        let wanted = identifier.trim().to_lowercase();
        let digest = password_digest(password);

        let found = self.users.iter().find_map(|(id, user)| {
            let name_match = user.lookup_key() == wanted
                || user.email_key().as_deref() == Some(wanted.as_str())
                || id.as_str().to_lowercase() == wanted;
            let password_match = user.password.as_deref() == Some(digest.as_str());
            (name_match && password_match).then(|| id.clone())
        });

        let Some(user_id) = found else {
            return Err(self.fail(AuthError::InvalidCredentials));
        };

        self.login_user(user_id.clone())?;
        let user = self.public_user(&user_id);
        self.notify(
            NotificationKind::Success,
            format!("Welcome back, {}!", user.username),
        );
        Ok(user)
    }

    /// Sign in through an identity provider, creating a federated account the
    /// first time a subject is seen.
    pub fn login_federated(&mut self, provider: &dyn IdentityProvider) -> Result<PublicUser> {
        let profile = match provider.sign_in() {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "federated login failed");
                self.notify(
                    NotificationKind::Error,
                    "Federated login failed. Please try again.",
                );
                return Err(e.into());
            }
        };

        if let Some(user_id) = self.find_by_subject(&profile.subject) {
            self.login_user(user_id.clone())?;
            let user = self.public_user(&user_id);
            self.notify(
                NotificationKind::Success,
                format!("Welcome back, {}!", user.username),
            );
            return Ok(user);
        }

        let user_id = UserId::generate();
        let FederatedProfile {
            subject,
            name,
            email,
            picture,
        } = profile;
        let user = UserRecord {
            username: name.clone(),
            username_key: None,
            email,
            password: None,
            account_type: AccountKind::Federated,
            linked_federated: true,
            federated_subject: Some(subject),
            profile_picture: picture,
            join_date: Utc::now(),
            stats: UserStats::default(),
        };

        self.users.insert(user_id.clone(), user);
        self.db.save_users(&self.users)?;

        info!(user_id = %user_id, "created federated account");
        self.login_user(user_id.clone())?;
        self.notify(
            NotificationKind::Success,
            format!("Welcome to {APP_NAME}, {name}!"),
        );

        Ok(self.public_user(&user_id))
    }

    /// Attach a federated identity to the current local account.
    pub fn link_federated(&mut self, provider: &dyn IdentityProvider) -> Result<()> {
        let user_id = match &self.current {
            Some(id) if self.users.get(id).map(|u| u.account_type) == Some(AccountKind::Local) => {
                id.clone()
            }
            _ => return Err(self.fail(AuthError::NotLocalAccount)),
        };

        let profile = match provider.sign_in() {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "federated linking failed");
                self.notify(
                    NotificationKind::Error,
                    "Failed to link federated account. Please try again.",
                );
                return Err(e.into());
            }
        };

        if self.find_by_subject(&profile.subject).is_some() {
            return Err(self.fail(AuthError::FederatedAlreadyLinked));
        }

        if let Some(user) = self.users.get_mut(&user_id) {
            user.federated_subject = Some(profile.subject);
            user.linked_federated = true;
            if user.email_key().is_none() {
                user.email = profile.email;
            }
            user.profile_picture = profile.picture;
        }
        self.db.save_users(&self.users)?;

        info!(user_id = %user_id, "linked federated identity");
        self.notify(
            NotificationKind::Success,
            "Federated account linked successfully!",
        );
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        let previous = self.current.take();
        self.session = None;
        self.db.clear_session()?;

        if let Some(user_id) = previous {
            info!(user_id = %user_id, "logged out");
        }
        self.events
            .emit(PortalEvent::LoginStateChanged { logged_in: false });
        self.notify(NotificationKind::Success, "Logged out successfully!");
        Ok(())
    }

    fn login_user(&mut self, user_id: UserId) -> Result<()> {
        let session = SessionRecord::start(user_id.clone());
        self.db.save_session(&session)?;
        self.session = Some(session);
        self.current = Some(user_id.clone());

        info!(user_id = %user_id, "session started");
        self.events
            .emit(PortalEvent::LoginStateChanged { logged_in: true });
        Ok(())
    }

    fn find_by_subject(&self, subject: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|(_, u)| u.federated_subject.as_deref() == Some(subject))
            .map(|(id, _)| id.clone())
    }

    // ------------------------------------------------------------------
    // Current user
    // ------------------------------------------------------------------

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        self.current.as_ref()
    }

    pub fn session(&self) -> Option<&SessionRecord> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        self.current_record().map(PublicUser::from)
    }

    fn current_record(&self) -> Option<&UserRecord> {
        self.current.as_ref().and_then(|id| self.users.get(id))
    }

    fn public_user(&self, user_id: &UserId) -> PublicUser {
        // callers only pass ids they just inserted or matched
        self.users
            .get(user_id)
            .map(PublicUser::from)
            .unwrap_or_else(|| PublicUser {
                username: user_id.to_string(),
                email: None,
                account_type: AccountKind::Local,
                join_date: Utc::now(),
                linked_federated: false,
            })
    }

    pub fn profile(&self) -> Option<ProfileSummary> {
        let user = self.current_record()?;

        let account_label = match (user.account_type, user.linked_federated) {
            (AccountKind::Federated, _) => "Federated Account",
            (AccountKind::Local, true) => "Username (Federated Linked)",
            (AccountKind::Local, false) => "Username",
        };

        let progress = self
            .all_progress()
            .map(|p| p.iter().map(|(g, r)| (g.clone(), r.clone())).collect())
            .unwrap_or_default();

        Some(ProfileSummary {
            username: user.username.clone(),
            account_label,
            email: user
                .email
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Not provided".to_string()),
            join_date: user.join_date,
            games_played: user.stats.games_played,
            favorite_count: user.stats.favorite_games.len(),
            play_minutes: user.stats.total_play_time / 60,
            progress,
        })
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    /// Store `snapshot` for the current user.  Returns `false` when nobody is
    /// logged in.  `played_secs` is the play time not yet reported.
    pub fn save_game_progress(
        &mut self,
        game: &str,
        snapshot: &ProgressSnapshot,
        played_secs: u64,
    ) -> Result<bool> {
        let Some(user_id) = self.current.clone() else {
            return Ok(false);
        };

        let per_user = self.progress.entry(user_id.clone()).or_default();
        let first_save = !per_user.contains_key(game);
        per_user.insert(
            game.to_string(),
            GameProgress::new(snapshot.clone(), Utc::now()),
        );

        if let Some(user) = self.users.get_mut(&user_id) {
            if first_save {
                user.stats.games_played += 1;
            }
            user.stats.total_play_time += played_secs;
        }

        self.db.save_progress(&self.progress)?;
        self.db.save_users(&self.users)?;

        debug!(user_id = %user_id, game, played_secs, "progress saved");
        self.events.emit(PortalEvent::ProgressSaved {
            game: game.to_string(),
        });
        Ok(true)
    }

    pub fn game_progress(&self, game: &str) -> Option<&GameProgress> {
        self.all_progress()?.get(game)
    }

    pub fn all_progress(&self) -> Option<&UserProgress> {
        self.progress.get(self.current.as_ref()?)
    }

    /// Drop every saved game for the current user and zero their play stats.
    pub fn clear_all_progress(&mut self) -> Result<()> {
        let Some(user_id) = self.current.clone() else {
            return Err(self.fail(AuthError::NotLoggedIn));
        };

        self.progress.remove(&user_id);
        if let Some(user) = self.users.get_mut(&user_id) {
            user.stats.games_played = 0;
            user.stats.total_play_time = 0;
        }

        self.db.save_progress(&self.progress)?;
        self.db.save_users(&self.users)?;

        info!(user_id = %user_id, "cleared all progress");
        self.notify(NotificationKind::Success, "All progress cleared!");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Toggle a favorite in the shared list and mirror it into the current
    /// user's stats.  Returns `true` if it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, game: &GameEntry) -> Result<bool> {
        let now_favorite = self.db.toggle_favorite(game)?;

        if let Some(user) = self.current.as_ref().and_then(|id| self.users.get_mut(id)) {
            let favorites = &mut user.stats.favorite_games;
            favorites.retain(|t| t != &game.title);
            if now_favorite {
                favorites.push(game.title.clone());
            }
            self.db.save_users(&self.users)?;
        }

        if now_favorite {
            self.notify(
                NotificationKind::Success,
                format!("{} added to favorites!", game.title),
            );
        } else {
            self.notify(
                NotificationKind::Info,
                format!("{} removed from favorites", game.title),
            );
        }
        Ok(now_favorite)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        self.events.notify(kind, message);
    }

    fn fail(&self, err: AuthError) -> AuthError {
        self.notify(NotificationKind::Error, err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use gamemaster_shared::error::IdentityError;

    use super::*;

    struct StaticProvider(FederatedProfile);

    impl IdentityProvider for StaticProvider {
        fn sign_in(&self) -> std::result::Result<FederatedProfile, IdentityError> {
            Ok(self.0.clone())
        }
    }

    struct CancelledProvider;

    impl IdentityProvider for CancelledProvider {
        fn sign_in(&self) -> std::result::Result<FederatedProfile, IdentityError> {
            Err(IdentityError::Cancelled)
        }
    }

    fn profile(subject: &str) -> FederatedProfile {
        FederatedProfile {
            subject: subject.to_string(),
            name: "Demo User".to_string(),
            email: Some("demo@gamemaster.com".to_string()),
            picture: Some("https://example.com/demo.png".to_string()),
        }
    }

    fn fresh() -> AuthSystem {
        AuthSystem::open(Database::open_in_memory().unwrap(), EventBus::new()).unwrap()
    }

    fn game(title: &str) -> GameEntry {
        GameEntry {
            title: title.to_string(),
            url: format!("https://games.example/{title}"),
            image: format!("{title}.png"),
            category: "Arcade".to_string(),
        }
    }

    #[test]
    fn test_register_then_login_any_case() {
        let mut auth = fresh();
        auth.register("PixelHero", "hunter2", Some("Pixel@Example.com"))
            .unwrap();
        assert!(auth.is_logged_in());
        auth.logout().unwrap();

        for ident in ["pixelhero", "PIXELHERO", "  PixelHero ", "pixel@example.com"] {
            let user = auth.authenticate(ident, "hunter2").unwrap();
            assert_eq!(user.username, "PixelHero");
            auth.logout().unwrap();
        }
    }

    #[test]
    fn test_login_by_user_id() {
        let mut auth = fresh();
        auth.register("PixelHero", "hunter2", None).unwrap();
        let id = auth.current_user_id().unwrap().to_string();
        auth.logout().unwrap();

        assert!(auth.authenticate(&id.to_uppercase(), "hunter2").is_ok());
    }

    #[test]
    fn test_wrong_password_fails() {
        let mut auth = fresh();
        auth.register("PixelHero", "hunter2", None).unwrap();
        auth.logout().unwrap();

        let mut rx = auth.events().subscribe();
        assert!(matches!(
            auth.authenticate("pixelhero", "Hunter2"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(!auth.is_logged_in());
        assert_eq!(
            rx.try_recv().unwrap(),
            PortalEvent::Notification {
                kind: NotificationKind::Error,
                message: "Invalid username/email or password!".into(),
            }
        );
    }

    #[test]
    fn test_register_validation() {
        let mut auth = fresh();
        assert!(matches!(
            auth.register("ab", "pw", None),
            Err(AuthError::UsernameTooShort { min: 3 })
        ));
        assert!(matches!(
            auth.register(" ab ", "pw", None),
            Err(AuthError::UsernameTooShort { .. })
        ));
        assert!(matches!(
            auth.register("two words", "pw", None),
            Err(AuthError::UsernameHasWhitespace)
        ));
        assert!(matches!(
            auth.register("tab\there", "pw", None),
            Err(AuthError::UsernameHasWhitespace)
        ));
        assert!(matches!(
            auth.register("nopass", "", None),
            Err(AuthError::PasswordRequired)
        ));
        assert!(auth.database().load_users().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_username_case_insensitive() {
        let mut auth = fresh();
        auth.register("Mario", "pw1", Some("mario@example.com"))
            .unwrap();

        assert!(matches!(
            auth.register("MARIO", "pw2", None),
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register("luigi", "pw2", Some("MARIO@example.com")),
            Err(AuthError::EmailTaken)
        ));
        // an email may not shadow someone's username
        assert!(matches!(
            auth.register("luigi", "pw2", Some("MARIO")),
            Err(AuthError::EmailTaken)
        ));
        // a username may not shadow someone's email either
        assert!(matches!(
            auth.register("mario@example.com", "pw2", None),
            Err(AuthError::UsernameTaken)
        ));
        assert_eq!(auth.database().load_users().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_email_is_absent() {
        let mut auth = fresh();
        auth.register("first", "pw", Some("  ")).unwrap();
        auth.register("second", "pw", Some("")).unwrap();
        assert_eq!(auth.current_user().unwrap().email, None);
    }

    #[test]
    fn test_session_restored_on_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut auth =
                AuthSystem::open(Database::open_in_dir(dir.path()).unwrap(), EventBus::new())
                    .unwrap();
            auth.register("Sonic", "fast", None).unwrap();
        }

        let auth =
            AuthSystem::open(Database::open_in_dir(dir.path()).unwrap(), EventBus::new()).unwrap();
        assert_eq!(auth.current_user().unwrap().username, "Sonic");
        assert!(auth.session().is_some());
    }

    #[test]
    fn test_session_for_unknown_user_is_ignored() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&SessionRecord::start(UserId::from("user_ghost")))
            .unwrap();

        let auth = AuthSystem::open(db, EventBus::new()).unwrap();
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_logout_removes_session_document() {
        let mut auth = fresh();
        auth.register("Sonic", "fast", None).unwrap();
        assert!(auth.database().load_session().unwrap().is_some());

        auth.logout().unwrap();
        assert!(auth.database().load_session().unwrap().is_none());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_reload_sees_other_handle() {
        let dir = tempfile::tempdir().unwrap();
        let open = || {
            AuthSystem::open(Database::open_in_dir(dir.path()).unwrap(), EventBus::new()).unwrap()
        };
        let mut tab_a = open();
        let mut tab_b = open();

        tab_a.register("Tails", "pw", None).unwrap();
        assert!(!tab_b.is_logged_in());
        tab_b.reload().unwrap();
        assert_eq!(tab_b.current_user().unwrap().username, "Tails");

        tab_b.database().clear().unwrap();
        tab_a.reload().unwrap();
        assert!(!tab_a.is_logged_in());
    }

    #[test]
    fn test_federated_login_creates_then_reuses() {
        let mut auth = fresh();
        let provider = StaticProvider(profile("sub-1"));

        let user = auth.login_federated(&provider).unwrap();
        assert_eq!(user.account_type, AccountKind::Federated);
        assert!(user.linked_federated);
        auth.logout().unwrap();

        auth.login_federated(&provider).unwrap();
        assert_eq!(auth.database().load_users().unwrap().len(), 1);
    }

    #[test]
    fn test_federated_account_cannot_password_login() {
        let mut auth = fresh();
        auth.login_federated(&StaticProvider(profile("sub-1")))
            .unwrap();
        auth.logout().unwrap();

        assert!(auth.authenticate("demo@gamemaster.com", "").is_err());
    }

    #[test]
    fn test_federated_failure_is_generic_toast() {
        let mut auth = fresh();
        let mut rx = auth.events().subscribe();

        let err = auth.login_federated(&CancelledProvider).unwrap_err();
        assert!(matches!(err, AuthError::Identity(IdentityError::Cancelled)));
        assert_eq!(
            rx.try_recv().unwrap(),
            PortalEvent::Notification {
                kind: NotificationKind::Error,
                message: "Federated login failed. Please try again.".into(),
            }
        );
    }

    #[test]
    fn test_link_federated() {
        let mut auth = fresh();
        auth.register("Link", "triforce", None).unwrap();
        auth.link_federated(&StaticProvider(profile("sub-9")))
            .unwrap();

        let user = auth.current_user().unwrap();
        assert!(user.linked_federated);
        assert_eq!(user.email.as_deref(), Some("demo@gamemaster.com"));
        assert_eq!(
            auth.profile().unwrap().account_label,
            "Username (Federated Linked)"
        );

        // logging in federated now lands on the linked local account
        auth.logout().unwrap();
        let user = auth
            .login_federated(&StaticProvider(profile("sub-9")))
            .unwrap();
        assert_eq!(user.username, "Link");
    }

    #[test]
    fn test_link_rejects_taken_subject_and_non_local() {
        let mut auth = fresh();
        auth.login_federated(&StaticProvider(profile("sub-1")))
            .unwrap();
        assert!(matches!(
            auth.link_federated(&StaticProvider(profile("sub-2"))),
            Err(AuthError::NotLocalAccount)
        ));
        auth.logout().unwrap();

        assert!(matches!(
            auth.link_federated(&StaticProvider(profile("sub-2"))),
            Err(AuthError::NotLocalAccount)
        ));

        auth.register("Zelda", "pw", None).unwrap();
        assert!(matches!(
            auth.link_federated(&StaticProvider(profile("sub-1"))),
            Err(AuthError::FederatedAlreadyLinked)
        ));
    }

    #[test]
    fn test_save_progress_requires_login() {
        let mut auth = fresh();
        let saved = auth
            .save_game_progress("Slope", &ProgressSnapshot::default(), 10)
            .unwrap();
        assert!(!saved);
        assert!(auth.database().load_progress().unwrap().is_empty());
    }

    #[test]
    fn test_progress_round_trips_through_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = ProgressSnapshot {
            score: 4200,
            level: 7,
            play_time: 95,
            ..Default::default()
        };
        snapshot
            .custom_data
            .insert("checkpoint".into(), serde_json::json!("castle"));

        let before = Utc::now();
        {
            let mut auth =
                AuthSystem::open(Database::open_in_dir(dir.path()).unwrap(), EventBus::new())
                    .unwrap();
            auth.register("Samus", "metroid", None).unwrap();
            assert!(auth.save_game_progress("Vex", &snapshot, 95).unwrap());
        }

        let auth =
            AuthSystem::open(Database::open_in_dir(dir.path()).unwrap(), EventBus::new()).unwrap();
        let stored = auth.game_progress("Vex").unwrap();
        assert_eq!(stored.snapshot, snapshot);
        assert!(stored.last_played >= before);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut auth = fresh();
        auth.register("Kirby", "pw", None).unwrap();

        let snap = ProgressSnapshot::default();
        auth.save_game_progress("Vex", &snap, 60).unwrap();
        auth.save_game_progress("Vex", &snap, 60).unwrap();
        auth.save_game_progress("Slope", &snap, 30).unwrap();

        let profile = auth.profile().unwrap();
        assert_eq!(profile.games_played, 2);
        assert_eq!(profile.play_minutes, 2);
        assert_eq!(profile.progress.len(), 2);
        assert_eq!(profile.email, "Not provided");
        assert_eq!(profile.account_label, "Username");
    }

    #[test]
    fn test_progress_is_per_user() {
        let mut auth = fresh();
        auth.register("one", "pw", None).unwrap();
        auth.save_game_progress("Vex", &ProgressSnapshot::default(), 0)
            .unwrap();

        auth.register("two", "pw", None).unwrap();
        assert!(auth.game_progress("Vex").is_none());
    }

    #[test]
    fn test_clear_all_progress() {
        let mut auth = fresh();
        assert!(matches!(
            auth.clear_all_progress(),
            Err(AuthError::NotLoggedIn)
        ));

        auth.register("Kirby", "pw", None).unwrap();
        auth.save_game_progress("Vex", &ProgressSnapshot::default(), 120)
            .unwrap();
        auth.clear_all_progress().unwrap();

        assert!(auth.all_progress().is_none());
        let profile = auth.profile().unwrap();
        assert_eq!(profile.games_played, 0);
        assert_eq!(profile.play_minutes, 0);
    }

    #[test]
    fn test_toggle_favorite_mirrors_into_stats() {
        let mut auth = fresh();
        let vex = game("Vex");

        // anonymous toggles only touch the shared list
        assert!(auth.toggle_favorite(&vex).unwrap());
        assert!(!auth.toggle_favorite(&vex).unwrap());

        auth.register("Kirby", "pw", None).unwrap();
        assert!(auth.toggle_favorite(&vex).unwrap());
        assert_eq!(auth.profile().unwrap().favorite_count, 1);

        assert!(!auth.toggle_favorite(&vex).unwrap());
        assert_eq!(auth.profile().unwrap().favorite_count, 0);
        assert!(auth.database().favorites().unwrap().is_empty());
    }
}
