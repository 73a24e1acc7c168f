/// Application name
pub const APP_NAME: &str = "The Game Master";

/// Storage keys, one JSON document each
pub const USERS_KEY: &str = "gamemaster_users_v2";
pub const SESSION_KEY: &str = "gamemaster_session_v2";
pub const PROGRESS_KEY: &str = "gamemaster_progress_v2";
pub const FAVORITES_KEY: &str = "favoriteGames";
pub const RECENTLY_PLAYED_KEY: &str = "recentlyPlayed";
pub const LOGIN_PROMPT_KEY: &str = "gamemaster_login_prompt_v2";

/// Minimum username length in characters
pub const MIN_USERNAME_LEN: usize = 3;

/// Prefix for generated user ids
pub const USER_ID_PREFIX: &str = "user_";

/// Random base36 characters in user and session ids
pub const RANDOM_ID_LEN: usize = 22;

/// Recently played list is capped at this many entries
pub const RECENTLY_PLAYED_LIMIT: usize = 5;

/// Progress tracker autosave interval in seconds
pub const AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Login state poll interval in seconds
pub const LOGIN_POLL_INTERVAL_SECS: u64 = 1;

/// Delay before the "sign in to save" prompt appears
pub const LOGIN_PROMPT_DELAY_SECS: u64 = 10;

/// The prompt hides itself after this long
pub const LOGIN_PROMPT_AUTO_CLOSE_SECS: u64 = 15;

/// A dismissed prompt stays away for 5 minutes
pub const LOGIN_PROMPT_COOLDOWN_SECS: i64 = 300;

/// Catalog pseudo-categories
pub const CATEGORY_ALL: &str = "All";
pub const CATEGORY_FAVORITES: &str = "Favorites";
