//! Shared handle to the [`AuthSystem`].
//!
//! The portal page, each embedded game's tracker and its timer tasks all
//! hold a clone of the same [`SharedAuth`].  The lock is a std mutex: every
//! storage call is synchronous and nothing holds it across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use gamemaster_store::Database;

use crate::auth::AuthSystem;
use crate::error::{AuthError, Result};
use crate::events::EventBus;

pub type SharedAuth = Arc<Mutex<AuthSystem>>;

/// Open an [`AuthSystem`] over `db` and wrap it for sharing.
pub fn shared(db: Database, events: EventBus) -> Result<SharedAuth> {
    Ok(Arc::new(Mutex::new(AuthSystem::open(db, events)?)))
}

pub fn lock(auth: &SharedAuth) -> Result<MutexGuard<'_, AuthSystem>> {
    auth.lock().map_err(|_| AuthError::LockPoisoned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_see_same_login() {
        let auth = shared(Database::open_in_memory().unwrap(), EventBus::new()).unwrap();
        let other = Arc::clone(&auth);

        lock(&auth)
            .unwrap()
            .register("Shared", "pw", None)
            .unwrap();
        assert!(lock(&other).unwrap().is_logged_in());
    }
}
