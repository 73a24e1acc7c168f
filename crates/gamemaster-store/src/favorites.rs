//! Favorites and recently played lists.  Both are keyed by game title and
//! shared by everyone using this storage partition.

use gamemaster_shared::catalog::GameEntry;
use gamemaster_shared::constants::{FAVORITES_KEY, RECENTLY_PLAYED_KEY, RECENTLY_PLAYED_LIMIT};

use crate::database::Database;
use crate::error::Result;
use crate::models::{FavoriteGame, RecentGame};

impl Database {
    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    pub fn favorites(&self) -> Result<Vec<FavoriteGame>> {
        self.read_document_or_default(FAVORITES_KEY)
    }

    pub fn favorite_titles(&self) -> Result<Vec<String>> {
        Ok(self.favorites()?.into_iter().map(|f| f.title).collect())
    }

    pub fn is_favorite(&self, title: &str) -> Result<bool> {
        Ok(self.favorites()?.iter().any(|f| f.title == title))
    }

    /// Add or remove `game`.  Returns `true` if it is a favorite afterwards.
    pub fn toggle_favorite(&self, game: &GameEntry) -> Result<bool> {
        let mut favorites = self.favorites()?;

        let now_favorite = match favorites.iter().position(|f| f.title == game.title) {
            Some(idx) => {
                favorites.remove(idx);
                false
            }
            None => {
                favorites.push(FavoriteGame::from(game));
                true
            }
        };

        self.write_document(FAVORITES_KEY, &favorites)?;
        Ok(now_favorite)
    }

    // ------------------------------------------------------------------
    // Recently played
    // ------------------------------------------------------------------

    /// Newest first.
    pub fn recently_played(&self) -> Result<Vec<RecentGame>> {
        self.read_document_or_default(RECENTLY_PLAYED_KEY)
    }

    /// Move `game` to the front, dropping duplicates and anything past the cap.
    pub fn record_played(&self, game: &GameEntry) -> Result<Vec<RecentGame>> {
        let mut recent = self.recently_played()?;
        recent.retain(|r| r.title != game.title);
        recent.insert(0, RecentGame::from(game));
        recent.truncate(RECENTLY_PLAYED_LIMIT);

        self.write_document(RECENTLY_PLAYED_KEY, &recent)?;
        Ok(recent)
    }

    pub fn remove_recent(&self, title: &str) -> Result<bool> {
        let mut recent = self.recently_played()?;
        let before = recent.len();
        recent.retain(|r| r.title != title);

        if recent.len() == before {
            return Ok(false);
        }
        self.write_document(RECENTLY_PLAYED_KEY, &recent)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(title: &str) -> GameEntry {
        GameEntry {
            title: title.to_string(),
            url: format!("https://games.example/{title}"),
            image: format!("{title}.png"),
            category: "Arcade".to_string(),
        }
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let db = Database::open_in_memory().unwrap();
        let slope = game("Slope");
        db.toggle_favorite(&game("Tetris")).unwrap();
        let before = db.favorites().unwrap();

        assert!(db.toggle_favorite(&slope).unwrap());
        assert!(db.is_favorite("Slope").unwrap());
        assert!(!db.toggle_favorite(&slope).unwrap());

        assert_eq!(db.favorites().unwrap(), before);
    }

    #[test]
    fn test_favorite_keeps_category() {
        let db = Database::open_in_memory().unwrap();
        db.toggle_favorite(&game("Slope")).unwrap();
        let favs = db.favorites().unwrap();
        assert_eq!(favs[0].category, "Arcade");
        assert_eq!(db.favorite_titles().unwrap(), vec!["Slope".to_string()]);
    }

    #[test]
    fn test_recent_dedupes_and_caps() {
        let db = Database::open_in_memory().unwrap();
        for title in ["A", "B", "C", "D", "E", "F"] {
            db.record_played(&game(title)).unwrap();
        }
        let recent = db.record_played(&game("C")).unwrap();

        let titles: Vec<_> = recent.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "F", "E", "D", "B"]);
        assert_eq!(db.recently_played().unwrap(), recent);
    }

    #[test]
    fn test_remove_recent() {
        let db = Database::open_in_memory().unwrap();
        db.record_played(&game("A")).unwrap();
        db.record_played(&game("B")).unwrap();

        assert!(db.remove_recent("A").unwrap());
        assert!(!db.remove_recent("A").unwrap());
        assert_eq!(db.recently_played().unwrap().len(), 1);
    }
}
