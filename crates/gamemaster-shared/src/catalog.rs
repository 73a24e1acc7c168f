//! Game catalog and the catalog page's filtering rules.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{CATEGORY_ALL, CATEGORY_FAVORITES};
use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../data/games.json");

/// One catalog entry. `url` is the embedded game's address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntry {
    pub title: String,
    pub url: String,
    pub image: String,
    pub category: String,
}

/// Which slice of the catalog to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Favorites,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            CATEGORY_ALL => Self::All,
            CATEGORY_FAVORITES => Self::Favorites,
            other => Self::Named(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<GameEntry>,
}

impl Catalog {
    pub fn new(games: Vec<GameEntry>) -> Self {
        Self { games }
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn games(&self) -> &[GameEntry] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// `All`, `Favorites`, then each distinct category in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![CATEGORY_ALL.to_string(), CATEGORY_FAVORITES.to_string()];
        for game in &self.games {
            if !out[2..].contains(&game.category) {
                out.push(game.category.clone());
            }
        }
        out
    }

    pub fn find(&self, title: &str) -> Option<&GameEntry> {
        let wanted = title.trim().to_lowercase();
        self.games.iter().find(|g| g.title.to_lowercase() == wanted)
    }

    /// Apply the category filter, then a case-insensitive title search.
    pub fn filter<'a, S: AsRef<str>>(
        &'a self,
        category: &CategoryFilter,
        search: &str,
        favorite_titles: &[S],
    ) -> Vec<&'a GameEntry> {
        let search = search.trim().to_lowercase();

        self.games
            .iter()
            .filter(|game| match category {
                CategoryFilter::All => true,
                CategoryFilter::Favorites => {
                    favorite_titles.iter().any(|t| t.as_ref() == game.title)
                }
                CategoryFilter::Named(name) => &game.category == name,
            })
            .filter(|game| search.is_empty() || game.title.to_lowercase().contains(&search))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, category: &str) -> GameEntry {
        GameEntry {
            title: title.to_string(),
            url: format!("https://games.example/{}", title.to_lowercase()),
            image: format!("{title}.png"),
            category: category.to_string(),
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            entry("Vex", "Platformer"),
            entry("Slope", "Arcade"),
            entry("Vex 4", "Platformer"),
            entry("Tetris", "Puzzle"),
        ])
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(
            sample().categories(),
            vec!["All", "Favorites", "Platformer", "Arcade", "Puzzle"]
        );
    }

    #[test]
    fn test_filter_by_category_and_search() {
        let catalog = sample();
        let none: [&str; 0] = [];

        let platformers = catalog.filter(&CategoryFilter::parse("Platformer"), "", &none);
        assert_eq!(platformers.len(), 2);

        let searched = catalog.filter(&CategoryFilter::All, "  VEX ", &none);
        let titles: Vec<_> = searched.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Vex", "Vex 4"]);

        assert!(catalog
            .filter(&CategoryFilter::Named("Racing".into()), "", &none)
            .is_empty());
    }

    #[test]
    fn test_filter_favorites() {
        let catalog = sample();
        let favs = vec!["Tetris".to_string(), "Not In Catalog".to_string()];
        let shown = catalog.filter(&CategoryFilter::Favorites, "", &favs[..]);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Tetris");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(sample().find("slope").unwrap().title, "Slope");
        assert!(sample().find("pong").is_none());
    }
}
