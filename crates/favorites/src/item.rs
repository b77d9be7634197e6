use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use music_theory::{Note, ScaleType};

/// A progression as the user built it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProgression {
    pub key: Note,
    pub scale_type: ScaleType,
    pub genre: String,
    /// Chord ids in play order.
    pub chords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub data: SavedProgression,
}

impl FavoriteItem {
    /// New item with a fresh v4 id.
    pub fn new(name: impl Into<String>, data: SavedProgression) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            data,
        }
    }
}

/// Every saved item, oldest first. Mutations return a new state and leave
/// `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesState {
    items: Vec<FavoriteItem>,
}

impl FavoritesState {
    pub fn from_items(items: Vec<FavoriteItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&self, item: FavoriteItem) -> Self {
        let mut items = self.items.clone();
        items.push(item);
        Self { items }
    }

    /// `None` when no item has `id`.
    pub fn remove(&self, id: &str) -> Option<Self> {
        self.get(id)?;
        let items = self.items.iter().filter(|item| item.id != id).cloned().collect();
        Some(Self { items })
    }

    pub fn rename(&self, id: &str, name: &str) -> Option<Self> {
        self.update(id, |item| item.name = name.to_string())
    }

    /// Swap the whole progression of an item, keeping id, name and date.
    pub fn replace(&self, id: &str, data: SavedProgression) -> Option<Self> {
        self.update(id, move |item| item.data = data)
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut FavoriteItem)) -> Option<Self> {
        let position = self.items.iter().position(|item| item.id == id)?;
        let mut items = self.items.clone();
        change(&mut items[position]);
        Some(Self { items })
    }
}
