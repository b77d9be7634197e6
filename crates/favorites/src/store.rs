//! Favorites lifecycle: load or default, mutate, persist.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::item::{FavoriteItem, FavoritesState, SavedProgression};
use crate::storage::KeyValueStorage;

pub const STORAGE_KEY: &str = "chordwise-favorites";

/// Owns the current state and writes the whole of it on every change.
pub struct FavoritesStore<S: KeyValueStorage> {
    storage: S,
    state: FavoritesState,
}

fn load_state(storage: &dyn KeyValueStorage) -> FavoritesState {
    let text = match storage.read(STORAGE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return FavoritesState::default(),
        Err(e) => {
            warn!(error = %e, "favorites unreadable, starting empty");
            return FavoritesState::default();
        }
    };

    match serde_json::from_str::<FavoritesState>(&text) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "favorites corrupt, starting empty");
            FavoritesState::default()
        }
    }
}

impl<S: KeyValueStorage> FavoritesStore<S> {
    /// Never fails: missing or corrupt data gives an empty store.
    pub fn init(storage: S) -> Self {
        let state = load_state(&storage);
        info!(items = state.len(), "favorites loaded");
        Self { storage, state }
    }

    pub fn state(&self) -> &FavoritesState {
        &self.state
    }

    pub fn items(&self) -> &[FavoriteItem] {
        self.state.items()
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteItem> {
        self.state.get(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The new state is kept only once it has been written.
    fn commit(&mut self, next: FavoritesState) -> Result<()> {
        let json = serde_json::to_string(&next).context("serializing favorites")?;
        self.storage
            .write(STORAGE_KEY, &json)
            .context("persisting favorites")?;
        debug!(items = next.len(), "favorites persisted");
        self.state = next;
        Ok(())
    }

    pub fn save(&mut self, name: impl Into<String>, data: SavedProgression) -> Result<FavoriteItem> {
        let item = FavoriteItem::new(name, data);
        self.commit(self.state.add(item.clone()))?;
        Ok(item)
    }

    /// `false` when `id` is unknown.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        match self.state.remove(id) {
            Some(next) => self.commit(next).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<bool> {
        match self.state.rename(id, name) {
            Some(next) => self.commit(next).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn replace(&mut self, id: &str, data: SavedProgression) -> Result<bool> {
        match self.state.replace(id, data) {
            Some(next) => self.commit(next).map(|_| true),
            None => Ok(false),
        }
    }
}
