//! Saved chord progressions.
//!
//! [`FavoritesStore`] loads its state once from a [`KeyValueStorage`],
//! derives a new immutable [`FavoritesState`] for each change and writes
//! the whole list back as a single JSON value under [`STORAGE_KEY`].

pub mod item;
pub mod storage;
pub mod store;

pub use item::{FavoriteItem, FavoritesState, SavedProgression};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{FavoritesStore, STORAGE_KEY};
