//! Favorites survive a restart through the file backend.
//!
//! Verifies:
//! - saved chords come back in the same order
//! - items keep their insertion order and ids
//! - a corrupt file loads as an empty store and is overwritten on save

use std::fs;

use favorites::{FavoritesStore, FileStorage, SavedProgression, STORAGE_KEY};
use music_theory::{Note, ScaleType};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn progression(chords: &[&str]) -> SavedProgression {
    SavedProgression {
        key: Note::Eb,
        scale_type: ScaleType::Major,
        genre: "jazz".to_string(),
        chords: chords.iter().map(|c| c.to_string()).collect(),
    }
}

#[test]
fn test_chords_round_trip_in_order() {
    let dir = TempDir::new().unwrap();
    let chords = ["Fm7", "A#7", "D#maj7", "Cm7", "F7", "Bb7"];

    let id = {
        let mut store = FavoritesStore::init(FileStorage::new(dir.path()));
        store.save("turnaround", progression(&chords)).unwrap().id
    };

    let store = FavoritesStore::init(FileStorage::new(dir.path()));
    let item = store.get(&id).unwrap();
    assert_eq!(item.data.chords, chords);
    assert_eq!(item.data.key, Note::Eb);
    assert_eq!(item.name, "turnaround");
}

#[test]
fn test_items_keep_insertion_order() {
    let dir = TempDir::new().unwrap();
    let mut store = FavoritesStore::init(FileStorage::new(dir.path()));
    let first = store.save("one", progression(&["C"])).unwrap();
    let second = store.save("two", progression(&["G"])).unwrap();
    let third = store.save("three", progression(&["F"])).unwrap();
    store.delete(&second.id).unwrap();

    let reloaded = FavoritesStore::init(FileStorage::new(dir.path()));
    let ids: Vec<&str> = reloaded.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, [first.id.as_str(), third.id.as_str()]);
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    fs::write(storage.path_for(STORAGE_KEY), "][").unwrap();

    let mut store = FavoritesStore::init(storage);
    assert!(store.items().is_empty());

    store.save("fresh", progression(&["C", "F"])).unwrap();
    let reloaded = FavoritesStore::init(FileStorage::new(dir.path()));
    assert_eq!(reloaded.items().len(), 1);
}
