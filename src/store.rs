// Store implementations for the ItemStore trait.

use crate::traits::{ExerciseKind, Item, ItemStore, StoreError};
use serde::{Deserialize, Serialize};

/// Store that keeps all items in memory, in insertion order. It is
/// (de)serializable to easily allow reuse of it in file backed stores.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct MemoryStore {
    items: Vec<Item>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { items: vec![] }
    }

    pub fn from(items: &[Item]) -> Self {
        MemoryStore {
            items: items.to_vec(),
        }
    }
}

impl ItemStore for MemoryStore {
    fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.clone())
    }

    fn upsert(&mut self, item: &Item) -> Result<(), StoreError> {
        match self.items.iter_mut().find(|i| i.name == item.name) {
            Some(existing) => *existing = item.clone(),
            None => self.items.push(item.clone()),
        }
        Ok(())
    }
}

/// A store that reads and writes a yaml file.
#[derive(Debug)]
pub struct YamlStore {
    store: MemoryStore,
    filename: String,
}

impl YamlStore {
    /// Open a yaml store, loading data from `filename` if it exists. A
    /// missing file is seeded with the default catalog and written out, so a
    /// first run has something to practice.
    pub fn new(filename: &str) -> Result<Self, StoreError> {
        let mut store = YamlStore {
            filename: filename.to_owned(),
            store: MemoryStore::new(),
        };

        if std::path::Path::new(filename).exists() {
            let file = std::fs::File::open(filename)?;
            let yaml: serde_yaml::Value = serde_yaml::from_reader(file)?;
            store.store = serde_yaml::from_value(yaml)?;
        } else {
            tracing::debug!(filename, "no store file, seeding default catalog");
            store.store = MemoryStore::from(&default_catalog());
            store.write()?;
        }

        Ok(store)
    }

    /// Write the data to the disk.
    fn write(&mut self) -> Result<(), StoreError> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.filename)?;
        serde_yaml::to_writer(file, &self.store)?;
        Ok(())
    }
}

impl ItemStore for YamlStore {
    fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        self.store.get_all()
    }

    fn upsert(&mut self, item: &Item) -> Result<(), StoreError> {
        self.store.upsert(item)?;
        self.write()
    }
}

/// Write a catalog to a yaml file that [`YamlStore`] can open.
pub fn save_catalog(filename: &str, items: &[Item]) -> Result<(), StoreError> {
    use std::fs::OpenOptions;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(filename)?;
    serde_yaml::to_writer(file, &MemoryStore::from(items))?;
    Ok(())
}

fn chord_item(root: &str, quality: &str) -> Item {
    Item::new(
        &format!("{root}{quality} (chord)"),
        ExerciseKind::Chord,
        &format!("{root}{quality}"),
    )
}

fn scale_item(root: &str, form: &str) -> Item {
    Item::new(
        &format!("{root} {form} (scale)"),
        ExerciseKind::Scale,
        &format!("{root} {form}"),
    )
}

/// The catalog a fresh store is seeded with: every common spelling of the
/// twelve roots, with its note, five chords and the major scale.
pub fn default_catalog() -> Vec<Item> {
    let roots = [
        "Ab", "A", "A#", "Bb", "B", "C", "C#", "Db", "D", "D#", "Eb", "E", "F", "F#", "Gb", "G",
        "G#",
    ];

    let mut items = vec![];
    for root in roots {
        items.push(Item::new(
            &format!("{root} (note)"),
            ExerciseKind::Note,
            root,
        ));

        for quality in ["maj", "min", "dom7", "aug", "dim"] {
            items.push(chord_item(root, quality));
        }

        items.push(scale_item(root, "maj"));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::Exercise;

    #[test]
    fn upsert_replaces_by_name() {
        let mut store = MemoryStore::new();
        let mut item = Item::new("C (note)", ExerciseKind::Note, "C");
        store.upsert(&item).unwrap();
        item.recalls = 3;
        store.upsert(&item).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].recalls, 3);
    }

    #[test]
    fn get_all_keeps_insertion_order() {
        let mut store = MemoryStore::new();
        for name in ["b", "a", "c"] {
            store.upsert(&Item::new(name, ExerciseKind::Note, "C")).unwrap();
        }
        let names: Vec<String> = store.get_all().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["b".to_owned(), "a".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn default_catalog_resolves_completely() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 17 * 7);
        for item in &catalog {
            Exercise::from_item(item).expect("seeded definitions must resolve");
            assert_eq!(item.recalls, 0);
            assert_eq!(item.interval_days, 0);
            assert!((item.ease_factor - 2.5).abs() < 1e-6);
            assert!(item.last_recalled_at.is_none());
        }
    }

    #[test]
    fn yaml_store_seeds_and_round_trips() {
        let dir = std::env::temp_dir().join(format!("chordist-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("items.yaml");
        let path = path.to_str().unwrap();

        {
            let mut store = YamlStore::new(path).unwrap();
            assert_eq!(store.get_all().unwrap().len(), default_catalog().len());

            let mut item = store.get_all().unwrap()[0].clone();
            item.recalls = 2;
            item.interval_days = 6;
            store.upsert(&item).unwrap();
        }

        // Reopen from disk, the upsert must have stuck and nothing reseeds.
        let store = YamlStore::new(path).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), default_catalog().len());
        assert_eq!(all[0].recalls, 2);
        assert_eq!(all[0].interval_days, 6);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
