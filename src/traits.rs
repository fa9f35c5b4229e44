use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Grade for a completed recall attempt, 0 (blackout) through 5 (effortless).
pub type Grade = u8;

/// Lowest grade that still counts as a successful recall.
pub const MIN_PASS_GRADE: Grade = 3;

/// Highest grade a recall attempt can receive.
pub const MAX_GRADE: Grade = 5;

/// The kind of exercise an item resolves into.
///
/// Serialized lowercase, matching catalogs written by earlier versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    /// A single note, one step of one symbol.
    Note,
    /// Simultaneous notes, one step holding the whole constituent set.
    Chord,
    /// A run of notes, one single-symbol step per degree, in ascending order.
    Scale,
}

/// A learnable unit carrying its spaced repetition statistics.
///
/// Items are created when the catalog is seeded and only ever mutated by the
/// recall model after a graded attempt. The name is the primary key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Item {
    pub name: String,
    pub recalls: u32,
    pub ease_factor: f32,
    pub interval_days: u32,
    pub exercise_type: ExerciseKind,
    pub exercise_definition: String,
    /// None means never recalled, which makes the item always due.
    pub last_recalled_at: Option<SystemTime>,
}

impl Item {
    /// Create a fresh item with the statistics every seeded item starts with.
    pub fn new(name: &str, exercise_type: ExerciseKind, exercise_definition: &str) -> Self {
        Item {
            name: name.to_owned(),
            recalls: 0,
            ease_factor: 2.5,
            interval_days: 0,
            exercise_type,
            exercise_definition: exercise_definition.to_owned(),
            last_recalled_at: None,
        }
    }

    /// The moment this item becomes due again. Items that were never recalled
    /// report the epoch, so they are due at any wall clock time.
    pub fn next_recall_time(&self) -> SystemTime {
        match self.last_recalled_at {
            Some(t) => t + Duration::from_secs(60 * 60 * 24 * u64::from(self.interval_days)),
            None => UNIX_EPOCH,
        }
    }
}

/// Failure to read or write the item store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Failure to resolve an item's exercise definition into steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("unknown note name: {0:?}")]
    UnknownNote(String),

    #[error("unknown chord quality: {0:?}")]
    UnknownChord(String),

    #[error("unknown scale: {0:?}")]
    UnknownScale(String),
}

/// Errors surfaced by the session orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("grade {0} out of range, a passed exercise is graded {MIN_PASS_GRADE} to {MAX_GRADE}")]
    InvalidGrade(Grade),

    #[error("exercise has not been passed")]
    NotPassed,

    #[error("no exercise is active")]
    NoActiveExercise,
}

/// Something that persists items, keyed by name. Upserts are atomic per key
/// and last-write-wins.
pub trait ItemStore: std::fmt::Debug {
    /// Retrieve all items, in a stable order.
    fn get_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Insert or replace the item with the same name.
    fn upsert(&mut self, item: &Item) -> Result<(), StoreError>;
}
