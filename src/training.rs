use crate::algorithm::{self, super_memo_2};
use crate::exercise::{Exercise, ExerciseState};
use crate::theory::PitchClass;
use crate::traits::{
    Grade, Item, ItemStore, TrainingError, MAX_GRADE, MIN_PASS_GRADE,
};
use rand::Rng;
use std::time::SystemTime;

/*
Implements the session flow;
    start_session:
        get all items from the store
        select the due subset
        build the exercise for the first item

    For every played note:
        play() -> Exercise::progress

    On Fail:
        retry() replays the same exercise, ungraded
        give_up() grades it 0 and advances

    On Pass:
        complete(grade 3..=5)

    Grading:
        super_memo_2::update
        stamp last_recalled_at
        upsert, commit in memory only after the write, advance
*/

/// Drives one practice session over a store of items.
///
/// Between note events this only holds the loaded catalog, the scheduled
/// names, a cursor and the active exercise. Exactly one attempt is in
/// flight at a time.
#[derive(Debug)]
pub struct Training {
    store: Box<dyn ItemStore>,
    catalog: Vec<Item>,
    session: Vec<String>,
    index: usize,
    exercise: Option<Exercise>,
}

impl Training {
    pub fn new(store: Box<dyn ItemStore>) -> Self {
        Training {
            store,
            catalog: vec![],
            session: vec![],
            index: 0,
            exercise: None,
        }
    }

    /// Load the catalog and schedule today's items. Returns the number of
    /// scheduled items; zero means there is nothing to review and no
    /// exercise becomes active.
    pub fn start_session<R: Rng>(
        &mut self,
        now: SystemTime,
        max_per_day: usize,
        rng: &mut R,
    ) -> Result<usize, TrainingError> {
        self.catalog = self.store.get_all()?;
        self.session = algorithm::select_session(&self.catalog, now, max_per_day, rng);
        self.index = 0;
        self.exercise = match self.session.first().cloned() {
            Some(name) => Some(self.exercise_for(&name)?),
            None => None,
        };
        tracing::debug!(scheduled = self.session.len(), "session started");
        Ok(self.session.len())
    }

    /// The exercise currently awaiting input, for rendering.
    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    /// Number of items in the running session.
    pub fn session_length(&self) -> usize {
        self.session.len()
    }

    /// Number of items already graded.
    pub fn completed(&self) -> usize {
        self.index
    }

    pub fn finished(&self) -> bool {
        self.index >= self.session.len()
    }

    /// Feed one played note into the active exercise.
    pub fn play(&mut self, note: PitchClass) -> Result<ExerciseState, TrainingError> {
        let exercise = self
            .exercise
            .as_mut()
            .ok_or(TrainingError::NoActiveExercise)?;
        Ok(exercise.progress(note))
    }

    /// Replay the active exercise from the start, without grading.
    pub fn retry(&mut self) -> Result<(), TrainingError> {
        let exercise = self
            .exercise
            .as_mut()
            .ok_or(TrainingError::NoActiveExercise)?;
        exercise.reset();
        Ok(())
    }

    /// Grade the current item as a failed recall (grade 0) and advance,
    /// whatever the exercise progress was.
    pub fn give_up(&mut self, now: SystemTime) -> Result<(), TrainingError> {
        if self.exercise.is_none() {
            return Err(TrainingError::NoActiveExercise);
        }
        self.grade_and_advance(0, now)
    }

    /// Grade a passed exercise and advance. The grade maps the learner's
    /// difficulty impression and must lie in
    /// [`MIN_PASS_GRADE`]..=[`MAX_GRADE`].
    pub fn complete(&mut self, grade: Grade, now: SystemTime) -> Result<(), TrainingError> {
        let exercise = self
            .exercise
            .as_ref()
            .ok_or(TrainingError::NoActiveExercise)?;
        if exercise.state() != ExerciseState::Pass {
            return Err(TrainingError::NotPassed);
        }
        if !(MIN_PASS_GRADE..=MAX_GRADE).contains(&grade) {
            return Err(TrainingError::InvalidGrade(grade));
        }
        self.grade_and_advance(grade, now)
    }

    fn exercise_for(&self, name: &str) -> Result<Exercise, TrainingError> {
        let item = self
            .catalog
            .iter()
            .find(|item| item.name == name)
            .expect("scheduled names come from the catalog");
        Ok(Exercise::from_item(item)?)
    }

    fn grade_and_advance(&mut self, grade: Grade, now: SystemTime) -> Result<(), TrainingError> {
        let name = &self.session[self.index];
        let position = self
            .catalog
            .iter()
            .position(|item| item.name == *name)
            .expect("scheduled names come from the catalog");

        let item = &self.catalog[position];
        let (recalls, ease_factor, interval_days) =
            super_memo_2::update(item.recalls, item.ease_factor, item.interval_days, grade);

        let mut updated = item.clone();
        updated.recalls = recalls;
        updated.ease_factor = ease_factor;
        updated.interval_days = interval_days;
        updated.last_recalled_at = Some(now);

        // Persist first; session state only moves once the write stuck, so a
        // store failure leaves the attempt replayable.
        if let Err(e) = self.store.upsert(&updated) {
            tracing::warn!(item = %updated.name, "failed to persist graded item");
            return Err(e.into());
        }
        tracing::debug!(item = %updated.name, grade, interval_days, "graded");
        self.catalog[position] = updated;

        self.index += 1;
        self.exercise = match self.session.get(self.index).cloned() {
            Some(next) => Some(self.exercise_for(&next)?),
            None => None,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::theory::PitchClass::*;
    use crate::traits::{ExerciseKind, StoreError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, UNIX_EPOCH};

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_000_000)
    }

    fn training_with(items: &[Item]) -> Training {
        Training::new(Box::new(MemoryStore::from(items)))
    }

    fn start(training: &mut Training) -> usize {
        training
            .start_session(now(), algorithm::MAX_ITEMS_PER_DAY, &mut StdRng::seed_from_u64(1))
            .unwrap()
    }

    #[test]
    fn empty_session_is_not_an_error() {
        let mut item = Item::new("C (note)", ExerciseKind::Note, "C");
        item.interval_days = 3;
        item.last_recalled_at = Some(now());

        let mut training = training_with(&[item]);
        assert_eq!(start(&mut training), 0);
        assert!(training.finished());
        assert!(training.exercise().is_none());
        assert!(matches!(
            training.play(C),
            Err(TrainingError::NoActiveExercise)
        ));
    }

    #[test]
    fn passing_and_grading_persists_updated_statistics() {
        let mut training = training_with(&[Item::new("Cmaj (chord)", ExerciseKind::Chord, "Cmaj")]);
        assert_eq!(start(&mut training), 1);

        assert_eq!(training.play(E).unwrap(), ExerciseState::InProgress);
        assert_eq!(training.play(C).unwrap(), ExerciseState::InProgress);
        assert_eq!(training.play(G).unwrap(), ExerciseState::Pass);
        training.complete(4, now()).unwrap();

        assert!(training.finished());
        assert!(training.exercise().is_none());

        let stored = &training.store.get_all().unwrap()[0];
        assert_eq!(stored.recalls, 1);
        assert_eq!(stored.interval_days, 1);
        assert!((stored.ease_factor - 2.5).abs() < 1e-6);
        assert_eq!(stored.last_recalled_at, Some(now()));
    }

    #[test]
    fn complete_requires_a_pass_and_a_valid_grade() {
        let mut training = training_with(&[Item::new("C (note)", ExerciseKind::Note, "C")]);
        start(&mut training);

        assert!(matches!(
            training.complete(4, now()),
            Err(TrainingError::NotPassed)
        ));

        training.play(C).unwrap();
        assert!(matches!(
            training.complete(2, now()),
            Err(TrainingError::InvalidGrade(2))
        ));
        assert!(matches!(
            training.complete(6, now()),
            Err(TrainingError::InvalidGrade(6))
        ));

        // The rejections changed nothing, a valid grade still lands.
        training.complete(5, now()).unwrap();
        assert!(training.finished());
    }

    #[test]
    fn retry_replays_without_grading() {
        let mut training = training_with(&[Item::new("C (note)", ExerciseKind::Note, "C")]);
        start(&mut training);

        assert_eq!(training.play(D).unwrap(), ExerciseState::Fail);
        training.retry().unwrap();
        assert_eq!(training.play(C).unwrap(), ExerciseState::Pass);
        training.complete(3, now()).unwrap();

        let stored = &training.store.get_all().unwrap()[0];
        assert_eq!(stored.recalls, 1);
    }

    #[test]
    fn give_up_grades_as_failure() {
        let mut item = Item::new("C (note)", ExerciseKind::Note, "C");
        item.recalls = 4;
        item.ease_factor = 2.2;
        item.interval_days = 20;
        item.last_recalled_at = Some(UNIX_EPOCH);

        let mut training = training_with(&[item]);
        start(&mut training);

        training.play(D).unwrap();
        training.give_up(now()).unwrap();

        let stored = &training.store.get_all().unwrap()[0];
        assert_eq!(stored.recalls, 0);
        assert_eq!(stored.interval_days, 1);
        assert!((stored.ease_factor - 2.2).abs() < 1e-6);
        assert_eq!(stored.last_recalled_at, Some(now()));
        assert!(training.finished());
    }

    #[test]
    fn session_walks_every_scheduled_item() {
        let items = [
            Item::new("C (note)", ExerciseKind::Note, "C"),
            Item::new("D (note)", ExerciseKind::Note, "D"),
            Item::new("E (note)", ExerciseKind::Note, "E"),
        ];
        let mut training = training_with(&items);
        assert_eq!(start(&mut training), 3);

        while !training.finished() {
            let expected = training.exercise().unwrap().expected()[0];
            assert_eq!(training.play(expected).unwrap(), ExerciseState::Pass);
            training.complete(4, now()).unwrap();
        }

        for stored in training.store.get_all().unwrap() {
            assert_eq!(stored.recalls, 1);
            assert_eq!(stored.last_recalled_at, Some(now()));
        }
    }

    /// Store whose upserts fail while the flag is set.
    #[derive(Debug)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Rc<Cell<bool>>,
    }

    impl ItemStore for FlakyStore {
        fn get_all(&self) -> Result<Vec<Item>, StoreError> {
            self.inner.get_all()
        }

        fn upsert(&mut self, item: &Item) -> Result<(), StoreError> {
            if self.failing.get() {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk unplugged",
                )));
            }
            self.inner.upsert(item)
        }
    }

    #[test]
    fn failed_upsert_leaves_the_session_replayable() {
        let failing = Rc::new(Cell::new(true));
        let store = FlakyStore {
            inner: MemoryStore::from(&[Item::new("C (note)", ExerciseKind::Note, "C")]),
            failing: failing.clone(),
        };
        let mut training = Training::new(Box::new(store));
        start(&mut training);

        training.play(C).unwrap();
        assert!(matches!(
            training.complete(4, now()),
            Err(TrainingError::Store(_))
        ));

        // Nothing advanced, the pass is still there to grade.
        assert!(!training.finished());
        assert_eq!(
            training.exercise().unwrap().state(),
            ExerciseState::Pass
        );

        // Once the store recovers the same grade goes through, computed from
        // the unmutated statistics.
        failing.set(false);
        training.complete(4, now()).unwrap();
        assert!(training.finished());
        let stored = &training.store.get_all().unwrap()[0];
        assert_eq!(stored.recalls, 1);
        assert_eq!(stored.interval_days, 1);
    }
}
