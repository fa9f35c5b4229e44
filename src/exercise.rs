//! The answer matching state machine.
//!
//! An [`Exercise`] is built from one item when that item comes up in a
//! session and validates the learner's playing symbol by symbol. Within a
//! step the order of symbols does not matter, across steps the order is
//! strict.

use crate::theory::{self, PitchClass};
use crate::traits::{DefinitionError, ExerciseKind, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseState {
    InProgress,
    Fail,
    Pass,
}

/// A single attempt at one item.
#[derive(Debug, Clone)]
pub struct Exercise {
    name: String,
    steps: Vec<Vec<PitchClass>>,
    current_step: usize,
    current_notes: Vec<PitchClass>,
    state: ExerciseState,
}

impl Exercise {
    /// Resolve an item's definition into expected steps.
    pub fn from_item(item: &Item) -> Result<Exercise, DefinitionError> {
        let steps = match item.exercise_type {
            ExerciseKind::Note => vec![vec![theory::parse_note(&item.exercise_definition)?]],
            ExerciseKind::Chord => vec![theory::chord_notes(&item.exercise_definition)?],
            ExerciseKind::Scale => theory::scale_notes(&item.exercise_definition)?
                .into_iter()
                .map(|note| vec![note])
                .collect(),
        };
        Ok(Exercise::new(&item.name, steps))
    }

    pub fn new(name: &str, steps: Vec<Vec<PitchClass>>) -> Exercise {
        debug_assert!(steps.iter().all(|step| !step.is_empty()));
        debug_assert!(!steps.is_empty());
        Exercise {
            name: name.to_owned(),
            steps,
            current_step: 0,
            current_notes: vec![],
            state: ExerciseState::InProgress,
        }
    }

    /// Feed one played symbol. Returns the state after the transition; once
    /// the exercise has failed or passed further input is ignored until
    /// [`Exercise::reset`].
    pub fn progress(&mut self, note: PitchClass) -> ExerciseState {
        if self.state != ExerciseState::InProgress {
            return self.state;
        }

        // Ignore repeated notes within the step, keys retrigger.
        if self.current_notes.contains(&note) {
            return self.state;
        }

        if !self.steps[self.current_step].contains(&note) {
            self.state = ExerciseState::Fail;
            return self.state;
        }

        self.current_notes.push(note);

        // Step complete once every expected note was seen.
        if self.current_notes.len() == self.steps[self.current_step].len() {
            self.current_step += 1;
            self.current_notes.clear();
            if self.current_step >= self.steps.len() {
                self.state = ExerciseState::Pass;
            }
        }

        self.state
    }

    /// Start the same expected sequence over, a retry rather than a new
    /// grading event.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.current_notes.clear();
        self.state = ExerciseState::InProgress;
    }

    pub fn state(&self) -> ExerciseState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the step currently awaiting input; equals
    /// [`Exercise::step_count`] once passed.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// The notes the current step still accepts, for hint display. Empty
    /// once the exercise has passed.
    pub fn expected(&self) -> &[PitchClass] {
        self.steps.get(self.current_step).map_or(&[], Vec::as_slice)
    }

    /// The notes of the current step played so far.
    pub fn current_notes(&self) -> &[PitchClass] {
        &self.current_notes
    }
}
