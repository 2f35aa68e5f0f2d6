// Undo/redo history module for the editor.

use tracing::{debug, trace};

use crate::{CanvasState, Operation};

/// Whether the visible canvas has any operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPhase {
    Empty,
    Populated,
}

/// Linear undo/redo history of canvas states.
///
/// `states[0]` is always the empty canvas and `step` always indexes a stored
/// state. Committing from anywhere but the end drops the redo entries.
/// Boundary undo/redo are no-ops, never errors.
///
/// Every mutating method returns `true` when the visible state changed.
#[derive(Debug, Clone)]
pub struct History {
    states: Vec<CanvasState>,
    step: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        debug!("Creating history with empty canvas");
        Self {
            states: vec![CanvasState::empty()],
            step: 0,
        }
    }

    /// Cut any redo entries, append `state` and move the cursor onto it.
    pub fn commit(&mut self, state: CanvasState) -> bool {
        let dropped = self.states.len() - (self.step + 1);
        self.states.truncate(self.step + 1);
        self.states.push(state);
        self.step += 1;
        debug!(
            step = self.step,
            len = self.states.len(),
            dropped_redo = dropped,
            "Committed canvas state"
        );
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.step == 0 {
            trace!("Undo at initial state ignored");
            return false;
        }
        self.step -= 1;
        debug!(step = self.step, "Undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.step + 1 == self.states.len() {
            trace!("Redo at end of history ignored");
            return false;
        }
        self.step += 1;
        debug!(step = self.step, "Redo");
        true
    }

    /// Commit an empty canvas unless the visible one is already empty.
    pub fn clear(&mut self) -> bool {
        if self.current().is_empty() {
            trace!("Clear on empty canvas ignored");
            return false;
        }
        self.commit(CanvasState::empty())
    }

    /// Replace the canvas content with a single image.
    pub fn insert_image(&mut self, image_data: impl Into<String>) -> bool {
        self.commit(CanvasState::from_ops(vec![Operation::image(image_data)]))
    }

    /// The visible canvas state.
    pub fn current(&self) -> &CanvasState {
        &self.states[self.step]
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true: the initial empty state is always present.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[CanvasState] {
        &self.states
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.states.len()
    }

    pub fn phase(&self) -> CanvasPhase {
        if self.current().is_empty() {
            CanvasPhase::Empty
        } else {
            CanvasPhase::Populated
        }
    }
}
