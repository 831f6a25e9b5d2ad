//! # Undo / Redo History
//!
//! History is a pair of stacks of full [`Snapshot`]s of the undoable part of
//! the session: the two cart maps and the event details. Reactions are
//! collaborative and are not part of the history.
//!
//! ## Stack Discipline
//!
//! The top of the undo stack always mirrors the current committed state, and
//! the bottom entry is the baseline captured at load time:
//!
//! ```text
//! undo: [baseline, s1, s2]   redo: []        state == s2
//! undo()  ->  undo: [baseline, s1]   redo: [s2]   state == s1
//! redo()  ->  undo: [baseline, s1, s2] redo: []   state == s2
//! ```
//!
//! - `snapshot()` pushes a copy of the current state and clears the redo
//!   stack: a new action discards the undone future.
//! - `undo()` never pops the baseline.
//! - Snapshots are shared behind `Arc` and never edited after capture.
//!
//! Restoring runs in [`HistoryPhase::Restoring`]; `snapshot()` calls made in
//! that phase are ignored, since restoring is not a user action.

use crate::model::{CartEntry, CompositeId, EventDetails};
use crate::state::SessionState;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Immutable copy of the undoable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub favorited: IndexMap<CompositeId, CartEntry>,
    pub locked_in: IndexMap<CompositeId, CartEntry>,
    pub event_details: EventDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPhase {
    Idle,
    Restoring,
}

#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: Vec<Arc<Snapshot>>,
    redo_stack: Vec<Arc<Snapshot>>,
    phase: HistoryPhase,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            phase: HistoryPhase::Idle,
        }
    }

    /// A history whose baseline is the given state.
    pub fn with_baseline(state: &SessionState) -> Self {
        let mut history = Self::new();
        history.snapshot(state);
        history
    }

    pub fn phase(&self) -> HistoryPhase {
        self.phase
    }

    /// Record the current state as a new history entry.
    pub fn snapshot(&mut self, state: &SessionState) {
        if self.phase == HistoryPhase::Restoring {
            tracing::debug!("snapshot skipped while restoring");
            return;
        }
        self.undo_stack.push(Arc::new(state.capture()));
        self.redo_stack.clear();
    }

    /// Drop all history and make the current state the new baseline.
    pub fn reset_baseline(&mut self, state: &SessionState) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.phase = HistoryPhase::Idle;
        self.snapshot(state);
    }

    /// Step back one entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, state: &mut SessionState) -> bool {
        if self.undo_stack.len() <= 1 {
            tracing::debug!("undo ignored: at baseline");
            return false;
        }
        if let Some(top) = self.undo_stack.pop() {
            self.redo_stack.push(top);
        }
        match self.undo_stack.last().cloned() {
            Some(previous) => {
                self.restore(&previous, state);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone entry. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self, state: &mut SessionState) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            tracing::debug!("redo ignored: nothing undone");
            return false;
        };
        self.undo_stack.push(Arc::clone(&next));
        self.restore(&next, state);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Enter the `Restoring` phase until the returned guard is dropped.
    fn restoring(&mut self) -> RestoreGuard<'_> {
        self.phase = HistoryPhase::Restoring;
        RestoreGuard { history: self }
    }

    fn restore(&mut self, snapshot: &Snapshot, state: &mut SessionState) {
        let _guard = self.restoring();
        state.restore(snapshot);
    }
}

/// Keeps a [`HistoryManager`] in the `Restoring` phase while alive.
struct RestoreGuard<'a> {
    history: &'a mut HistoryManager,
}

impl Deref for RestoreGuard<'_> {
    type Target = HistoryManager;

    fn deref(&self) -> &HistoryManager {
        self.history
    }
}

impl DerefMut for RestoreGuard<'_> {
    fn deref_mut(&mut self) -> &mut HistoryManager {
        self.history
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.history.phase = HistoryPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CartEntry, CompositeId, DetailType};

    fn mutate_and_snapshot(
        history: &mut HistoryManager,
        state: &mut SessionState,
        f: impl FnOnce(&mut SessionState),
    ) {
        f(state);
        history.snapshot(state);
    }

    #[test]
    fn undo_on_fresh_history_is_noop() {
        let mut state = SessionState::default();
        state.favorite(CompositeId::item("a"), CartEntry::new(1));
        let mut history = HistoryManager::with_baseline(&state);
        let before = state.capture();

        assert!(!history.undo(&mut state));
        assert_eq!(state.capture(), before);
        assert_eq!(history.redo_depth(), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(2));
        });
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.set_detail(DetailType::Location, "Park");
        });

        let before_undo = state.capture();
        assert!(history.undo(&mut state));
        assert_eq!(state.event_details.get(DetailType::Location), None);
        assert!(history.can_redo());

        assert!(history.redo(&mut state));
        assert_eq!(state.capture(), before_undo);
    }

    #[test]
    fn undo_walks_back_to_baseline_and_stops() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        let baseline = state.capture();
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(1));
        });
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.lock_in(CompositeId::item("a"), CartEntry::new(1));
        });

        assert!(history.undo(&mut state));
        assert!(history.undo(&mut state));
        assert!(!history.undo(&mut state));
        assert_eq!(state.capture(), baseline);
        assert_eq!(history.redo_depth(), 2);
    }

    #[test]
    fn new_snapshot_clears_redo() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(1));
        });
        history.undo(&mut state);
        assert!(history.can_redo());

        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("b"), CartEntry::new(1));
        });
        assert!(!history.can_redo());
        assert!(!history.redo(&mut state));
    }

    #[test]
    fn redo_on_empty_stack_is_noop() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        let before = state.capture();
        assert!(!history.redo(&mut state));
        assert_eq!(state.capture(), before);
    }

    #[test]
    fn snapshot_ignored_while_restoring() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        {
            let mut guard = history.restoring();
            assert_eq!(guard.phase(), HistoryPhase::Restoring);
            state.favorite(CompositeId::item("a"), CartEntry::new(1));
            guard.snapshot(&state);
            assert_eq!(guard.undo_depth(), 1);
        }
        assert_eq!(history.phase(), HistoryPhase::Idle);

        history.snapshot(&state);
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn undo_and_redo_leave_history_idle_without_extra_entries() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(1));
        });

        assert!(history.undo(&mut state));
        assert_eq!(history.phase(), HistoryPhase::Idle);
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 1));

        assert!(history.redo(&mut state));
        assert_eq!(history.phase(), HistoryPhase::Idle);
        assert_eq!((history.undo_depth(), history.redo_depth()), (2, 0));
    }

    #[test]
    fn snapshots_are_not_mutated_by_later_changes() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(1));
        });
        state.set_quantity(&CompositeId::item("a"), 9);

        history.snapshot(&state);
        history.undo(&mut state);
        assert_eq!(state.entry(&CompositeId::item("a")).map(|e| e.quantity), Some(1));
    }

    #[test]
    fn reset_baseline_clears_both_stacks() {
        let mut state = SessionState::default();
        let mut history = HistoryManager::with_baseline(&state);
        mutate_and_snapshot(&mut history, &mut state, |s| {
            s.favorite(CompositeId::item("a"), CartEntry::new(1));
        });
        history.undo(&mut state);
        history.reset_baseline(&state);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }
}
