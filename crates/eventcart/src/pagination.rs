//! # Incremental Pagination
//!
//! The catalog view reveals filtered results a page at a time, driven by a
//! scroll-proximity signal that can fire much faster than a page renders.
//!
//! The controller holds a cursor and a [`LoadPhase`]. Starting a load checks
//! and flips the phase inside one critical section, so at most one page load
//! is in flight no matter how often the signal fires:
//!
//! ```text
//!   Idle ──begin()──► InProgress ──finish()──► Idle (cursor += page)
//!                          │
//!                          └──drop──► Idle (cursor unchanged)
//! ```
//!
//! [`PaginationController::reset`] rewinds the cursor when the filter changes.
//! A load that was already in flight when the reset happened finishes without
//! moving the new cursor.

use std::future::Future;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    InProgress,
}

#[derive(Debug)]
struct PagerState {
    cursor: usize,
    phase: LoadPhase,
    generation: u64,
}

#[derive(Debug)]
pub struct PaginationController {
    page_size: usize,
    state: Mutex<PagerState>,
}

impl PaginationController {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(PagerState {
                cursor: 0,
                phase: LoadPhase::Idle,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items revealed so far.
    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    pub fn phase(&self) -> LoadPhase {
        self.lock().phase
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.lock().cursor < total
    }

    /// The revealed prefix of a list of `total` items.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        0..self.lock().cursor.min(total)
    }

    /// Rewind to the start, e.g. after the filter criteria change.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.cursor = 0;
        state.generation += 1;
    }

    /// Claim the next page of a list of `total` items.
    ///
    /// Returns `None` when a load is already in flight or everything is
    /// already revealed.
    pub fn begin(&self, total: usize) -> Option<PageLoad<'_>> {
        let mut state = self.lock();
        if state.phase == LoadPhase::InProgress {
            tracing::debug!("load_more ignored: page load already in progress");
            return None;
        }
        if state.cursor >= total {
            return None;
        }

        state.phase = LoadPhase::InProgress;
        let start = state.cursor;
        let end = (start + self.page_size).min(total);
        Some(PageLoad {
            controller: self,
            range: start..end,
            generation: state.generation,
            finished: false,
        })
    }

    /// Reveal the next page, handing the newly exposed slice to `render`.
    ///
    /// Returns the revealed range, or `None` if the call was a no-op.
    pub async fn load_more<'s, T, F, Fut>(&self, items: &'s [T], render: F) -> Option<Range<usize>>
    where
        F: FnOnce(&'s [T]) -> Fut,
        Fut: Future<Output = ()>,
    {
        let load = self.begin(items.len())?;
        render(&items[load.range()]).await;
        Some(load.finish())
    }
}

/// An in-flight page load. Holding it keeps the controller `InProgress`.
#[derive(Debug)]
pub struct PageLoad<'a> {
    controller: &'a PaginationController,
    range: Range<usize>,
    generation: u64,
    finished: bool,
}

impl PageLoad<'_> {
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Commit the page: advance the cursor and return to `Idle`.
    pub fn finish(mut self) -> Range<usize> {
        self.finished = true;
        let mut state = self.controller.lock();
        if state.generation == self.generation {
            state.cursor = self.range.end;
        }
        state.phase = LoadPhase::Idle;
        self.range.clone()
    }
}

impl Drop for PageLoad<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.controller.lock().phase = LoadPhase::Idle;
        }
    }
}
