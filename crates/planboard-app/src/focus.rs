// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Focus requests for freshly inserted cells.
//!
//! The engine only announces which cell should take focus. The view may
//! not have drawn that cell yet, so it polls through [`FocusTracker`],
//! which gives up after a bounded number of attempts. A newer request
//! replaces an older one.

use crate::selection::CellCoord;

pub const DEFAULT_FOCUS_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub cell: CellCoord,
    /// Increases with every request so stale ones can be told apart.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAttempt {
    Focused(CellCoord),
    Pending { remaining: u32 },
    GaveUp(CellCoord),
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTracker {
    pending: Option<(FocusRequest, u32)>,
    generation: u64,
    max_attempts: u32,
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_ATTEMPTS)
    }
}

impl FocusTracker {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: None,
            generation: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Supersedes whatever request is still pending.
    pub fn request(&mut self, cell: CellCoord) -> FocusRequest {
        self.generation += 1;
        let request = FocusRequest {
            cell,
            generation: self.generation,
        };
        self.pending = Some((request, 0));
        request
    }

    pub fn pending(&self) -> Option<FocusRequest> {
        self.pending.map(|(request, _)| request)
    }

    /// One poll. `is_ready` reports whether the view can focus the cell now.
    pub fn attempt(&mut self, is_ready: impl FnOnce(CellCoord) -> bool) -> FocusAttempt {
        let Some((request, tries)) = self.pending.take() else {
            return FocusAttempt::Idle;
        };
        if is_ready(request.cell) {
            return FocusAttempt::Focused(request.cell);
        }
        let tries = tries + 1;
        if tries >= self.max_attempts {
            return FocusAttempt::GaveUp(request.cell);
        }
        self.pending = Some((request, tries));
        FocusAttempt::Pending {
            remaining: self.max_attempts - tries,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
