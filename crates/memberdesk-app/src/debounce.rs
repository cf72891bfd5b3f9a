// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const MIN_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coalesces bursts of changes into a single trigger once things go quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    window: Duration,
    dirty_since: Option<Instant>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(MIN_DEBOUNCE)
    }
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(MIN_DEBOUNCE),
            dirty_since: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn mark(&mut self, now: Instant) {
        self.dirty_since = Some(now);
    }

    pub fn cancel(&mut self) {
        self.dirty_since = None;
    }

    /// True exactly once after `window` has passed since the last mark.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.dirty_since {
            Some(since) if now.saturating_duration_since(since) >= self.window => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }
}
