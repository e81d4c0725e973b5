//! Immutable record of the window intents a page fetch should honour.
//!
//! Intents are added with by-value builder methods; [`crate::paging::materialize`]
//! consumes the finished plan. Re-planning means building a second plan.

use crate::error::{PagingError, PagingResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagePlan {
    /// Rows to skip, including the cursor row itself.
    pub(crate) skip_count: i64,
    pub(crate) skip_requested: bool,
    pub(crate) take_count: i64,
    pub(crate) take_requested: bool,
    pub(crate) take_last_count: i64,
    pub(crate) take_last_requested: bool,
    /// Take size implied by the `before` bound alone.
    pub(crate) take_before_count: i64,
    pub(crate) take_before_requested: bool,
    pub(crate) materialize: bool,
}

impl PagePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip everything up to and including `index`.
    ///
    /// Must come before any take: take sizing depends on whether a skip is active.
    pub fn skip_including(mut self, index: Option<i64>) -> PagingResult<Self> {
        let Some(index) = index else {
            return Ok(self);
        };
        if self.take_requested {
            return Err(PagingError::Protocol(
                "skip cannot be requested after take".to_string(),
            ));
        }
        // Cursors past any real sequence saturate; the window simply comes back empty.
        self.skip_count = self.skip_count.saturating_add(index.saturating_add(1));
        self.skip_requested = true;
        Ok(self)
    }

    /// Take at most `count` rows, narrowing any earlier take.
    pub fn take(mut self, count: Option<i64>) -> Self {
        if let Some(count) = count {
            self.take_count = if self.take_requested {
                self.take_count.min(count)
            } else {
                count
            };
            self.take_requested = true;
        }
        self
    }

    /// Keep only the last `count` rows of the forward window.
    pub fn take_last(mut self, count: Option<i64>) -> Self {
        if let Some(count) = count {
            self.take_last_count = if self.take_last_requested {
                self.take_last_count.min(count)
            } else {
                count
            };
            self.take_last_requested = true;
        }
        self
    }

    /// Stop before absolute position `index`.
    pub fn take_before(mut self, index: Option<i64>) -> Self {
        let Some(index) = index else {
            return self;
        };
        let count = if self.skip_requested {
            (index - self.skip_count).max(0)
        } else {
            index
        };
        self.take_before_count = if self.take_before_requested {
            self.take_before_count.min(count)
        } else {
            count
        };
        self.take_before_requested = true;
        self.take(Some(count))
    }

    /// Materialize even when no window intent was given.
    pub fn force_materialize(mut self, force: bool) -> Self {
        self.materialize |= force;
        self
    }

    /// True when nothing would change the plain sequence.
    pub fn is_passthrough(&self) -> bool {
        !self.skip_requested
            && !self.take_requested
            && !self.take_last_requested
            && !self.take_before_requested
            && !self.materialize
    }

    /// Whether the effective take is exactly what `before` allowed, so reaching
    /// the sentinel row says nothing about rows inside the window.
    pub(crate) fn before_budget_exhausted(&self) -> bool {
        self.take_before_requested && self.take_count >= self.take_before_count
    }
}
