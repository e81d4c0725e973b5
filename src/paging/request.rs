//! Relay window arguments and the "what must be computed" flags.

use serde::{Deserialize, Serialize};

use crate::error::{PagingError, PagingResult};

/// Relay pagination arguments with cursors already decoded to zero-based
/// offsets into the ordered sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindowRequest {
    /// Return at most this many rows from the front of the window.
    pub first: Option<i64>,
    /// Return at most this many rows from the back of the window.
    pub last: Option<i64>,
    /// Only rows positioned strictly before this offset.
    pub before: Option<i64>,
    /// Only rows positioned strictly after this offset.
    pub after: Option<i64>,
}

impl PageWindowRequest {
    pub fn new(first: Option<i64>, last: Option<i64>, before: Option<i64>, after: Option<i64>) -> Self {
        Self {
            first,
            last,
            before,
            after,
        }
    }

    pub fn first(count: i64) -> Self {
        Self {
            first: Some(count),
            ..Default::default()
        }
    }

    pub fn last(count: i64) -> Self {
        Self {
            last: Some(count),
            ..Default::default()
        }
    }

    pub fn with_after(mut self, after: i64) -> Self {
        self.after = Some(after);
        self
    }

    pub fn with_before(mut self, before: i64) -> Self {
        self.before = Some(before);
        self
    }

    /// Check the argument rules and normalize cursors.
    ///
    /// `first`/`last` must be non-negative and not both present. Negative
    /// `before`/`after` offsets are treated as absent.
    pub fn validate(self) -> PagingResult<Self> {
        if self.first.is_some() && self.last.is_some() {
            return Err(PagingError::invalid_argument(
                "last",
                "`first` and `last` cannot be combined",
            ));
        }
        if let Some(first) = self.first
            && first < 0
        {
            return Err(PagingError::invalid_argument(
                "first",
                format!("must not be negative, got {first}"),
            ));
        }
        if let Some(last) = self.last
            && last < 0
        {
            return Err(PagingError::invalid_argument(
                "last",
                format!("must not be negative, got {last}"),
            ));
        }

        Ok(Self {
            before: self.before.filter(|b| *b >= 0),
            after: self.after.filter(|a| *a >= 0),
            ..self
        })
    }

    /// True when `after` sits at or past `before`.
    pub fn is_degenerate(&self) -> bool {
        matches!((self.after, self.before), (Some(after), Some(before)) if after >= before)
    }
}

/// Which parts of a connection the caller actually selected.
///
/// Anything not flagged is never computed, so an unrequested total count
/// costs no `COUNT` query and unrequested edges cost no materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationFlags {
    pub needs_count: bool,
    /// Set when `startCursor` or `endCursor` is selected.
    pub needs_end_offset: bool,
    pub needs_edges: bool,
    pub needs_items: bool,
}

impl ComputationFlags {
    /// Everything requested.
    pub fn all() -> Self {
        Self {
            needs_count: true,
            needs_end_offset: true,
            needs_edges: true,
            needs_items: true,
        }
    }

    pub fn edges() -> Self {
        Self {
            needs_edges: true,
            ..Default::default()
        }
    }

    pub fn items() -> Self {
        Self {
            needs_items: true,
            ..Default::default()
        }
    }

    pub fn with_count(mut self) -> Self {
        self.needs_count = true;
        self
    }

    pub fn with_end_offset(mut self) -> Self {
        self.needs_end_offset = true;
        self
    }

    /// Whether any page rows have to be produced.
    pub fn needs_rows(&self) -> bool {
        self.needs_edges || self.needs_items
    }
}
