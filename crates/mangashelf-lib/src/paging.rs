use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_CHAPTER_LIMIT: usize = 100;

/// One page window of a list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Slice `items` to this window
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// Caller side state for incremental list loading.
///
/// A page shorter than `limit` is taken as the last one. A source whose
/// length is an exact multiple of `limit` therefore costs one extra, empty
/// request before the pager stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    limit: usize,
    offset: usize,
    has_more: bool,
}

impl Pager {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            offset: 0,
            has_more: limit > 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.has_more
            .then(|| PageRequest::new(self.limit, self.offset))
    }

    /// Record a successfully loaded page of `len` items.
    pub fn record(&mut self, len: usize) {
        if !self.has_more {
            return;
        }

        self.offset += self.limit;
        self.has_more = len == self.limit;
    }

    /// Start over from the first page, e.g. after switching tabs
    pub fn reset(&mut self) {
        *self = Self::new(self.limit);
    }
}

/// Ticket handed out by [`LoadSequence::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Orders overlapping loads so that only the newest one may commit.
///
/// A view takes a ticket before starting a fetch and checks it before
/// applying the result; a result whose ticket has been superseded is dropped.
#[derive(Debug, Default)]
pub struct LoadSequence {
    latest: AtomicU64,
}

impl LoadSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Apply `value` with `apply` if `ticket` is still the newest load.
    /// Returns whether it was applied.
    pub fn commit<T, F>(&self, ticket: LoadTicket, value: T, apply: F) -> bool
    where
        F: FnOnce(T),
    {
        if self.is_current(ticket) {
            apply(value);
            true
        } else {
            false
        }
    }
}
