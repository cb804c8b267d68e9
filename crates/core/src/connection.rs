//! Paging and counting of one-to-many relationships.
//!
//! The backend hands us unbounded lists, so relationships are resolved with a
//! single pass: drop candidates that fail the relationship or state filter,
//! count everything else, and only model the ones that fit under the limit.

use tracing::debug;

use crate::error::Result;

/// A counted page of items. `count` includes items cut by the limit but never
/// items excluded by a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> Default for Connection<T> {
    fn default() -> Self { Self { items: Vec::new(), count: 0 } }
}

type Filter<'a, C> = Box<dyn Fn(&C) -> bool + Send + Sync + 'a>;

/// Builder for a single relationship resolution.
///
/// A negative limit returns no items but still counts every match.
pub struct ConnectionResolver<'a, C> {
    limit: Option<i32>,
    relationship: Option<Filter<'a, C>>,
    state: Option<Filter<'a, C>>,
}

impl<'a, C> ConnectionResolver<'a, C> {
    pub fn new(limit: Option<i32>) -> Self { Self { limit, relationship: None, state: None } }

    /// Candidates failing this are not ours (e.g. another controller owns them).
    pub fn relationship(mut self, f: impl Fn(&C) -> bool + Send + Sync + 'a) -> Self {
        self.relationship = Some(Box::new(f));
        self
    }

    /// Candidates failing this are ours but not wanted (e.g. inactive revisions).
    pub fn state(mut self, f: impl Fn(&C) -> bool + Send + Sync + 'a) -> Self {
        self.state = Some(Box::new(f));
        self
    }

    fn included(&self, c: &C) -> bool {
        self.relationship.as_ref().map_or(true, |f| f(c)) && self.state.as_ref().map_or(true, |f| f(c))
    }

    /// Walk `candidates` in order and model each one that lands on the page.
    ///
    /// The first modeling error aborts the whole resolution; no partial page
    /// is returned. Excluded candidates are never handed to `model`.
    pub fn resolve<T, I, M>(self, candidates: I, mut model: M) -> Result<Connection<T>>
    where
        I: IntoIterator<Item = C>,
        M: FnMut(C) -> Result<T>,
    {
        let mut out = Connection::default();
        let mut seen = 0usize;
        for c in candidates {
            seen += 1;
            if !self.included(&c) {
                continue;
            }
            out.count += 1;

            // Past the limit we only count.
            if let Some(limit) = self.limit {
                if i64::from(limit) < out.count as i64 {
                    continue;
                }
            }

            out.items.push(model(c)?);
        }
        debug!(seen, count = out.count, items = out.items.len(), limit = ?self.limit, "connection resolved");
        Ok(out)
    }
}
