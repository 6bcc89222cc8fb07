use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use sift_query::Query;

use crate::matcher::Matcher;

const MIN_PURGE_AT: usize = 64;

/// Compiled matchers keyed by the identity of the query they came from.
///
/// Entries hold only a `Weak<Query>`, so caching never keeps a query alive.
/// Dead entries are swept whenever the map doubles past its last live size.
pub(crate) struct MatcherCache {
    state: Mutex<State>,
}

struct State {
    entries: HashMap<usize, Entry>,
    purge_at: usize,
}

struct Entry {
    query: Weak<Query>,
    matcher: Matcher,
}

impl Entry {
    fn is_for(&self, query: &Arc<Query>) -> bool {
        self.query
            .upgrade()
            .is_some_and(|live| Arc::ptr_eq(&live, query))
    }
}

fn key(query: &Arc<Query>) -> usize {
    Arc::as_ptr(query) as usize
}

impl MatcherCache {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                purge_at: MIN_PURGE_AT,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, query: &Arc<Query>) -> Option<Matcher> {
        let state = self.lock();
        state
            .entries
            .get(&key(query))
            .filter(|entry| entry.is_for(query))
            .map(|entry| entry.matcher.clone())
    }

    /// Store `matcher` for `query`. If another caller cached a matcher for
    /// the same query in the meantime, that one is kept and returned.
    pub(crate) fn insert(&self, query: &Arc<Query>, matcher: Matcher) -> Matcher {
        let mut state = self.lock();
        if let Some(existing) = state.entries.get(&key(query))
            && existing.is_for(query)
        {
            return existing.matcher.clone();
        }

        if state.entries.len() >= state.purge_at {
            state.purge();
        }
        state.entries.insert(
            key(query),
            Entry {
                query: Arc::downgrade(query),
                matcher: matcher.clone(),
            },
        );
        matcher
    }

    /// Number of entries whose query is still alive.
    pub(crate) fn len(&self) -> usize {
        let mut state = self.lock();
        state.purge();
        state.entries.len()
    }
}

impl State {
    fn purge(&mut self) {
        self.entries.retain(|_, entry| entry.query.strong_count() > 0);
        self.purge_at = (self.entries.len() * 2).max(MIN_PURGE_AT);
    }
}
