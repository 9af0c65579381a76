//! Per-title write locks
//!
//! Writers to the same title take turns; writers to different titles never
//! contend. Entries are dropped once no caller holds or waits on them, so the
//! table only grows with the number of titles being written concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Table of mutexes keyed by title
#[derive(Default)]
pub struct TitleLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held while writing a title; releases the lock when dropped
pub struct TitleGuard<'a> {
    locks: &'a TitleLocks,
    title: String,
    lock: Arc<Mutex<()>>,
}

impl TitleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `title` is free, then hold it until the guard is dropped
    pub fn lock(&self, title: &str) -> TitleGuard<'_> {
        let lock = {
            let mut table = self.table();
            Arc::clone(table.entry(title.to_string()).or_default())
        };
        TitleGuard {
            locks: self,
            title: title.to_string(),
            lock,
        }
    }

    /// Number of titles currently locked or awaited
    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        // The table holds no invariants a panicking holder could break.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TitleGuard<'_> {
    /// Run `f` while holding the title lock
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let _held = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

impl Drop for TitleGuard<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // Two references left: the table's and ours. Nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.title);
        }
    }
}
