//! URL frontier: pending, in-flight and done sets with deduplication
//!
//! Every canonical key lives in exactly one of four places: `pending`,
//! `in_flight`, `done`, or the skipped-page registry. All transitions go
//! through a single mutex, so callers never observe a page in two sets or in
//! none. The first instance seen for a key is the canonical one; later
//! duplicates only contribute their parents.

use crate::state::{FrontierState, Page};
use crate::url::CanonicalUrl;
use crate::SweepError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Point-in-time sizes of the frontier sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierCounts {
    pub pending: usize,
    pub in_flight: usize,
    pub done: usize,
    pub skipped: usize,
}

/// Everything left in the frontier once a crawl stops
#[derive(Debug, Default)]
pub struct FrontierContents {
    pub done: BTreeMap<CanonicalUrl, Page>,
    pub skipped: BTreeMap<CanonicalUrl, Page>,
    /// Pages still pending or in flight (crawl cancelled)
    pub unfinished: usize,
}

#[derive(Debug, Default)]
struct FrontierInner {
    pending: HashMap<CanonicalUrl, Page>,
    /// Dispatch order of `pending`
    queue: VecDeque<CanonicalUrl>,
    /// In-flight keys with parents discovered while the page was out
    in_flight: HashMap<CanonicalUrl, BTreeSet<CanonicalUrl>>,
    done: BTreeMap<CanonicalUrl, Page>,
    skipped: BTreeMap<CanonicalUrl, Page>,
    /// Bumped on every state change; the scheduler's idle detector watches it
    generation: u64,
}

impl FrontierInner {
    fn state_of(&self, key: &CanonicalUrl) -> Option<FrontierState> {
        if self.pending.contains_key(key) {
            Some(FrontierState::Pending)
        } else if self.in_flight.contains_key(key) {
            Some(FrontierState::InFlight)
        } else if self.done.contains_key(key) {
            Some(FrontierState::Done)
        } else {
            None
        }
    }

    /// Adds parents to the existing instance for `key`, wherever it lives
    fn merge_parents(&mut self, key: &CanonicalUrl, parents: &BTreeSet<CanonicalUrl>) -> bool {
        let parents = parents.iter().filter(|p| *p != key).cloned();

        if let Some(page) = self.pending.get_mut(key) {
            page.merge_parents(parents);
        } else if let Some(late) = self.in_flight.get_mut(key) {
            late.extend(parents);
        } else if let Some(page) = self.done.get_mut(key) {
            page.merge_parents(parents);
        } else if let Some(page) = self.skipped.get_mut(key) {
            page.merge_parents(parents);
        } else {
            return false;
        }
        true
    }

    fn offer(&mut self, page: Page) -> bool {
        if self.merge_parents(&page.key, &page.parents) {
            return false;
        }

        self.queue.push_back(page.key.clone());
        self.pending.insert(page.key.clone(), page);
        self.generation += 1;
        true
    }

    fn record_skipped(&mut self, page: Page) -> bool {
        if self.merge_parents(&page.key, &page.parents) {
            return false;
        }

        self.skipped.insert(page.key.clone(), page);
        true
    }

    fn take(&mut self) -> Option<Page> {
        while let Some(key) = self.queue.pop_front() {
            if let Some(page) = self.pending.remove(&key) {
                self.in_flight.insert(key, BTreeSet::new());
                self.generation += 1;
                return Some(page);
            }
        }
        None
    }

    fn complete(&mut self, mut page: Page) -> Result<(), SweepError> {
        let late_parents = self.in_flight.remove(&page.key).ok_or_else(|| {
            SweepError::FrontierInvariant(format!(
                "completed page {} was not in flight",
                page.key
            ))
        })?;

        page.merge_parents(late_parents);

        if self.done.contains_key(&page.key) {
            return Err(SweepError::FrontierInvariant(format!(
                "page {} completed twice",
                page.key
            )));
        }

        self.done.insert(page.key.clone(), page);
        self.generation += 1;
        Ok(())
    }
}

/// Thread-safe URL frontier
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a page into `pending` unless its key is already known
    ///
    /// When the key exists (in any set or the skipped registry), the offered
    /// page's parents are recorded on the existing instance and the offered
    /// instance is dropped.
    ///
    /// # Returns
    ///
    /// `true` if the page was newly added
    pub fn offer(&self, page: Page) -> bool {
        self.inner.lock().offer(page)
    }

    /// Records a policy-excluded page without ever making it fetchable
    ///
    /// Returns `true` if the key was new.
    pub fn record_skipped(&self, page: Page) -> bool {
        self.inner.lock().record_skipped(page)
    }

    /// Moves the oldest pending page to `in_flight` and hands it out
    pub fn take(&self) -> Option<Page> {
        self.inner.lock().take()
    }

    /// Moves a page from `in_flight` to `done`
    ///
    /// Parents recorded while the page was in flight are merged into it.
    ///
    /// # Errors
    ///
    /// [`SweepError::FrontierInvariant`] if the page was not in flight.
    pub fn complete(&self, page: Page) -> Result<(), SweepError> {
        self.inner.lock().complete(page)
    }

    /// Records `parent` as an additional referrer of an already known key
    ///
    /// Returns `false` if the key is unknown.
    pub fn merge_parent(&self, key: &CanonicalUrl, parent: CanonicalUrl) -> bool {
        let parents = BTreeSet::from([parent]);
        self.inner.lock().merge_parents(key, &parents)
    }

    /// Finishes a fetched page in one critical section
    ///
    /// Children are offered first (skip children go to the skipped registry),
    /// then the page moves to `done`. Quiescence can never be observed between
    /// the two steps.
    ///
    /// # Returns
    ///
    /// Number of children newly added to `pending`
    pub fn settle(&self, page: Page, children: Vec<Page>) -> Result<usize, SweepError> {
        let mut inner = self.inner.lock();

        let mut added = 0;
        for child in children {
            if child.skip {
                inner.record_skipped(child);
            } else if inner.offer(child) {
                added += 1;
            }
        }

        inner.complete(page)?;
        Ok(added)
    }

    /// Returns true when nothing is pending and nothing is in flight
    pub fn is_quiescent(&self) -> bool {
        let inner = self.inner.lock();
        inner.pending.is_empty() && inner.in_flight.is_empty()
    }

    /// Which set holds `key`, if any; skipped pages report `None`
    pub fn state_of(&self, key: &CanonicalUrl) -> Option<FrontierState> {
        self.inner.lock().state_of(key)
    }

    /// Returns true if `key` is known anywhere in the frontier
    pub fn contains(&self, key: &CanonicalUrl) -> bool {
        let inner = self.inner.lock();
        inner.state_of(key).is_some() || inner.skipped.contains_key(key)
    }

    /// Clones the current instance for `key` (not available while in flight)
    pub fn snapshot(&self, key: &CanonicalUrl) -> Option<Page> {
        let inner = self.inner.lock();
        inner
            .pending
            .get(key)
            .or_else(|| inner.done.get(key))
            .or_else(|| inner.skipped.get(key))
            .cloned()
    }

    pub fn counts(&self) -> FrontierCounts {
        let inner = self.inner.lock();
        FrontierCounts {
            pending: inner.pending.len(),
            in_flight: inner.in_flight.len(),
            done: inner.done.len(),
            skipped: inner.skipped.len(),
        }
    }

    /// Monotonic change counter
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Moves the finished and skipped pages out, leaving the frontier empty
    pub fn drain(&self) -> FrontierContents {
        let mut inner = self.inner.lock();
        let unfinished = inner.pending.len() + inner.in_flight.len();
        let contents = FrontierContents {
            done: std::mem::take(&mut inner.done),
            skipped: std::mem::take(&mut inner.skipped),
            unfinished,
        };
        *inner = FrontierInner::default();
        contents
    }
}
