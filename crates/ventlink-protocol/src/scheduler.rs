//! Cyclic state broadcast schedule.
//!
//! The scheduler walks a fixed list of entries. Only the entry under the
//! cursor accumulates elapsed ticks; once it has waited its `interval`, its
//! kind is reported as due and the cursor moves on. Ticks beyond the
//! interval are not carried over to the next entry.

use heapless::Vec;

use crate::error::ScheduleError;

/// How long to wait on `kind` before it is broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEntry<K> {
    /// Ticks spent on this entry before it is due.
    pub interval: u32,
    pub kind: K,
}

impl<K> ScheduleEntry<K> {
    pub const fn new(interval: u32, kind: K) -> Self {
        Self { interval, kind }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<K, const N: usize> {
    entries: Vec<ScheduleEntry<K>, N>,
    cursor: usize,
    elapsed: u32,
}

impl<K: Clone, const N: usize> Scheduler<K, N> {
    /// Build a scheduler over `entries`, starting at the first one.
    pub fn new(entries: &[ScheduleEntry<K>]) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }
        let entries = Vec::from_slice(entries).map_err(|_| ScheduleError::TooManyEntries {
            count: entries.len(),
            capacity: N,
        })?;
        Ok(Self {
            entries,
            cursor: 0,
            elapsed: 0,
        })
    }

    /// Account for one tick.
    pub fn advance(&mut self) -> Option<K> {
        self.advance_by(1)
    }

    /// Account for `ticks` elapsed ticks, returning the kind that became due.
    ///
    /// At most one entry fires per call.
    pub fn advance_by(&mut self, ticks: u32) -> Option<K> {
        let entry = self.entries.get(self.cursor)?;
        self.elapsed = self.elapsed.saturating_add(ticks);
        if self.elapsed < entry.interval {
            return None;
        }

        let kind = entry.kind.clone();
        self.elapsed = 0;
        self.cursor = (self.cursor + 1) % self.entries.len();
        tracing::trace!(cursor = self.cursor, "schedule entry due");
        Some(kind)
    }

    pub fn entries(&self) -> &[ScheduleEntry<K>] {
        &self.entries
    }

    /// Index of the entry currently waiting.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ticks accumulated on the current entry.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Return to the first entry with nothing elapsed.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.elapsed = 0;
    }
}
