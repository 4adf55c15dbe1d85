//! Per-key record and single-flight coordination.
//!
//! ## Architecture
//!
//! ```text
//!   Entry<V, E>
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ record: RwLock<Record>   result / last_ok / expire_at    │ ◄── fast path reads
//!   │ flight: Mutex<Flight>    fetching / generation           │
//!   │ landed: Condvar          signalled when a fetch lands    │
//!   └──────────────────────────────────────────────────────────┘
//!
//!   caller A                         caller B
//!   ────────                         ────────
//!   begin_or_wait() → FlightGuard
//!   fetch(key) ...                   begin_or_wait()
//!                                      generation = g, wait(landed)
//!   store(result)                         .
//!   drop(FlightGuard)                     .
//!     fetching = false, g + 1 ──────► wakes, returns None
//!                                    snapshot() → A's result
//! ```
//!
//! The flight mutex is held only to flip the marker; the fetch itself runs with
//! no lock held. The guard clears the marker on drop, so a panicking fetch
//! still releases its waiters.

use std::time::Instant;

use parking_lot::{Condvar, Mutex, RwLock};

/// Snapshot of one entry as seen by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<V, E> {
    /// Outcome of the most recent fetch.
    pub result: Result<V, E>,
    /// Last successfully fetched value, present only when `result` is an
    /// error and an earlier fetch had succeeded.
    pub stale: Option<V>,
    /// Instant after which the entry is refreshed on access.
    pub expire_at: Instant,
}

impl<V, E> Lookup<V, E> {
    /// `true` if the record is still valid at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.expire_at > now
    }
}

#[derive(Debug)]
struct Record<V, E> {
    result: Option<Result<V, E>>,
    last_ok: Option<V>,
    expire_at: Option<Instant>,
}

impl<V, E> Record<V, E>
where
    V: Clone,
    E: Clone,
{
    fn lookup(&self) -> Option<Lookup<V, E>> {
        let result = self.result.clone()?;
        let expire_at = self.expire_at?;
        let stale = match result {
            Ok(_) => None,
            Err(_) => self.last_ok.clone(),
        };
        Some(Lookup {
            result,
            stale,
            expire_at,
        })
    }
}

#[derive(Debug, Default)]
struct Flight {
    fetching: bool,
    generation: u64,
}

#[derive(Debug)]
pub(crate) struct Entry<V, E> {
    record: RwLock<Record<V, E>>,
    flight: Mutex<Flight>,
    landed: Condvar,
}

impl<V, E> Entry<V, E>
where
    V: Clone,
    E: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            record: RwLock::new(Record {
                result: None,
                last_ok: None,
                expire_at: None,
            }),
            flight: Mutex::new(Flight::default()),
            landed: Condvar::new(),
        }
    }

    /// A fresh entry whose flight already belongs to its creator. Waiters
    /// block on it until the creator's guard drops.
    pub(crate) fn pending() -> Self {
        let entry = Self::new();
        entry.flight.lock().fetching = true;
        entry
    }

    /// Returns the record if it is still valid at `now`.
    #[inline]
    pub(crate) fn fresh(&self, now: Instant) -> Option<Lookup<V, E>> {
        let record = self.record.read();
        match record.expire_at {
            Some(at) if at > now => record.lookup(),
            _ => None,
        }
    }

    /// Returns the record regardless of freshness; `None` until the first
    /// fetch lands.
    pub(crate) fn snapshot(&self) -> Option<Lookup<V, E>> {
        self.record.read().lookup()
    }

    /// Never-fetched entries count as expired.
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.record.read().expire_at.is_none_or(|at| at <= now)
    }

    pub(crate) fn is_fetching(&self) -> bool {
        self.flight.lock().fetching
    }

    /// Claims the fetch for this entry, or blocks until the fetch in flight
    /// lands.
    ///
    /// Returns `Some(guard)` to the caller that must fetch and `None` to a
    /// caller that waited. A waiter reads the landed result with
    /// [`snapshot`](Self::snapshot).
    pub(crate) fn begin_or_wait(&self) -> Option<FlightGuard<'_, V, E>> {
        let mut flight = self.flight.lock();
        if !flight.fetching {
            flight.fetching = true;
            return Some(FlightGuard { entry: self });
        }

        let generation = flight.generation;
        while flight.generation == generation {
            self.landed.wait(&mut flight);
        }
        None
    }

    /// Hands the creator of a [`pending`](Self::pending) entry the guard for
    /// the flight it was born with.
    pub(crate) fn resume_flight(&self) -> FlightGuard<'_, V, E> {
        debug_assert!(self.flight.lock().fetching);
        FlightGuard { entry: self }
    }

    /// Writes a fetch outcome and returns the resulting view.
    pub(crate) fn store(&self, result: Result<V, E>, expire_at: Instant) -> Lookup<V, E> {
        let mut record = self.record.write();
        let stale = match &result {
            Ok(value) => {
                record.last_ok = Some(value.clone());
                None
            },
            Err(_) => record.last_ok.clone(),
        };
        record.result = Some(result.clone());
        record.expire_at = Some(expire_at);
        Lookup {
            result,
            stale,
            expire_at,
        }
    }
}

/// Exclusive right to fetch one entry. Dropping it lands the flight.
pub(crate) struct FlightGuard<'a, V, E> {
    entry: &'a Entry<V, E>,
}

impl<V, E> Drop for FlightGuard<'_, V, E> {
    fn drop(&mut self) {
        let mut flight = self.entry.flight.lock();
        flight.fetching = false;
        flight.generation = flight.generation.wrapping_add(1);
        drop(flight);
        self.entry.landed.notify_all();
    }
}
