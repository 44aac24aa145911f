//! Fair, parking primitives

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, MutexGuard, PoisonError,
    },
    thread::{self, Thread},
};

use super::{interrupt, Exclusive, SyncPrimitive};
use crate::{Error, Result};

#[derive(Debug)]
struct Waiter {
    thread: Thread,
    /// Set under the state lock when a release hands this waiter its permit
    granted: Arc<AtomicBool>,
}

#[derive(Debug)]
struct State {
    permits: usize,
    waiters: VecDeque<Waiter>,
}

/// A counting semaphore that grants permits in arrival order
///
/// A release with waiters queued hands its permit straight to the oldest one,
/// so late arrivals cannot barge ahead. The internal state lock is only held
/// for bookkeeping, never while a caller waits.
///
/// ```
/// use sync_counters::{Semaphore, SyncPrimitive};
/// let s = Semaphore::new(2);
/// let a = s.enter().unwrap();
/// let _b = s.enter().unwrap();
/// assert_eq!(s.available_permits(), 0);
/// drop(a);
/// assert_eq!(s.available_permits(), 1);
/// ```
#[derive(Debug)]
pub struct Semaphore {
    state: std::sync::Mutex<State>,
}

impl Semaphore {
    /// Instantiate with `permits` free entries
    pub const fn new(permits: usize) -> Self {
        Self {
            state: std::sync::Mutex::new(State {
                permits,
                waiters: VecDeque::new(),
            }),
        }
    }
    /// Permits nobody holds or is being handed
    pub fn available_permits(&self) -> usize { self.state().permits }
    /// Threads currently waiting
    pub fn queued(&self) -> usize { self.state().waiters.len() }

    fn state(&self) -> MutexGuard<'_, State> {
        // Only bookkeeping runs under this lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Semaphore {
    fn default() -> Self { Self::new(1) }
}

impl SyncPrimitive for Semaphore {
    fn acquire(&self) -> Result<()> {
        if interrupt::interrupted() {
            return Err(Error::Interrupted);
        }
        let mut state = self.state();
        if state.permits > 0 && state.waiters.is_empty() {
            state.permits -= 1;
            return Ok(());
        }
        let granted = Arc::new(AtomicBool::new(false));
        state.waiters.push_back(Waiter {
            thread: thread::current(),
            granted: Arc::clone(&granted),
        });
        loop {
            drop(state);
            thread::park();
            state = self.state();
            if granted.load(Ordering::SeqCst) {
                return Ok(());
            }
            if interrupt::interrupted() {
                state.waiters.retain(|w| !Arc::ptr_eq(&w.granted, &granted));
                tracing::debug!(queued = state.waiters.len(), "semaphore wait interrupted");
                return Err(Error::Interrupted);
            }
        }
    }

    unsafe fn release(&self) {
        let mut state = self.state();
        match state.waiters.pop_front() {
            Some(waiter) => {
                waiter.granted.store(true, Ordering::SeqCst);
                tracing::trace!(thread = ?waiter.thread.id(), "semaphore permit handed off");
                waiter.thread.unpark();
            }
            None => state.permits += 1,
        }
    }
}

/// A fair exclusive lock: a [Semaphore] with a single permit
///
/// This is the lock a [SynchronizedCounter](crate::SynchronizedCounter) uses
/// unless told otherwise.
#[derive(Debug)]
pub struct Mutex {
    semaphore: Semaphore,
}

impl Mutex {
    /// Instantiate unheld
    pub const fn new() -> Self { Self { semaphore: Semaphore::new(1) } }
    /// Is entry currently held (or being handed to a waiter)?
    pub fn is_held(&self) -> bool { self.semaphore.available_permits() == 0 }
    /// Threads currently waiting
    pub fn queued(&self) -> usize { self.semaphore.queued() }
}

impl Default for Mutex {
    fn default() -> Self { Self::new() }
}

impl SyncPrimitive for Mutex {
    fn acquire(&self) -> Result<()> { self.semaphore.acquire() }
    unsafe fn release(&self) {
        debug_assert!(self.is_held(), "released a mutex that was not held");
        self.semaphore.release()
    }
}

// SAFETY: the semaphore starts with one permit and `release` never mints more
// than a matching `acquire` took.
unsafe impl Exclusive for Mutex {}
