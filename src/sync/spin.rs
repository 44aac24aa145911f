//! A test-and-set lock with exponential back-off
use core::{
    hint,
    sync::atomic::{AtomicBool, Ordering},
};
use std::thread;

use super::{interrupt, Exclusive, SyncPrimitive};
use crate::{Error, Result};

/// Back-off doubles up to `1 << SPIN_LIMIT` spins, then yields the thread
const SPIN_LIMIT: u32 = 6;

/// A spinning exclusive lock
///
/// Waiters burn CPU instead of parking and are not served in any particular
/// order. Good for very short critical sections such as a counter update.
/// The interrupt flag is checked between spins.
#[derive(Debug, Default)]
pub struct SpinLock {
    held: AtomicBool,
}

impl SpinLock {
    /// Instantiate unheld
    pub const fn new() -> Self { Self { held: AtomicBool::new(false) } }
    /// Is entry currently held?
    pub fn is_held(&self) -> bool { self.held.load(Ordering::Relaxed) }
    /// Take entry only if it is free right now
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

impl SyncPrimitive for SpinLock {
    fn acquire(&self) -> Result<()> {
        let mut step = 0;
        loop {
            if interrupt::interrupted() {
                tracing::debug!("spin lock wait interrupted");
                return Err(Error::Interrupted);
            }
            if self.try_acquire() {
                return Ok(());
            }
            while self.is_held() && !interrupt::is_interrupted() {
                if step <= SPIN_LIMIT {
                    (0..1u32 << step).for_each(|_| hint::spin_loop());
                    step += 1;
                } else {
                    thread::yield_now();
                }
            }
        }
    }

    unsafe fn release(&self) {
        debug_assert!(self.is_held(), "released a spin lock that was not held");
        self.held.store(false, Ordering::Release);
    }
}

// SAFETY: entry is a single flag flipped by compare-exchange.
unsafe impl Exclusive for SpinLock {}
