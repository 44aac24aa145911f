//! Acquire/release synchronization
//!
//! [SyncPrimitive] is the contract: `acquire` blocks until entry is granted or
//! the waiting thread is [interrupted](interrupt), `release` hands entry back
//! and never waits. Primitives that grant entry to one holder at a time also
//! implement [Exclusive], which is what [SynchronizedCounter](crate::SynchronizedCounter)
//! relies on.
//!
//! | Primitive   | Entries | Waiting            |
//! |-------------|---------|--------------------|
//! | [Semaphore] | n       | parked, FIFO       |
//! | [Mutex]     | 1       | parked, FIFO       |
//! | [SpinLock]  | 1       | spinning, unfair   |
//!
//! There is no timed acquire; build bounded waits on top by interrupting the
//! waiter.

pub mod interrupt;
mod semaphore;
mod spin;

pub use semaphore::{Mutex, Semaphore};
pub use spin::SpinLock;

use crate::Result;

/// Something that grants and takes back entry
pub trait SyncPrimitive: Send + Sync {
    /// Wait for entry
    ///
    /// Fails with [Error::Interrupted](crate::Error::Interrupted) when the
    /// calling thread is interrupted before or while waiting. A failed acquire
    /// leaves the primitive as if it was never called, and clears the
    /// interrupt.
    fn acquire(&self) -> Result<()>;

    /// Give back entry, waking at most one waiter. Never blocks on other holders.
    ///
    /// # Safety
    /// The caller must hold an entry from a matching successful [acquire](Self::acquire).
    /// Releasing without one breaks the exclusion other holders depend on.
    unsafe fn release(&self);

    /// Wait for entry, ignoring interrupts until it is granted
    ///
    /// An interrupt received while waiting is raised again once entry is held.
    fn acquire_uninterruptibly(&self) {
        let mut interrupted = false;
        while self.acquire().is_err() {
            interrupted = true;
        }
        if interrupted {
            interrupt::current().interrupt();
        }
    }

    /// Acquire, returning a guard that releases on drop
    fn enter(&self) -> Result<Entry<'_, Self>>
    where
        Self: Sized,
    {
        self.acquire()?;
        Ok(Entry { sync: self })
    }

    /// [enter](Self::enter) through [acquire_uninterruptibly](Self::acquire_uninterruptibly)
    fn enter_uninterruptibly(&self) -> Entry<'_, Self>
    where
        Self: Sized,
    {
        self.acquire_uninterruptibly();
        Entry { sync: self }
    }
}

/// A [SyncPrimitive] that admits a single holder at a time
///
/// # Safety
/// Between a successful `acquire` and its matching `release`, no other
/// `acquire` on the same primitive may succeed.
pub unsafe trait Exclusive: SyncPrimitive {}

/// Held entry into a [SyncPrimitive]; released when dropped
#[must_use = "entry is released as soon as the guard is dropped"]
pub struct Entry<'a, S: SyncPrimitive + ?Sized> {
    sync: &'a S,
}

impl<S: SyncPrimitive + ?Sized> Drop for Entry<'_, S> {
    fn drop(&mut self) {
        // SAFETY: an Entry only exists after a successful acquire on `sync`
        unsafe { self.sync.release() }
    }
}

#[cfg(test)]
mod test_support {
    use std::{thread, time::Duration};

    /// Spin until `ready` holds, so interrupts land on an actual waiter
    pub fn wait_until(ready: impl Fn() -> bool) {
        while !ready() {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

#[cfg(test)]
mod entry_tests {
    use super::*;
    use paste::paste;
    use std::{sync::mpsc, thread, time::Duration};

    /// Shared checks for every exclusive primitive
    macro_rules! exclusive_tests {
        ($($Sync:ident,)+) => {
            $(
                paste! {
                    mod [<$Sync:snake>] {
                        use super::*;

                        #[test]
                        fn entry_releases_on_drop() {
                            let s = $Sync::new();
                            {
                                let _entry = s.enter().unwrap();
                                assert!(s.is_held());
                            }
                            assert!(!s.is_held());
                        }

                        #[test]
                        fn entry_releases_on_panic() {
                            let s = $Sync::new();
                            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                let _entry = s.enter().unwrap();
                                panic!("holder failed");
                            }));
                            assert!(result.is_err());
                            assert!(!s.is_held());
                        }

                        #[test]
                        fn pending_interrupt_fails_fast() {
                            let s = $Sync::new();
                            interrupt::current().interrupt();
                            assert_eq!(s.acquire(), Err(crate::Error::Interrupted));
                            assert!(!interrupt::is_interrupted(), "failing must clear the interrupt");
                            assert!(!s.is_held());
                        }

                        #[test]
                        fn interrupted_waiter_gets_no_entry() {
                            let s = &$Sync::new();
                            let (tx, rx) = mpsc::channel();
                            let entry = s.enter().unwrap();
                            thread::scope(|scope| {
                                let waiter = scope.spawn(move || {
                                    tx.send(interrupt::current()).unwrap();
                                    s.acquire()
                                });
                                let interrupter = rx.recv().unwrap();
                                thread::sleep(Duration::from_millis(20));
                                interrupter.interrupt();
                                assert_eq!(waiter.join().unwrap(), Err(crate::Error::Interrupted));
                            });
                            assert!(s.is_held(), "the holder keeps its entry");
                            drop(entry);
                            assert!(!s.is_held());
                            let _again = s.enter().unwrap();
                        }

                        #[test]
                        fn uninterruptible_entry_reraises_interrupt() {
                            let s = &$Sync::new();
                            let (tx, rx) = mpsc::channel();
                            let entry = s.enter().unwrap();
                            thread::scope(|scope| {
                                let waiter = scope.spawn(move || {
                                    tx.send(interrupt::current()).unwrap();
                                    let _entry = s.enter_uninterruptibly();
                                    interrupt::interrupted()
                                });
                                let interrupter = rx.recv().unwrap();
                                thread::sleep(Duration::from_millis(20));
                                interrupter.interrupt();
                                thread::sleep(Duration::from_millis(20));
                                drop(entry);
                                assert!(waiter.join().unwrap(), "the interrupt must survive the wait");
                            });
                            assert!(!s.is_held());
                        }
                    }
                }
            )+
        };
    }

    exclusive_tests! {
        Mutex,
        SpinLock,
    }
}
