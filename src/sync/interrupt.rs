//! Per-thread interruption
//!
//! Every thread carries an interrupt flag. Another thread holding that
//! thread's [Interrupter] can raise the flag and wake it; blocking
//! [acquire](super::SyncPrimitive::acquire) calls notice the flag and give up
//! with [Error::Interrupted](crate::Error::Interrupted).
//!
//! ```
//! use sync_counters::sync::interrupt;
//! interrupt::current().interrupt();
//! assert!(interrupt::is_interrupted());
//! assert!(interrupt::interrupted(), "reports and clears");
//! assert!(!interrupt::is_interrupted());
//! ```
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, Thread},
};

thread_local! {
    static FLAG: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
}

/// Interrupts one particular thread
#[derive(Clone)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
    thread: Thread,
}

impl Interrupter {
    /// Raise the thread's flag and wake it if parked
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.thread.unpark();
    }
    pub fn is_interrupted(&self) -> bool { self.flag.load(Ordering::SeqCst) }
    /// The thread this interrupts
    pub fn thread(&self) -> &Thread { &self.thread }
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupter")
            .field("thread", &self.thread.id())
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

/// A handle for interrupting the calling thread
pub fn current() -> Interrupter {
    FLAG.with(|flag| Interrupter {
        flag: Arc::clone(flag),
        thread: thread::current(),
    })
}

/// Test and clear the calling thread's flag
pub fn interrupted() -> bool { FLAG.with(|flag| flag.swap(false, Ordering::SeqCst)) }

/// Test the calling thread's flag without clearing it
pub fn is_interrupted() -> bool { FLAG.with(|flag| flag.load(Ordering::SeqCst)) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupts_reach_only_their_thread() {
        let here = current();
        thread::spawn(move || {
            assert!(!is_interrupted());
            here.interrupt();
            assert!(!is_interrupted(), "the interrupting thread is untouched");
        })
        .join()
        .unwrap();
        assert!(current().is_interrupted());
        assert!(interrupted());
        assert!(!interrupted());
    }

    #[test]
    fn interrupt_wakes_a_parked_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let parked = thread::spawn(move || {
            tx.send(current()).unwrap();
            while !interrupted() {
                thread::park();
            }
        });
        let interrupter = rx.recv().unwrap();
        assert_eq!(interrupter.thread().id(), parked.thread().id());
        interrupter.interrupt();
        parked.join().unwrap();
    }
}
