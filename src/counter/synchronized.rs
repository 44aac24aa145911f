//! Counters serialized through a lock

use core::{
    cell::UnsafeCell,
    fmt,
    hash::{Hash, Hasher},
    ptr,
};
use enumflags2::BitFlags;
use paste::paste;

use crate::{
    sync::{Exclusive, Mutex},
    CounterKind, IsCounter, Operation, Result,
};

/// A counter whose every operation runs while holding its own lock
///
/// ### Behavior
/// 1. Increment, decrement, read, reset, equality, hashing, rendering and
///    duplication each take the lock, call the delegate once and release the
///    lock before returning, even when the delegate fails or panics.
/// 2. Calls on one wrapper never interleave, so returned counts form a single
///    total order.
/// 3. The lock belongs to this wrapper alone. Two wrappers around the same
///    inner counter (say, through `&C`) do **not** coordinate with each other.
/// 4. Delegate errors such as
///    [UnsupportedOperation](crate::Error::UnsupportedOperation) come back
///    unchanged; [Interrupted](crate::Error::Interrupted) means the lock was
///    never taken.
/// 5. A clone is synchronized too, over a fresh lock of its own.
///
/// ```
/// use sync_counters::{Counter, IsCounter};
/// let c = Counter::new(0).synchronized();
/// std::thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| (0..250).for_each(|_| { c.increment().unwrap(); }));
///     }
/// });
/// assert_eq!(c.get_count(), Ok(1_000));
/// ```
pub struct SynchronizedCounter<C, S = Mutex> {
    sync: S,
    delegate: UnsafeCell<C>,
}

// SAFETY: the delegate is only reached while `sync` grants exclusive entry,
// or through `&mut self`, so it is never touched by two threads at once.
unsafe impl<C: Send, S: Exclusive> Sync for SynchronizedCounter<C, S> {}

impl<C, S: Exclusive + Default> SynchronizedCounter<C, S> {
    /// Wrap `delegate` behind a new lock
    pub fn new(delegate: C) -> Self { Self::with_sync(delegate, S::default()) }
}

impl<C, S: Exclusive> SynchronizedCounter<C, S> {
    /// Wrap `delegate` behind the given lock
    pub fn with_sync(delegate: C, sync: S) -> Self {
        Self { sync, delegate: UnsafeCell::new(delegate) }
    }
    /// The lock guarding the delegate
    pub fn sync(&self) -> &S { &self.sync }
    /// Reach the delegate without locking; `&mut self` already excludes everyone else
    pub fn get_mut(&mut self) -> &mut C { self.delegate.get_mut() }
    /// Drop the lock and take the delegate out
    pub fn into_inner(self) -> C { self.delegate.into_inner() }

    /// Run `f` on the delegate while holding the lock
    pub fn with_locked<R>(&self, f: impl FnOnce(&C) -> R) -> Result<R> {
        let _entry = self.sync.enter()?;
        // SAFETY: `_entry` holds exclusive entry until the end of this scope
        Ok(f(unsafe { &*self.delegate.get() }))
    }

    fn with_locked_uninterruptibly<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let _entry = self.sync.enter_uninterruptibly();
        // SAFETY: `_entry` holds exclusive entry until the end of this scope
        f(unsafe { &*self.delegate.get() })
    }
}

/// Forwards counter operations to the delegate under the lock
macro_rules! locked_operations {
    ($($op:ident -> $Ret:ty;)+) => {
        paste! {
            $(
                #[doc = "Lock, then [" $op "](IsCounter::" $op ") the delegate"]
                fn $op(&self) -> Result<$Ret> {
                    self.with_locked(|delegate| delegate.$op())?
                }
            )+
        }
    };
}

impl<C: IsCounter, S: Exclusive> IsCounter for SynchronizedCounter<C, S> {
    locked_operations! {
        increment -> i64;
        decrement -> i64;
        get_count -> i64;
        reset -> ();
    }
    fn kind(&self) -> CounterKind { CounterKind::Synchronized }
    fn kind_chain(&self) -> Vec<CounterKind> {
        let mut chain = vec![self.kind()];
        chain.extend(self.with_locked_uninterruptibly(|delegate| delegate.kind_chain()));
        chain
    }
    fn supported_operations(&self) -> BitFlags<Operation> {
        self.with_locked_uninterruptibly(|delegate| delegate.supported_operations())
    }
}

/// Equal when the delegates have the same [kind chain](IsCounter::kind_chain)
/// and count, matching [counters_eq](crate::counters_eq)
///
/// The other side is read first under its own lock, then compared under
/// ours; the two locks are never held together.
impl<C: IsCounter, S: Exclusive> PartialEq for SynchronizedCounter<C, S> {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let (chain, count) = other
            .with_locked_uninterruptibly(|delegate| (delegate.kind_chain(), delegate.get_count()));
        self.with_locked_uninterruptibly(|delegate| {
            delegate.kind_chain() == chain
                && matches!((delegate.get_count(), count), (Ok(x), Ok(y)) if x == y)
        })
    }
}

impl<C: IsCounter, S: Exclusive> Eq for SynchronizedCounter<C, S> {}

impl<C: IsCounter, S: Exclusive> Hash for SynchronizedCounter<C, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.with_locked_uninterruptibly(|delegate| delegate.get_count())
            .ok()
            .hash(state)
    }
}

impl<C: fmt::Display, S: Exclusive> fmt::Display for SynchronizedCounter<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_locked_uninterruptibly(|delegate| fmt::Display::fmt(delegate, f))
    }
}

impl<C: fmt::Debug, S: Exclusive> fmt::Debug for SynchronizedCounter<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_locked_uninterruptibly(|delegate| {
            f.debug_struct("SynchronizedCounter")
                .field("delegate", delegate)
                .finish_non_exhaustive()
        })
    }
}

impl<C: Clone, S: Exclusive + Default> Clone for SynchronizedCounter<C, S> {
    fn clone(&self) -> Self { Self::new(self.with_locked_uninterruptibly(C::clone)) }
}

impl<C: Default, S: Exclusive + Default> Default for SynchronizedCounter<C, S> {
    fn default() -> Self { Self::new(C::default()) }
}

impl<C, S: Exclusive + Default> From<C> for SynchronizedCounter<C, S> {
    fn from(delegate: C) -> Self { Self::new(delegate) }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl<C: Serialize, S: Exclusive> Serialize for SynchronizedCounter<C, S> {
        fn serialize<Ser>(&self, serializer: Ser) -> core::result::Result<Ser::Ok, Ser::Error>
        where
            Ser: Serializer,
        {
            self.with_locked_uninterruptibly(|delegate| delegate.serialize(serializer))
        }
    }

    impl<'de, C: Deserialize<'de>, S: Exclusive + Default> Deserialize<'de> for SynchronizedCounter<C, S> {
        fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            C::deserialize(deserializer).map(Self::new)
        }
    }
}
