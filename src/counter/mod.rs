//! Counters

use core::{
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
};
use enumflags2::BitFlags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Result;

mod behavior;
mod directional;
mod synchronized;

pub use behavior::*;
pub use directional::*;
pub use synchronized::*;

/// The concrete variant of a counter
///
/// Counters compared through [`dyn IsCounter`](IsCounter) are only ever equal
/// when their kinds match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum CounterKind {
    /// A bare [Counter]
    Plain,
    /// A [SynchronizedCounter]
    Synchronized,
    /// A [DirectionalCounter] restricted to the given direction
    Directional(Direction),
}

/// Something that is a counter
///
/// Every operation is optional: an implementation may refuse any of them with
/// [Error::UnsupportedOperation](crate::Error::UnsupportedOperation), which is
/// how [DirectionalCounter] restricts movement.
pub trait IsCounter: fmt::Display {
    /// Add one, returning the new count
    fn increment(&self) -> Result<i64>;
    /// Subtract one, returning the new count
    fn decrement(&self) -> Result<i64>;
    /// Read the count
    fn get_count(&self) -> Result<i64>;
    /// Set the count to zero
    fn reset(&self) -> Result<()>;
    /// The variant tag of this counter alone
    fn kind(&self) -> CounterKind;
    /// Variant tags from this counter inward to the innermost delegate;
    /// equality compares the whole chain
    fn kind_chain(&self) -> Vec<CounterKind> { vec![self.kind()] }
    /// Operations this counter will not refuse
    fn supported_operations(&self) -> BitFlags<Operation> { BitFlags::all() }
    /// Will this counter accept the operation?
    fn supports(&self, operation: Operation) -> bool {
        self.supported_operations().contains(operation)
    }

    /// Serialize every operation through a [Mutex](crate::Mutex)
    fn synchronized(self) -> SynchronizedCounter<Self>
    where
        Self: Sized,
    {
        SynchronizedCounter::new(self)
    }
    /// Restrict movement to one direction
    fn directional(self, direction: Direction) -> DirectionalCounter<Self>
    where
        Self: Sized,
    {
        DirectionalCounter::new(self, direction)
    }
    /// Refuse decrements and resets
    fn increasing_only(self) -> DirectionalCounter<Self>
    where
        Self: Sized,
    {
        self.directional(Direction::Increasing)
    }
    /// Refuse increments
    fn decreasing_only(self) -> DirectionalCounter<Self>
    where
        Self: Sized,
    {
        self.directional(Direction::Decreasing)
    }
}

/// Compare two counters of possibly different types
///
/// Both [kind chains](IsCounter::kind_chain) must match. Past that, the same
/// instance is always equal to itself, and otherwise both observed counts must
/// match; a counter that refuses to be read is never equal to anything else.
///
/// A decorator and its own delegate can share an address, so the address
/// alone never makes two counters equal.
pub fn counters_eq<A, B>(a: &A, b: &B) -> bool
where
    A: IsCounter + ?Sized,
    B: IsCounter + ?Sized,
{
    if a.kind_chain() != b.kind_chain() {
        return false;
    }
    core::ptr::eq(a as *const A as *const (), b as *const B as *const ())
        || matches!((a.get_count(), b.get_count()), (Ok(x), Ok(y)) if x == y)
}

impl<'a> PartialEq for dyn IsCounter + 'a {
    fn eq(&self, other: &Self) -> bool { counters_eq(self, other) }
}
impl<'a> PartialEq for dyn IsCounter + Send + 'a {
    fn eq(&self, other: &Self) -> bool { counters_eq(self, other) }
}
impl<'a> PartialEq for dyn IsCounter + Send + Sync + 'a {
    fn eq(&self, other: &Self) -> bool { counters_eq(self, other) }
}

macro_rules! forward_is_counter {
    ($($Ptr:ty),+) => {
        $(
            impl<C: IsCounter + ?Sized> IsCounter for $Ptr {
                fn increment(&self) -> Result<i64> { (**self).increment() }
                fn decrement(&self) -> Result<i64> { (**self).decrement() }
                fn get_count(&self) -> Result<i64> { (**self).get_count() }
                fn reset(&self) -> Result<()> { (**self).reset() }
                fn kind(&self) -> CounterKind { (**self).kind() }
                fn kind_chain(&self) -> Vec<CounterKind> { (**self).kind_chain() }
                fn supported_operations(&self) -> BitFlags<Operation> {
                    (**self).supported_operations()
                }
            }
        )+
    };
}
forward_is_counter!(&C, Box<C>);

/// A signed 64 bit counter
///
/// ### Behavior
/// 1. Every operation is supported and none can fail.
/// 2. Incrementing past [i64::MAX] wraps to [i64::MIN] and vice versa. This is
///    an accepted limitation, not something the counter guards against.
/// 3. The count lives in a [Cell], so a counter can move between threads but
///    cannot be shared by them. Wrap it in a [SynchronizedCounter] for that.
///
/// ```
/// use sync_counters::{Counter, IsCounter};
/// let c = Counter::new(0);
/// assert_eq!(c.increment(), Ok(1));
/// assert_eq!(c.increment(), Ok(2));
/// assert_eq!(c.decrement(), Ok(1));
/// c.reset().unwrap();
/// assert_eq!(c.get_count(), Ok(0));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Counter {
    /// The current count
    count: Cell<i64>,
}

impl Counter {
    /// Instantiate with a starting count
    pub const fn new(count: i64) -> Self { Self { count: Cell::new(count) } }
    /// The current count; never fails for a plain counter
    pub fn get(&self) -> i64 { self.count.get() }
    /// Take the count out
    pub fn into_inner(self) -> i64 { self.count.into_inner() }
    fn step(&self, next: fn(i64) -> i64) -> i64 {
        let count = next(self.count.get());
        self.count.set(count);
        count
    }
}

impl IsCounter for Counter {
    fn increment(&self) -> Result<i64> { Ok(self.step(|c| c.wrapping_add(1))) }
    fn decrement(&self) -> Result<i64> { Ok(self.step(|c| c.wrapping_sub(1))) }
    fn get_count(&self) -> Result<i64> { Ok(self.get()) }
    fn reset(&self) -> Result<()> {
        self.count.set(0);
        Ok(())
    }
    fn kind(&self) -> CounterKind { CounterKind::Plain }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl Hash for Counter {
    fn hash<H: Hasher>(&self, state: &mut H) { self.get().hash(state) }
}

impl From<i64> for Counter {
    fn from(count: i64) -> Self { Self::new(count) }
}

impl From<&Counter> for i64 {
    fn from(counter: &Counter) -> Self { counter.get() }
}

/// Wrap a counter so concurrent callers are serialized through a [Mutex](crate::Mutex)
pub fn make_synchronized<C: IsCounter>(counter: C) -> SynchronizedCounter<C> {
    counter.synchronized()
}

/// Restrict a counter to increasing (`true`) or decreasing (`false`) movement
pub fn make_directional<C: IsCounter>(counter: C, increasing: bool) -> DirectionalCounter<C> {
    counter.directional(Direction::from_increasing(increasing))
}
