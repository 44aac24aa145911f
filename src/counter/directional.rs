//! Counters restricted to one direction of movement

use core::fmt;
use enumflags2::BitFlags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CounterKind, Direction, IsCounter, Operation, Result};

/// A counter that refuses to move against its [Direction]
///
/// | Direction    | increment | decrement | reset   | get_count |
/// |--------------|-----------|-----------|---------|-----------|
/// | `Increasing` | yes       | refused   | refused | yes       |
/// | `Decreasing` | refused   | yes       | yes     | yes       |
///
/// Refusals happen before the delegate is touched. Equality, rendering and
/// duplication go straight to the delegate; a clone keeps its direction.
///
/// ```
/// use sync_counters::{Counter, Error, IsCounter};
/// let c = Counter::new(5).increasing_only();
/// assert_eq!(c.increment(), Ok(6));
/// assert!(matches!(c.decrement(), Err(Error::UnsupportedOperation { .. })));
/// assert_eq!(c.get_count(), Ok(6));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct DirectionalCounter<C> {
    delegate: C,
    direction: Direction,
}

impl<C> DirectionalCounter<C> {
    /// Restrict `delegate` to `direction`
    pub const fn new(delegate: C, direction: Direction) -> Self {
        Self { delegate, direction }
    }
    /// The direction this counter may move in
    pub fn direction(&self) -> Direction { self.direction }
    /// The wrapped counter
    pub fn get_ref(&self) -> &C { &self.delegate }
    /// Drop the restriction and take the wrapped counter out
    pub fn into_inner(self) -> C { self.delegate }
}

impl<C: IsCounter> IsCounter for DirectionalCounter<C> {
    fn increment(&self) -> Result<i64> {
        self.direction.admit(Operation::Increment)?;
        self.delegate.increment()
    }
    fn decrement(&self) -> Result<i64> {
        self.direction.admit(Operation::Decrement)?;
        self.delegate.decrement()
    }
    fn get_count(&self) -> Result<i64> {
        self.direction.admit(Operation::GetCount)?;
        self.delegate.get_count()
    }
    fn reset(&self) -> Result<()> {
        self.direction.admit(Operation::Reset)?;
        self.delegate.reset()
    }
    fn kind(&self) -> CounterKind { CounterKind::Directional(self.direction) }
    fn kind_chain(&self) -> Vec<CounterKind> {
        let mut chain = vec![self.kind()];
        chain.extend(self.delegate.kind_chain());
        chain
    }
    fn supported_operations(&self) -> BitFlags<Operation> {
        self.direction.permitted() & self.delegate.supported_operations()
    }
}

impl<C: fmt::Display> fmt::Display for DirectionalCounter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.delegate, f)
    }
}
