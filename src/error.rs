//! Errors raised by counters and sync primitives
use crate::{Direction, Operation};

/// Failures surfaced by counter operations and by [acquire](crate::SyncPrimitive::acquire)
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// A directional counter refused an operation outside its direction.
    /// The counter is left untouched.
    #[error("Unsupported operation: {operation} on a counter restricted to {direction} movement.")]
    UnsupportedOperation {
        operation: Operation,
        direction: Direction,
    },

    /// A wait for entry was cancelled by an [interrupt](crate::sync::interrupt).
    /// No entry was granted.
    #[error("Interrupted while waiting for entry.")]
    Interrupted,
}

impl Error {
    /// Is this a directional rejection?
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Was a wait cancelled?
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_operation_and_direction() {
        let e = Error::UnsupportedOperation {
            operation: Operation::Reset,
            direction: Direction::Increasing,
        };
        assert!(e.is_unsupported());
        assert!(!e.is_interrupted());
        assert_eq!(
            e.to_string(),
            "Unsupported operation: reset on a counter restricted to increasing movement."
        );
        assert_eq!(Error::Interrupted.to_string(), "Interrupted while waiting for entry.");
    }
}
