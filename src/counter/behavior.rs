//! Counter behavioral elements
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use enumflags2::{bitflags, make_bitflags, BitFlags};

use crate::{Error, Result};


/// Counter operations, any of which a counter may refuse
#[bitflags]
#[repr(u8)]
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
  strum::Display, strum::EnumIter, strum::IntoStaticStr
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Operation {
  /// Add one
  Increment = 1 << 0,
  /// Subtract one
  Decrement = 1 << 1,
  /// Read the count
  GetCount = 1 << 2,
  /// Set the count to zero
  Reset = 1 << 3,
}

/// A single direction of movement for a
/// [directional counter](crate::DirectionalCounter)
///
/// Reset counts as a move toward zero, so it belongs to the decreasing
/// direction only.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
  strum::Display, strum::EnumCount, strum::EnumIter
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Direction {
  /// Only ever goes up
  Increasing,
  /// Only ever goes down (or back to zero)
  Decreasing,
}
impl Direction {
  const INCREASING: BitFlags<Operation> = make_bitflags!(Operation::{Increment | GetCount});
  const DECREASING: BitFlags<Operation> = make_bitflags!(Operation::{Decrement | GetCount | Reset});

  /// Pick a direction from an "increasing?" flag
  pub const fn from_increasing(increasing: bool) -> Self {
    if increasing { Self::Increasing } else { Self::Decreasing }
  }

  /// The operations allowed when moving in this direction
  pub const fn permitted(&self) -> BitFlags<Operation> {
    match self {
      Self::Increasing => Self::INCREASING,
      Self::Decreasing => Self::DECREASING,
    }
  }

  /// Is this operation allowed?
  pub fn permits(&self, operation: Operation) -> bool {
    self.permitted().contains(operation)
  }

  /// Reject operations that are not permitted in this direction
  pub fn admit(&self, operation: Operation) -> Result<()> {
    if self.permits(operation) {
      return Ok(());
    }
    tracing::debug!(%operation, direction = %self, "directional counter rejected operation");
    Err(Error::UnsupportedOperation { operation, direction: *self })
  }
}
impl From<bool> for Direction {
  fn from(increasing: bool) -> Self { Self::from_increasing(increasing) }
}

#[cfg(test)]
mod behavior_tests {
  use super::*;
  use strum::{EnumCount, IntoEnumIterator};

  #[test]
  fn every_direction_reads_and_moves_one_way() {
    assert_eq!(Direction::COUNT, 2);
    Direction::iter().for_each(|direction| {
      let permitted = direction.permitted();
      assert!(permitted.contains(Operation::GetCount), "{direction} must allow reads");
      assert_ne!(
        permitted.contains(Operation::Increment),
        permitted.contains(Operation::Decrement),
        "{direction} must move in exactly one direction"
      );
    });
  }

  #[test]
  fn reset_is_a_decreasing_move() {
    assert!(!Direction::Increasing.permits(Operation::Reset));
    assert!(Direction::Decreasing.permits(Operation::Reset));
  }

  #[test]
  fn admit_names_the_rejected_operation() {
    assert_eq!(Direction::Decreasing.admit(Operation::Decrement), Ok(()));
    assert_eq!(
      Direction::Decreasing.admit(Operation::Increment),
      Err(Error::UnsupportedOperation {
        operation: Operation::Increment,
        direction: Direction::Decreasing,
      })
    );
    let refused: Vec<_> = Operation::iter()
      .filter(|op| Direction::Increasing.admit(*op).is_err())
      .collect();
    assert_eq!(refused, vec![Operation::Decrement, Operation::Reset]);
  }

  #[test]
  fn flag_picks_direction() {
    assert_eq!(Direction::from(true), Direction::Increasing);
    assert_eq!(Direction::from_increasing(false), Direction::Decreasing);
    assert_eq!(Direction::Increasing.to_string(), "increasing");
    let name: &'static str = Operation::GetCount.into();
    assert_eq!(name, "get_count");
  }
}
