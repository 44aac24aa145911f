//! Long counters with composable, decorating behaviors
//!
//! ### Comes with
//! - A plain signed 64 bit [Counter] supporting increment, decrement, read and reset,
//! - [SynchronizedCounter], which serializes every call through a lock so many threads can share one counter,
//! - [DirectionalCounter], which refuses to move against its [Direction] (increasing counters cannot be reset either),
//! - The [SyncPrimitive] acquire/release contract, with a fair [Mutex], a counting [Semaphore] and a [SpinLock], all cancellable through [sync::interrupt], and
//! - [PartialEq], [Eq], [Hash](core::hash::Hash), [Clone], [Debug](core::fmt::Debug), [Display](core::fmt::Display) on every counter.
//!
//! Decorators wrap any [IsCounter], including each other:
//! ```
//! use sync_counters::{Counter, Error, IsCounter};
//! let c = Counter::new(5).synchronized().increasing_only();
//! assert_eq!(c.increment(), Ok(6));
//! assert!(matches!(c.decrement(), Err(Error::UnsupportedOperation { .. })));
//! assert_eq!(c.get_count(), Ok(6));
//! ```
//!
//! ### Optional features
//! - `serde`: Enable de/serialization

mod counter;
mod error;
pub mod sync;

pub use counter::*;
pub use error::*;
pub use sync::{Exclusive, Mutex, Semaphore, SpinLock, SyncPrimitive};
