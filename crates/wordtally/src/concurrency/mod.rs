//! # Concurrency Utilities
//!
//! The map stage execution model: each chunk is counted by an
//! independent worker which owns its partial table; results flow back
//! over a channel to a single barrier in the driver.

pub mod collector;
pub mod executor;
pub mod threads;

#[doc(inline)]
pub use executor::{DEFAULT_CANCEL_GRACE, MapBackend, MapExecutor};
#[doc(inline)]
pub use threads::{est_max_parallelism, resolve_workers};
