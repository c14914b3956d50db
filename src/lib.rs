#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

/// Error type shared by the map and the rebuild policy.
pub mod error;

/// A HashMap implementation over the linear-probing table.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The raw open-addressing table: a dense entry store addressed through a
/// linear-probing slot index with tombstone deletion.
pub mod hash_table;

/// Density configuration deciding when the slot index is rebuilt.
pub mod policy;

pub use error::Error;
pub use error::Result;
pub use hash_map::DefaultHashBuilder;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
pub use policy::RebuildPolicy;
