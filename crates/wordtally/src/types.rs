//! # Common Types and Traits
use core::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::AddAssign,
};

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

/// A type that can be used as a word count.
///
/// These are constrained to be unsigned primitive integers;
/// sums are overflow-checked, so narrow types are safe (if limited).
pub trait CountType:
    'static
    + PrimInt
    + FromPrimitive
    + ToPrimitive
    + Unsigned
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + AddAssign
{
}

impl<T> CountType for T where
    T: 'static
        + PrimInt
        + FromPrimitive
        + ToPrimitive
        + Unsigned
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
        + AddAssign
{
}

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type WTHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WTHashMap<K, V> {
            WTHashMap::with_capacity(capacity)
        }

        /// Iterator over hash map entries.
        ///
        /// Note: `ahash::AHashMap` is a specialization of `std::collections::HashMap`.
        pub type WTHashIter<'a, K, V> = std::collections::hash_map::Iter<'a, K, V>;

        /// Owning iterator over hash map entries.
        pub type WTHashIntoIter<K, V> = std::collections::hash_map::IntoIter<K, V>;

    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type WTHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WTHashMap<K, V> {
            foldhash::HashMapExt::with_capacity(capacity)
        }

        /// Iterator over hash map entries.
        ///
        /// Note: `foldhash::HashMap` is a specialization of `std::collections::HashMap`.
        pub type WTHashIter<'a, K, V> = std::collections::hash_map::Iter<'a, K, V>;

        /// Owning iterator over hash map entries.
        pub type WTHashIntoIter<K, V> = std::collections::hash_map::IntoIter<K, V>;

    } else if #[cfg(feature = "std")] {
        /// Type Alias for hash maps in this crate.
        pub type WTHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WTHashMap<K, V> {
            WTHashMap::with_capacity(capacity)
        }

        /// Iterator over hash map entries.
        pub type WTHashIter<'a, K, V> = std::collections::hash_map::Iter<'a, K, V>;

        /// Owning iterator over hash map entries.
        pub type WTHashIntoIter<K, V> = std::collections::hash_map::IntoIter<K, V>;

    } else {
        /// The pipeline is built on threads and channels.
        compile_error!("wordtally requires the \"std\" feature");
    }
}

/// Compile-time check that a value is `Send`.
pub fn check_is_send<S: Send>(_: S) {}

/// Compile-time check that a value is `Sync`.
pub fn check_is_sync<S: Sync>(_: S) {}
