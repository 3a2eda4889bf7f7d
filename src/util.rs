//! Small shared utilities used across the crate.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use ahash::AHasher;

/// A [`HashMap`] keyed with [`ahash`] instead of the (DoS-resistant but
/// slower) default `SipHash`.
///
/// Every hot map in this crate — `EntityId -> ComponentTypeId` membership
/// sets, `ComponentTypeId -> Column`, and each `Column`'s own
/// `EntityId -> value` map — is built from small integer keys that are
/// looked up on every read and write, so the hashing cost is the thing
/// worth shaving off.
pub type FastMap<K, V> = HashMap<K, V, BuildHasherDefault<AHasher>>;
