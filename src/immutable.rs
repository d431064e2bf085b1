use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{MultiDict, MultiMapping};

/// A read-only ordered multi-value map.
///
/// The immutable counterpart of [`MultiDict`]: it guarantees callers cannot
/// mutate request-derived data handed to them. It always owns a private copy
/// of its entries, so later changes to whatever it was constructed from never
/// leak through.
///
/// ```
/// use multidict::{ImmutableMultiDict, MultiMapping};
///
/// let frozen: ImmutableMultiDict<u8> = [("a", 1), ("a", 2)].into_iter().collect();
/// assert_eq!(frozen.get_all("a"), [1, 2]);
///
/// let mut copy = frozen.to_mutable();
/// copy.append("a", 3);
/// // the copy is fully decoupled
/// assert_eq!(frozen.get_all("a"), [1, 2]);
/// assert_eq!(copy.get_all("a"), [1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableMultiDict<T> {
    inner: MultiDict<T>,
}

impl<T> ImmutableMultiDict<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MultiDict::new(),
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of stored values, duplicates included.
    #[must_use]
    pub fn values_len(&self) -> usize {
        self.inner.values_len()
    }

    /// Get all values stored for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[T] {
        self.inner.get_all(key)
    }

    /// Iterate the distinct keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys()
    }

    /// Iterate `(key, values)` groups in first-insertion key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.inner.iter()
    }

    /// Copy this dictionary into a new [`MultiDict`] with the same entries
    /// in the same multi-order.
    ///
    /// The result shares no backing storage with `self`: mutating it never
    /// changes this dictionary.
    #[must_use]
    pub fn to_mutable(&self) -> MultiDict<T>
    where
        T: Clone,
    {
        self.inner.clone()
    }

    /// Consuming, allocation-free variant of [`to_mutable`](Self::to_mutable).
    #[must_use]
    pub fn into_mutable(self) -> MultiDict<T> {
        self.inner
    }
}

impl<T> Default for ImmutableMultiDict<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MultiMapping<T> for ImmutableMultiDict<T> {
    fn get_all(&self, key: &str) -> &[T] {
        ImmutableMultiDict::get_all(self, key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        ImmutableMultiDict::keys(self)
    }
}

impl<T> From<MultiDict<T>> for ImmutableMultiDict<T> {
    fn from(dict: MultiDict<T>) -> Self {
        Self { inner: dict }
    }
}

impl<T> From<ImmutableMultiDict<T>> for MultiDict<T> {
    fn from(dict: ImmutableMultiDict<T>) -> Self {
        dict.into_mutable()
    }
}

impl<K: Into<SmolStr>, T> FromIterator<(K, T)> for ImmutableMultiDict<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        MultiDict::from_iter(iter).into_immutable()
    }
}

impl<K: Into<SmolStr>, T, S> From<HashMap<K, T, S>> for ImmutableMultiDict<T> {
    /// Build from a plain mapping, one value per key.
    fn from(map: HashMap<K, T, S>) -> Self {
        MultiDict::from(map).into_immutable()
    }
}

impl<K: Into<SmolStr>, T, S> From<IndexMap<K, T, S>> for ImmutableMultiDict<T> {
    /// Build from a plain ordered mapping, one value per key.
    fn from(map: IndexMap<K, T, S>) -> Self {
        MultiDict::from(map).into_immutable()
    }
}

impl<T: PartialEq> PartialEq<MultiDict<T>> for ImmutableMultiDict<T> {
    fn eq(&self, other: &MultiDict<T>) -> bool {
        self.inner == *other
    }
}

impl<T: PartialEq> PartialEq<ImmutableMultiDict<T>> for MultiDict<T> {
    fn eq(&self, other: &ImmutableMultiDict<T>) -> bool {
        *self == other.inner
    }
}

impl<T: Serialize> Serialize for ImmutableMultiDict<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ImmutableMultiDict<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        MultiDict::deserialize(deserializer).map(MultiDict::into_immutable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutable_copy_is_equal_and_decoupled() {
        let frozen: ImmutableMultiDict<u8> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        let mut copy = frozen.to_mutable();
        assert_eq!(copy, frozen);

        copy.append("a", 4);
        copy.remove("b");
        assert_eq!(frozen.get_all("a"), [1, 3]);
        assert_eq!(frozen.get_all("b"), [2]);
        assert_eq!(copy.get_all("a"), [1, 3, 4]);
    }

    #[test]
    fn test_construction_does_not_leak_source_mutation() {
        let mut source: MultiDict<u8> = [("a", 1)].into_iter().collect();
        let frozen = source.to_immutable();
        source.append("a", 2);
        assert_eq!(frozen.get_all("a"), [1]);
    }

    #[test]
    fn test_cross_variant_equality() {
        let dict: MultiDict<u8> = [("a", 1), ("b", 2)].into_iter().collect();
        let frozen: ImmutableMultiDict<u8> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(frozen, dict);
        assert_eq!(dict, frozen);
    }

    #[test]
    fn test_read_ops_via_shared_trait() {
        let frozen: ImmutableMultiDict<&str> = [("a", "x"), ("a", "y")].into_iter().collect();
        assert_eq!(frozen.get("a"), Some(&"x"));
        assert!(frozen.contains_key("a"));
        assert_eq!(
            frozen.multi_items().collect::<Vec<_>>(),
            [("a", &"x"), ("a", &"y")]
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let frozen: ImmutableMultiDict<u8> = [("a", 1), ("a", 2)].into_iter().collect();
        let json = serde_json::to_string(&frozen).unwrap();
        let back: ImmutableMultiDict<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frozen);
    }
}
