use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, ser::SerializeSeq};
use smol_str::SmolStr;

use crate::{ImmutableMultiDict, MultiMapping};

/// A mutable ordered multi-value map.
///
/// One key can be bound to several values at once. Values of a key keep
/// their insertion order, distinct keys keep the order in which they were
/// first inserted, and lookups default to the first-inserted value of a key.
///
/// Equality compares the per-key ordered value lists only: two dictionaries
/// built from differently interleaved insertions are equal as long as every
/// key ends up with the same values in the same order.
///
/// ```
/// use multidict::{MultiDict, MultiMapping};
///
/// let mut dict = MultiDict::new();
/// dict.append("a", 1);
/// dict.append("b", 2);
/// dict.append("a", 3);
///
/// assert_eq!(dict.get("a"), Some(&1));
/// assert_eq!(dict.get_all("a"), [1, 3]);
///
/// dict.insert("a", 4);
/// assert_eq!(dict.get_all("a"), [4]);
/// // "a" kept its position in front of "b"
/// assert_eq!(dict.keys().collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDict<T> {
    // invariant: no key maps to an empty value list
    entries: IndexMap<SmolStr, Vec<T>>,
}

impl<T> MultiDict<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of stored values, duplicates included.
    #[must_use]
    pub fn values_len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Get all values stored for `key`, in insertion order.
    ///
    /// Returns an empty slice if the key is absent.
    pub fn get_all(&self, key: &str) -> &[T] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate the distinct keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(SmolStr::as_str)
    }

    /// Iterate `(key, values)` groups in first-insertion key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Append a new entry for `key`, never overwriting existing ones.
    pub fn append(&mut self, key: impl Into<SmolStr>, value: T) {
        self.entries.entry(key.into()).or_default().push(value);
    }

    /// Replace all values of `key` with the single given value, returning
    /// the replaced values.
    ///
    /// A key that already existed keeps its position in iteration order;
    /// a new key is appended at the end.
    pub fn insert(&mut self, key: impl Into<SmolStr>, value: T) -> Vec<T> {
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                std::mem::replace(entry.get_mut(), vec![value])
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(vec![value]);
                Vec::new()
            }
        }
    }

    /// Replace all values of `key` with the given ordered sequence,
    /// returning the replaced values.
    ///
    /// An empty sequence removes the key entirely.
    pub fn insert_all(
        &mut self,
        key: impl Into<SmolStr>,
        values: impl IntoIterator<Item = T>,
    ) -> Vec<T> {
        let key = key.into();
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            self.entries.shift_remove(&key).unwrap_or_default()
        } else {
            self.entries.insert(key, values).unwrap_or_default()
        }
    }

    /// Delete all entries for `key`, returning the removed values.
    ///
    /// An absent key is a silent no-op returning an empty vec, for
    /// uniformity with [`get_all`](Self::get_all) defaulting to empty.
    /// Remaining keys keep their relative order.
    pub fn remove(&mut self, key: &str) -> Vec<T> {
        self.entries.shift_remove(key).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot this dictionary as an [`ImmutableMultiDict`].
    ///
    /// The snapshot owns a private copy: mutating `self` afterwards does
    /// not affect it.
    ///
    /// ```
    /// use multidict::{MultiDict, MultiMapping};
    ///
    /// let mut dict: MultiDict<u8> = [("a", 1)].into_iter().collect();
    /// let frozen = dict.to_immutable();
    /// dict.append("a", 2);
    ///
    /// assert_eq!(frozen.get_all("a"), [1]);
    /// assert_eq!(dict.get_all("a"), [1, 2]);
    /// ```
    #[must_use]
    pub fn to_immutable(&self) -> ImmutableMultiDict<T>
    where
        T: Clone,
    {
        self.clone().into_immutable()
    }

    /// Consuming, allocation-free variant of [`to_immutable`](Self::to_immutable).
    #[must_use]
    pub fn into_immutable(self) -> ImmutableMultiDict<T> {
        ImmutableMultiDict::from(self)
    }
}

impl<T> Default for MultiDict<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MultiMapping<T> for MultiDict<T> {
    fn get_all(&self, key: &str) -> &[T] {
        MultiDict::get_all(self, key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        MultiDict::keys(self)
    }
}

impl<K: Into<SmolStr>, T> Extend<(K, T)> for MultiDict<T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.append(key, value);
        }
    }
}

impl<K: Into<SmolStr>, T> FromIterator<(K, T)> for MultiDict<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<SmolStr>, T, S> From<HashMap<K, T, S>> for MultiDict<T> {
    /// Build from a plain mapping, one value per key.
    fn from(map: HashMap<K, T, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<SmolStr>, T, S> From<IndexMap<K, T, S>> for MultiDict<T> {
    /// Build from a plain ordered mapping, one value per key.
    fn from(map: IndexMap<K, T, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<T> IntoIterator for MultiDict<T> {
    type Item = (SmolStr, Vec<T>);
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            entries_iter: self.entries.into_iter(),
        }
    }
}

/// Owned iterator over the `(key, values)` groups of a [`MultiDict`].
#[derive(Debug)]
pub struct IntoIter<T> {
    entries_iter: indexmap::map::IntoIter<SmolStr, Vec<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = (SmolStr, Vec<T>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries_iter.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries_iter.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.entries_iter.len()
    }
}

// Serialized as an ordered sequence of (key, value) pairs so that
// duplicate keys round-trip.
impl<T: Serialize> Serialize for MultiDict<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.values_len()))?;
        for (key, values) in &self.entries {
            for value in values {
                seq.serialize_element(&(key, value))?;
            }
        }
        seq.end()
    }
}

// Accepts either a sequence of (key, value) pairs or a plain map,
// mirroring the construction shapes. Anything else fails fast with a
// shape error before any entry is visible.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for MultiDict<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(MultiDictVisitor(PhantomData))
    }
}

struct MultiDictVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> serde::de::Visitor<'de> for MultiDictVisitor<T> {
    type Value = MultiDict<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of (key, value) pairs or a map")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut dict = MultiDict::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some((key, value)) = seq.next_element::<(SmolStr, T)>()? {
            dict.append(key, value);
        }
        Ok(dict)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut dict = MultiDict::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<SmolStr, T>()? {
            dict.append(key, value);
        }
        Ok(dict)
    }
}
