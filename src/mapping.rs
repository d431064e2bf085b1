use indexmap::IndexMap;
use smol_str::SmolStr;

/// Shared read surface of the multi-value dictionaries.
///
/// Implemented by [`MultiDict`] and [`ImmutableMultiDict`] alike: both are
/// views over an ordered multi-valued structure and differ only in
/// mutability. Everything here is derived from two primitives, so an
/// implementor only has to supply [`get_all`] and [`keys`].
///
/// [`MultiDict`]: crate::MultiDict
/// [`ImmutableMultiDict`]: crate::ImmutableMultiDict
/// [`get_all`]: MultiMapping::get_all
/// [`keys`]: MultiMapping::keys
pub trait MultiMapping<T> {
    /// Get all values stored for `key`, in insertion order.
    ///
    /// Returns an empty slice if the key is absent; a key that was
    /// removed is indistinguishable from one never inserted.
    fn get_all(&self, key: &str) -> &[T];

    /// Iterate the distinct keys, deduplicated, in first-insertion order.
    fn keys(&self) -> impl Iterator<Item = &str>;

    /// Get the first-inserted value for `key`.
    fn get(&self, key: &str) -> Option<&T> {
        self.get_all(key).first()
    }

    /// Returns true if at least one value is stored for `key`.
    fn contains_key(&self, key: &str) -> bool {
        !self.get_all(key).is_empty()
    }

    /// Collect a newly allocated mapping from each distinct key to the
    /// ordered list of all its values.
    ///
    /// The value lists are defensive copies: mutating the returned map never
    /// affects this dictionary, and vice versa.
    ///
    /// ```
    /// use multidict::{MultiDict, MultiMapping};
    ///
    /// let dict: MultiDict<u8> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
    /// let map = dict.to_map();
    /// assert_eq!(map["a"], [1, 3]);
    /// assert_eq!(map["b"], [2]);
    /// ```
    fn to_map(&self) -> IndexMap<SmolStr, Vec<T>>
    where
        T: Clone,
    {
        self.keys()
            .map(|key| (SmolStr::new(key), self.get_all(key).to_vec()))
            .collect()
    }

    /// Iterate every stored `(key, value)` pair, duplicates included.
    ///
    /// Keys are visited in first-insertion order, the values of each key in
    /// their stored order. The iterator is lazy and restartable: each call
    /// yields a fresh sequence and never mutates the dictionary.
    fn multi_items<'a>(&'a self) -> impl Iterator<Item = (&'a str, &'a T)>
    where
        T: 'a,
    {
        self.keys()
            .flat_map(move |key| self.get_all(key).iter().map(move |value| (key, value)))
    }

    /// Deprecated alias for [`get_all`](MultiMapping::get_all).
    ///
    /// Behaves identically to its replacement and additionally emits a
    /// non-fatal deprecation event on the `multidict::deprecated` tracing
    /// target.
    #[deprecated(since = "0.2.0", note = "use `get_all` instead")]
    fn get_list(&self, key: &str) -> &[T] {
        deprecation_notice("get_list", "get_all");
        self.get_all(key)
    }
}

// Kept separate from the data structures so the notice mechanism can change
// without touching them.
fn deprecation_notice(method: &'static str, replacement: &'static str) {
    tracing::warn!(
        target: "multidict::deprecated",
        method,
        replacement,
        "deprecated method called",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MultiDict;

    #[test]
    fn test_get_defaults_to_first_value() {
        let dict: MultiDict<&str> = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(dict.get("a"), Some(&"1"));
        assert_eq!(dict.get("b"), Some(&"2"));
        assert_eq!(dict.get("missing"), None);
    }

    #[test]
    fn test_contains_key() {
        let mut dict: MultiDict<u8> = [("a", 1)].into_iter().collect();
        assert!(dict.contains_key("a"));
        assert!(!dict.contains_key("b"));

        dict.remove("a");
        assert!(!dict.contains_key("a"));
    }

    #[test]
    fn test_to_map_groups_in_insertion_order() {
        let dict: MultiDict<u8> = [("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)]
            .into_iter()
            .collect();
        let map = dict.to_map();
        assert_eq!(
            map.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
        assert_eq!(map["a"], [1, 3]);
        assert_eq!(map["b"], [2, 5]);
        assert_eq!(map["c"], [4]);
    }

    #[test]
    fn test_multi_items_is_restartable() {
        let dict: MultiDict<u8> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        let first: Vec<_> = dict.multi_items().collect();
        let second: Vec<_> = dict.multi_items().collect();
        assert_eq!(first, second);
        assert_eq!(first, [("a", &1), ("a", &3), ("b", &2)]);
    }

    #[test]
    #[allow(deprecated)]
    fn test_get_list_matches_get_all() {
        let dict: MultiDict<u8> = [("a", 1), ("a", 2)].into_iter().collect();
        assert_eq!(dict.get_list("a"), dict.get_all("a"));
        assert!(dict.get_list("missing").is_empty());
    }
}
