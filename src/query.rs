use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{MultiDict, MultiMapping};

/// A single decoded query-string value.
///
/// Query strings carry text, but the four exact spellings `true`, `false`,
/// `True` and `False` are coerced to booleans during [`QueryMultiDict::parse`].
/// Anything else, including `TRUE` or `1`, stays text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryValue {
    Text(String),
    Bool(bool),
}

impl QueryValue {
    /// The decoded text, if this value was not coerced to a boolean.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Text(_) => None,
            Self::Bool(value) => Some(*value),
        }
    }

    // case-sensitive, only these four spellings coerce
    fn from_decoded(text: String) -> Self {
        match text.as_str() {
            "true" | "True" => Self::Bool(true),
            "false" | "False" => Self::Bool(false),
            _ => Self::Text(text),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl PartialEq<str> for QueryValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for QueryValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<bool> for QueryValue {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl Serialize for QueryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

impl<'de> Deserialize<'de> for QueryValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct QueryValueVisitor;

        impl serde::de::Visitor<'_> for QueryValueVisitor {
            type Value = QueryValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a boolean")
            }

            fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<Self::Value, E> {
                Ok(QueryValue::Text(text.to_owned()))
            }

            fn visit_string<E: serde::de::Error>(self, text: String) -> Result<Self::Value, E> {
                Ok(QueryValue::Text(text))
            }

            fn visit_bool<E: serde::de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(QueryValue::Bool(value))
            }
        }

        deserializer.deserialize_any(QueryValueVisitor)
    }
}

/// A mutable multi-value map parsed from a URL query string.
///
/// Thin specialization of [`MultiDict`] (which it derefs to): parsing is the
/// only behavior it adds on top.
///
/// ```
/// use multidict::{MultiMapping, QueryMultiDict, QueryValue};
///
/// let query = QueryMultiDict::parse("a=1&a=2&b=true&c=");
/// assert_eq!(
///     query.multi_items().collect::<Vec<_>>(),
///     [
///         ("a", &QueryValue::from("1")),
///         ("a", &QueryValue::from("2")),
///         ("b", &QueryValue::from(true)),
///         ("c", &QueryValue::from("")),
///     ],
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMultiDict(MultiDict<QueryValue>);

impl_deref!(QueryMultiDict: MultiDict<QueryValue>);

impl QueryMultiDict {
    #[must_use]
    pub fn new() -> Self {
        Self(MultiDict::new())
    }

    /// Parse a raw query string (the part of a URL after `?`, without the
    /// leading `?`) as `application/x-www-form-urlencoded` pairs.
    ///
    /// Keys and values are percent-decoded (`+` decodes to a space, invalid
    /// UTF-8 is decoded lossily). Blank values are significant and retained,
    /// and a pair without `=` counts as present with an empty-string value.
    /// The left-to-right order of pairs is preserved, duplicates included;
    /// an empty input yields an empty map.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut dict = MultiDict::new();
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match pair.split_once('=') {
                Some((raw_key, raw_value)) => (raw_key, raw_value),
                None => (pair, ""),
            };
            dict.append(
                decode_component(raw_key),
                QueryValue::from_decoded(decode_component(raw_value)),
            );
        }
        tracing::trace!(pairs = dict.values_len(), "parsed query string");
        Self(dict)
    }

    #[must_use]
    pub fn into_dict(self) -> MultiDict<QueryValue> {
        self.0
    }
}

// plus-to-space first: a literal `+` only survives the wire as `%2B`,
// which the percent pass below leaves alone until after the replacement
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

impl MultiMapping<QueryValue> for QueryMultiDict {
    fn get_all(&self, key: &str) -> &[QueryValue] {
        self.0.get_all(key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }
}

impl From<MultiDict<QueryValue>> for QueryMultiDict {
    fn from(dict: MultiDict<QueryValue>) -> Self {
        Self(dict)
    }
}

impl<K: Into<SmolStr>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryMultiDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl Serialize for QueryMultiDict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryMultiDict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        MultiDict::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_duplicates_and_blanks() {
        let query = QueryMultiDict::parse("a=1&a=2&b=true&c=");
        let items: Vec<_> = query.multi_items().collect();
        assert_eq!(
            items,
            [
                ("a", &QueryValue::from("1")),
                ("a", &QueryValue::from("2")),
                ("b", &QueryValue::from(true)),
                ("c", &QueryValue::from("")),
            ]
        );
    }

    #[test]
    fn test_parse_empty_query() {
        assert!(QueryMultiDict::parse("").is_empty());
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let query = QueryMultiDict::parse("&a=1&&b=2&");
        assert_eq!(query.values_len(), 2);
        assert_eq!(query.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_parse_key_without_equals_is_blank() {
        let query = QueryMultiDict::parse("flag&a=1");
        assert_eq!(query.get("flag"), Some(&QueryValue::from("")));
        assert_eq!(query.get("a"), Some(&QueryValue::from("1")));
    }

    #[test]
    fn test_parse_percent_and_plus_decoding() {
        let query = QueryMultiDict::parse("na%20me=jane+doe&sym=%2B1&emoji=%F0%9F%A6%99");
        assert_eq!(query.get("na me"), Some(&QueryValue::from("jane doe")));
        assert_eq!(query.get("sym"), Some(&QueryValue::from("+1")));
        assert_eq!(query.get("emoji"), Some(&QueryValue::from("🦙")));
    }

    #[test]
    fn test_boolean_coercion_is_case_sensitive_and_exact() {
        let query = QueryMultiDict::parse("a=true&b=False&c=TRUE&d=1&e=truthy");
        assert_eq!(query.get("a"), Some(&QueryValue::Bool(true)));
        assert_eq!(query.get("b"), Some(&QueryValue::Bool(false)));
        assert_eq!(query.get("c"), Some(&QueryValue::from("TRUE")));
        assert_eq!(query.get("d"), Some(&QueryValue::from("1")));
        assert_eq!(query.get("e"), Some(&QueryValue::from("truthy")));
    }

    #[test]
    fn test_blank_key_is_kept() {
        let query = QueryMultiDict::parse("=5");
        assert_eq!(query.get(""), Some(&QueryValue::from("5")));
    }

    #[test]
    fn test_mutation_through_deref() {
        let mut query = QueryMultiDict::parse("a=1");
        query.append("a", QueryValue::from("2"));
        assert_eq!(query.get_all("a"), [QueryValue::from("1"), QueryValue::from("2")]);
    }

    #[test]
    fn test_value_display_and_accessors() {
        assert_eq!(QueryValue::from("x").to_string(), "x");
        assert_eq!(QueryValue::from(true).to_string(), "true");
        assert_eq!(QueryValue::from("x").as_str(), Some("x"));
        assert_eq!(QueryValue::from("x").as_bool(), None);
        assert_eq!(QueryValue::from(false).as_bool(), Some(false));
    }

    #[test]
    fn test_serde_round_trip() {
        let query = QueryMultiDict::parse("a=1&b=true");
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"[["a","1"],["b",true]]"#);
        let back: QueryMultiDict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
