//! Request parameter sets and their wire encoding.
//!
//! The platform signs the query string it receives, so the encoding here must
//! match byte for byte what the server re-computes: keys sorted ascending,
//! keys left as-is, values form-escaped (space as `+`, everything outside
//! `A-Za-z0-9-_.~` percent-encoded with upper-case hex).

use std::collections::BTreeMap;
use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// How a string map parameter expands into indexed query keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEncoding {
    /// `name[i].key=<k>` and `name[i].value=<v>`.
    KeyValue,
    /// `name[i].<k>=<v>`.
    InlineKey,
    /// `name[i].service=<k>` and `name[i].provider=<v>`.
    ServiceProvider,
    /// `name[i].account=<k>` and `name[i].group=<v>`.
    AccountGroup,
}

impl MapEncoding {
    /// Picks the encoding for a map parameter.
    ///
    /// `force_key_value` is set for operations that expect every map in the
    /// generic key/value form.
    ///
    /// ## Examples
    ///
    /// ```
    /// use cloudstack_runtime::MapEncoding;
    ///
    /// assert_eq!(MapEncoding::for_field("details", false), MapEncoding::InlineKey);
    /// assert_eq!(MapEncoding::for_field("details", true), MapEncoding::KeyValue);
    /// assert_eq!(MapEncoding::for_field("tags", false), MapEncoding::KeyValue);
    /// ```
    pub fn for_field(name: &str, force_key_value: bool) -> Self {
        if force_key_value {
            return Self::KeyValue;
        }
        match name {
            "details" => Self::InlineKey,
            "serviceproviderlist" => Self::ServiceProvider,
            "usersecuritygrouplist" => Self::AccountGroup,
            _ => Self::KeyValue,
        }
    }

    fn pair_names(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::KeyValue => Some(("key", "value")),
            Self::InlineKey => None,
            Self::ServiceProvider => Some(("service", "provider")),
            Self::AccountGroup => Some(("account", "group")),
        }
    }
}

/// An ordered set of request parameters.
///
/// Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    values: BTreeMap<String, String>,
}

impl Query {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw string value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Sets any value through its `Display` text (integers, floats, bools).
    pub fn set_display<T: Display>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.set(key, value.to_string())
    }

    /// Sets a list value joined with commas.
    pub fn set_list<S: AsRef<str>>(&mut self, key: impl Into<String>, values: &[S]) -> &mut Self {
        let joined = values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.set(key, joined)
    }

    /// Sets an opaque list value; strings are written unquoted, everything
    /// else as JSON text, joined with commas.
    pub fn set_values(&mut self, key: impl Into<String>, values: &[serde_json::Value]) -> &mut Self {
        let joined = values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",");
        self.set(key, joined)
    }

    /// Expands a string map into indexed keys.
    ///
    /// Entries are indexed in ascending key order.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use cloudstack_runtime::{MapEncoding, Query};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("Dns".to_string(), "VirtualRouter".to_string());
    ///
    /// let mut q = Query::new();
    /// q.set_map("serviceproviderlist", &map, MapEncoding::ServiceProvider);
    /// assert_eq!(q.get("serviceproviderlist[0].service"), Some("Dns"));
    /// assert_eq!(q.get("serviceproviderlist[0].provider"), Some("VirtualRouter"));
    /// ```
    pub fn set_map(
        &mut self,
        key: &str,
        map: &BTreeMap<String, String>,
        encoding: MapEncoding,
    ) -> &mut Self {
        for (i, (k, v)) in map.iter().enumerate() {
            match encoding.pair_names() {
                Some((key_name, value_name)) => {
                    self.set(format!("{key}[{i}].{key_name}"), k.clone());
                    self.set(format!("{key}[{i}].{value_name}"), v.clone());
                }
                None => {
                    self.set(format!("{key}[{i}].{k}"), v.clone());
                }
            }
        }
        self
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encodes the set as `k=v&k=v`, sorted by key, escaping values only.
    pub fn encode(&self) -> String {
        encode_values(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.set(k, v);
        }
        query
    }
}

/// Form-escapes a single query value.
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::query::query_escape;
///
/// assert_eq!(query_escape("a b/c"), "a+b%2Fc");
/// assert_eq!(query_escape("x-y_z.~"), "x-y_z.~");
/// ```
pub fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE)
        .to_string()
        .replace("%20", "+")
}

/// Joins pairs as `k=escaped(v)` with `&`, sorted by key.
pub fn encode_values<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={}", query_escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn encode_sorts_keys_and_escapes_values_only() {
        let mut q = Query::new();
        q.set("name", "my vm/1");
        q.set("command", "deployVirtualMachine");
        q.set("details[0].cpuNumber", "2");

        assert_eq!(
            q.encode(),
            "command=deployVirtualMachine&details[0].cpuNumber=2&name=my+vm%2F1"
        );
    }

    #[test]
    fn query_escape_handles_reserved_and_unicode() {
        assert_eq!(query_escape("a+b=c&d"), "a%2Bb%3Dc%26d");
        assert_eq!(query_escape("é"), "%C3%A9");
        assert_eq!(query_escape("100%"), "100%25");
    }

    #[test]
    fn set_list_joins_with_commas() {
        let mut q = Query::new();
        q.set_list("ids", &["a", "b", "c"]);
        assert_eq!(q.get("ids"), Some("a,b,c"));
    }

    #[test]
    fn set_values_writes_strings_unquoted() {
        let mut q = Query::new();
        q.set_values("set", &[serde_json::json!("a"), serde_json::json!(2)]);
        assert_eq!(q.get("set"), Some("a,2"));
    }

    #[test]
    fn set_display_stringifies_scalars() {
        let mut q = Query::new();
        q.set_display("forced", true).set_display("size", 20i64).set_display("ratio", 1.5f64);
        assert_eq!(q.get("forced"), Some("true"));
        assert_eq!(q.get("size"), Some("20"));
        assert_eq!(q.get("ratio"), Some("1.5"));
    }

    #[test]
    fn map_encodings() {
        let m = map(&[("b", "2"), ("a", "1")]);

        let mut q = Query::new();
        q.set_map("details", &m, MapEncoding::InlineKey);
        assert_eq!(q.get("details[0].a"), Some("1"));
        assert_eq!(q.get("details[1].b"), Some("2"));

        let mut q = Query::new();
        q.set_map("details", &m, MapEncoding::KeyValue);
        assert_eq!(q.get("details[0].key"), Some("a"));
        assert_eq!(q.get("details[0].value"), Some("1"));
        assert_eq!(q.get("details[1].key"), Some("b"));

        let mut q = Query::new();
        q.set_map("usersecuritygrouplist", &m, MapEncoding::AccountGroup);
        assert_eq!(q.get("usersecuritygrouplist[0].account"), Some("a"));
        assert_eq!(q.get("usersecuritygrouplist[0].group"), Some("1"));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn map_encoding_selection() {
        assert_eq!(MapEncoding::for_field("serviceproviderlist", false), MapEncoding::ServiceProvider);
        assert_eq!(MapEncoding::for_field("serviceproviderlist", true), MapEncoding::KeyValue);
        assert_eq!(MapEncoding::for_field("usersecuritygrouplist", false), MapEncoding::AccountGroup);
        assert_eq!(MapEncoding::for_field("other", false), MapEncoding::KeyValue);
    }

    #[test]
    fn last_set_wins() {
        let q: Query = [("a", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(q.get("a"), Some("2"));
        assert_eq!(q.len(), 1);
    }
}
