//! Free-form parameters for operations the generated services do not cover.

use std::collections::BTreeMap;

use crate::query::{MapEncoding, Query};

/// A loosely typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    String(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(v: BTreeMap<String, String>) -> Self {
        Self::Map(v)
    }
}

/// A name -> value bag for the generated `CustomService::custom_request`.
///
/// Maps expand as `name[i].<key>=<value>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomParams {
    params: BTreeMap<String, ParamValue>,
}

impl CustomParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) a parameter.
    ///
    /// ## Examples
    ///
    /// ```
    /// use cloudstack_runtime::CustomParams;
    ///
    /// let mut p = CustomParams::new();
    /// p.set_param("listall", true).set_param("page", 2);
    /// let query = p.to_query();
    /// assert_eq!(query.get("listall"), Some("true"));
    /// assert_eq!(query.get("page"), Some("2"));
    /// ```
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Encodes the bag into a request parameter set.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        for (name, value) in &self.params {
            match value {
                ParamValue::Bool(v) => query.set_display(name.as_str(), v),
                ParamValue::Int(v) => query.set_display(name.as_str(), v),
                ParamValue::Long(v) => query.set_display(name.as_str(), v),
                ParamValue::String(v) => query.set(name.as_str(), v.as_str()),
                ParamValue::List(v) => query.set_list(name.as_str(), v),
                ParamValue::Map(v) => query.set_map(name, v, MapEncoding::InlineKey),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_and_maps_expand() {
        let mut details = BTreeMap::new();
        details.insert("cpuNumber".to_string(), "2".to_string());

        let mut p = CustomParams::new();
        p.set_param("ids", vec!["a".to_string(), "b".to_string()])
            .set_param("details", details)
            .set_param("size", 10i64);

        let query = p.to_query();
        assert_eq!(query.get("ids"), Some("a,b"));
        assert_eq!(query.get("details[0].cpuNumber"), Some("2"));
        assert_eq!(query.get("size"), Some("10"));
    }

    #[test]
    fn set_param_replaces() {
        let mut p = CustomParams::new();
        p.set_param("name", "a").set_param("name", "b");
        assert_eq!(p.get("name"), Some(&ParamValue::String("b".into())));
    }
}
