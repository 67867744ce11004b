//! Property trees
//!
//! A [`PropertyTree`] is an ordered string-keyed map whose values are
//! scalars, nested maps or sequences. Dotted paths (`a.b.c`) address nested
//! values; numeric segments index into sequences (`plans.0.name`). Looking up
//! a path through a missing or non-container node yields `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered, nested key-value configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTree(Map<String, Value>);

impl PropertyTree {
    /// Create an empty tree
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Value at a dotted path
    #[must_use]
    #[inline]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (head, rest) = split_head(path);
        let value = self.0.get(head)?;
        match rest {
            Some(rest) => lookup(value, rest),
            None => Some(value),
        }
    }

    /// Mutable value at a dotted path
    #[inline]
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let (head, rest) = split_head(path);
        let value = self.0.get_mut(head)?;
        match rest {
            Some(rest) => lookup_mut(value, rest),
            None => Some(value),
        }
    }

    /// Whether the key chain for `path` exists, whatever its value
    #[must_use]
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set the value at a dotted path, creating intermediate maps
    ///
    /// A non-map intermediate node is replaced by a map. Returns the
    /// previous value at `path`, if any.
    #[inline]
    pub fn insert(&mut self, path: &str, value: Value) -> Option<Value> {
        match path.split_once('.') {
            None => self.0.insert(path.to_owned(), value),
            Some((head, rest)) => {
                let entry = self
                    .0
                    .entry(head)
                    .or_insert_with(|| Value::Object(Map::new()));
                insert_into(entry, rest, value)
            }
        }
    }

    /// Remove the value at a dotted path, keeping sibling order
    #[inline]
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            None => self.0.shift_remove(path),
            Some((parent, key)) => self.get_mut(parent)?.as_object_mut()?.shift_remove(key),
        }
    }

    /// String at `path`
    #[must_use]
    #[inline]
    pub fn str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Boolean at `path`, `default` when absent or not a boolean
    #[must_use]
    #[inline]
    pub fn bool_or(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Integer at `path`
    #[must_use]
    #[inline]
    pub fn i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Whether `path` is absent, nil or the empty string
    #[must_use]
    #[inline]
    pub fn is_blank(&self, path: &str) -> bool {
        is_blank(self.get(path))
    }

    /// Clone of the map at `path`, empty when absent or not a map
    #[must_use]
    #[inline]
    pub fn subtree(&self, path: &str) -> Self {
        self.get(path)
            .and_then(Value::as_object)
            .map_or_else(Self::new, |map| Self(map.clone()))
    }

    /// Whether the tree has no top-level keys
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level entries in order
    #[inline]
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    /// Borrow the underlying map
    #[must_use]
    #[inline]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value
    #[must_use]
    #[inline]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Clone into a JSON object value
    #[must_use]
    #[inline]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for PropertyTree {
    #[inline]
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for PropertyTree {
    type Error = Value;

    /// Succeeds for objects; any other value is handed back unchanged.
    #[inline]
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Array(_) => Err(value),
        }
    }
}

impl From<PropertyTree> for Value {
    #[inline]
    fn from(tree: PropertyTree) -> Self {
        tree.into_value()
    }
}

fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

fn child<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match *value {
        Value::Object(ref map) => map.get(segment),
        Value::Array(ref items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

fn child_mut<'v>(value: &'v mut Value, segment: &str) -> Option<&'v mut Value> {
    match *value {
        Value::Object(ref mut map) => map.get_mut(segment),
        Value::Array(ref mut items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

fn insert_into(target: &mut Value, path: &str, value: Value) -> Option<Value> {
    let (head, rest) = split_head(path);

    if let Value::Array(ref mut items) = *target
        && let Some(slot) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i))
    {
        return match rest {
            Some(rest) => insert_into(slot, rest, value),
            None => Some(core::mem::replace(slot, value)),
        };
    }

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let map = target.as_object_mut()?;
    match rest {
        None => map.insert(head.to_owned(), value),
        Some(rest) => {
            let entry = map
                .entry(head)
                .or_insert_with(|| Value::Object(Map::new()));
            insert_into(entry, rest, value)
        }
    }
}

/// Value at a dotted path below `value`
#[must_use]
#[inline]
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(value, |current, segment| child(current, segment))
}

/// Mutable value at a dotted path below `value`
#[inline]
pub fn lookup_mut<'v>(value: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    path.split('.')
        .try_fold(value, |current, segment| child_mut(current, segment))
}

/// Absent, nil or the empty string
#[must_use]
#[inline]
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(&Value::Null) => true,
        Some(&Value::String(ref s)) => s.is_empty(),
        Some(&(Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_))) => false,
    }
}

/// Whether `value` holds at least one non-blank leaf
#[must_use]
#[inline]
pub fn has_content(value: &Value) -> bool {
    match *value {
        Value::Null => false,
        Value::String(ref s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
        Value::Array(ref items) => items.iter().any(has_content),
        Value::Object(ref map) => map.values().any(has_content),
    }
}

/// Render a scalar the way a template would print it
#[must_use]
#[inline]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match *value {
        Value::String(ref s) => Some(s.clone()),
        Value::Number(ref n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> PropertyTree {
        PropertyTree::try_from(value).unwrap()
    }

    #[test]
    fn dotted_lookup_through_maps_and_sequences() {
        let t = tree(json!({"a": {"b": [{"c": 1}, {"c": 2}]}}));
        assert_eq!(t.get("a.b.1.c"), Some(&json!(2)));
        assert_eq!(t.get("a.b.5.c"), None);
    }

    #[test]
    fn missing_intermediate_resolves_to_none() {
        let t = tree(json!({"a": "scalar"}));
        assert_eq!(t.get("a.b.c"), None);
        assert_eq!(t.get("x.y"), None);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let t = tree(json!({"Key": 1}));
        assert!(t.contains("Key"));
        assert!(!t.contains("key"));
    }

    #[test]
    fn insert_creates_intermediate_maps() {
        let mut t = PropertyTree::new();
        t.insert("a.b.c", json!(true));
        assert_eq!(t.into_value(), json!({"a": {"b": {"c": true}}}));
    }

    #[test]
    fn insert_replaces_scalar_intermediate() {
        let mut t = tree(json!({"a": 5}));
        t.insert("a.b", json!("x"));
        assert_eq!(t.get("a.b"), Some(&json!("x")));
    }

    #[test]
    fn insert_indexes_into_sequences() {
        let mut t = tree(json!({"plans": [{"name": "a"}, {"name": "b"}]}));
        assert_eq!(t.insert("plans.1.name", json!("c")), Some(json!("b")));
        t.insert("plans.0.quotas.limit", json!(3));
        assert_eq!(
            t.into_value(),
            json!({"plans": [{"name": "a", "quotas": {"limit": 3}}, {"name": "c"}]})
        );
    }

    #[test]
    fn remove_keeps_sibling_order() {
        let mut t = tree(json!({"q": {"x": 1, "y": 2, "z": 3}}));
        assert_eq!(t.remove("q.x"), Some(json!(1)));
        let keys: Vec<_> = t.get("q").unwrap().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["y", "z"]);
    }

    #[test]
    fn blank_and_content() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!(false))));
        assert!(!is_blank(Some(&json!(0))));

        assert!(!has_content(&json!({"a": {"b": ""}, "c": null})));
        assert!(has_content(&json!({"a": {"b": "x"}})));
    }
}
