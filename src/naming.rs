//! Human-readable labels for features with arbitrary property bags.

use std::hash::Hash;
use std::sync::LazyLock;

use hashbrown::HashMap;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::models::address::value_text;

static NAME_OR_ID: LazyLock<[KeyPattern; 2]> =
    LazyLock::new(|| [KeyPattern::literal("name"), KeyPattern::literal("id")]);

/// Property-key matcher used by [`get_fuzzy_feature_prop`].
#[derive(Debug, Clone)]
pub enum KeyPattern {
    Regex(Regex),
    /// Lowercased substring
    Literal(String),
}

impl KeyPattern {
    /// Case-insensitive pattern from a regular-expression fragment.
    pub fn new(fragment: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(fragment)
            .case_insensitive(true)
            .build()
            .map(KeyPattern::Regex)
    }

    /// Case-insensitive match on a literal substring.
    pub fn literal(text: &str) -> Self {
        KeyPattern::Literal(text.to_lowercase())
    }

    pub fn is_match(&self, key: &str) -> bool {
        match self {
            KeyPattern::Regex(re) => re.is_match(key),
            KeyPattern::Literal(text) => key.to_lowercase().contains(text.as_str()),
        }
    }
}

/// Regexes are used as given, with no added case folding.
impl From<Regex> for KeyPattern {
    fn from(re: Regex) -> Self {
        KeyPattern::Regex(re)
    }
}

/// Value of the first property whose key matches a candidate.
///
/// Candidates are tried in order; for each candidate, keys are scanned in
/// the mapping's own order. Matching is partial (`"name"` matches
/// `"NAMELSAD"`).
pub fn get_fuzzy_feature_prop<'a>(
    properties: &'a Map<String, Value>,
    candidates: &[KeyPattern],
) -> Option<&'a Value> {
    candidates.iter().find_map(|pattern| {
        properties
            .iter()
            .find(|(key, _)| pattern.is_match(key))
            .map(|(_, value)| value)
    })
}

/// Derive a display name: a `name`-like property, else an `id`-like one,
/// else `fallback`, else the empty string.
pub fn derive_feature_name(properties: &Map<String, Value>, fallback: Option<&str>) -> String {
    get_fuzzy_feature_prop(properties, &*NAME_OR_ID)
        .and_then(value_text)
        .filter(|name| !name.is_empty())
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_default()
}

/// Caller-owned memo of derived feature names.
///
/// Keyed by whatever identifies a feature for the caller (an index, a gid,
/// a `(kind, gid)` pair). Input property maps are never modified.
#[derive(Debug, Clone)]
pub struct FeatureNameCache<K> {
    names: HashMap<K, String>,
}

impl<K: Hash + Eq> FeatureNameCache<K> {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Cached name for `key`, deriving and caching it on first use.
    ///
    /// Empty names are returned but not cached.
    pub fn get_feature_name(
        &mut self,
        key: K,
        properties: &Map<String, Value>,
        fallback: Option<&str>,
    ) -> String {
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }

        let name = derive_feature_name(properties, fallback);
        if !name.is_empty() {
            self.names.insert(key, name.clone());
        }
        name
    }

    pub fn cached(&self, key: &K) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn forget(&mut self, key: &K) -> Option<String> {
        self.names.remove(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Hash + Eq> Default for FeatureNameCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_case_insensitive_match() {
        let p = props(json!({"NAME": "Foo", "ID": "1"}));
        let value = get_fuzzy_feature_prop(&p, &[KeyPattern::new("name").unwrap()]);
        assert_eq!(value, Some(&json!("Foo")));
    }

    #[test]
    fn test_candidate_order_beats_key_order() {
        let p = props(json!({"GEOID": "48453", "NAMELSAD": "Travis County"}));
        let value = get_fuzzy_feature_prop(
            &p,
            &[KeyPattern::literal("name"), KeyPattern::literal("id")],
        );
        assert_eq!(value, Some(&json!("Travis County")));
    }

    #[test]
    fn test_key_order_within_candidate() {
        let p = props(json!({"name_short": "TX", "name": "Texas"}));
        let value = get_fuzzy_feature_prop(&p, &[KeyPattern::literal("name")]);
        assert_eq!(value, Some(&json!("TX")));
    }

    #[test]
    fn test_literal_with_regex_metacharacters() {
        let p = props(json!({"NAME(S)": "x", "names": "y"}));
        assert_eq!(
            get_fuzzy_feature_prop(&p, &[KeyPattern::literal("name(s)")]),
            Some(&json!("x"))
        );
        assert!(KeyPattern::new("name(").is_err());
    }

    #[test]
    fn test_regex_candidate_used_verbatim() {
        let p = props(json!({"Label": "a", "label": "b"}));
        let exact = KeyPattern::from(Regex::new("^label$").unwrap());
        assert_eq!(get_fuzzy_feature_prop(&p, &[exact]), Some(&json!("b")));
    }

    #[test]
    fn test_no_match() {
        let p = props(json!({"foo": 1}));
        assert_eq!(get_fuzzy_feature_prop(&p, &[KeyPattern::literal("name")]), None);
        assert_eq!(derive_feature_name(&p, None), "");
        assert_eq!(derive_feature_name(&p, Some("Custom shape")), "Custom shape");
    }

    #[test]
    fn test_numeric_id_name() {
        let p = props(json!({"gid": 2201}));
        assert_eq!(derive_feature_name(&p, None), "2201");
    }

    #[test]
    fn test_cache_returns_first_value() {
        let mut cache = FeatureNameCache::new();
        let mut p = props(json!({"Name": "Austin"}));

        assert_eq!(cache.get_feature_name(7, &p, None), "Austin");
        p.insert("Name".into(), json!("Changed"));
        assert_eq!(cache.get_feature_name(7, &p, None), "Austin");

        assert_eq!(cache.cached(&7), Some("Austin"));
        assert!(!p.contains_key("$$tmpName"));
    }

    #[test]
    fn test_empty_name_not_cached() {
        let mut cache: FeatureNameCache<u32> = FeatureNameCache::default();
        let p = props(json!({"other": "x"}));
        assert_eq!(cache.get_feature_name(1, &p, None), "");
        assert!(cache.is_empty());
        assert_eq!(cache.get_feature_name(1, &p, Some("fallback")), "fallback");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.forget(&1).as_deref(), Some("fallback"));
    }
}
