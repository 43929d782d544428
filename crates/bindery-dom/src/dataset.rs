//! DOMStringMap (dataset)
//!
//! Read view of an element's `data-*` attributes keyed by camelCase name.

use std::collections::HashMap;

use crate::Attribute;

/// DOMStringMap for data-* attributes
#[derive(Debug, Clone, Default)]
pub struct DOMStringMap {
    data: HashMap<String, String>,
}

impl DOMStringMap {
    /// Create empty string map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an element's attributes
    pub fn from_attributes(attrs: &[Attribute]) -> Self {
        let data = attrs
            .iter()
            .filter_map(|attr| {
                let key = attr.name.strip_prefix("data-")?;
                Some((to_camel_case(key), attr.value.clone()))
            })
            .collect();
        Self { data }
    }

    /// Get value by camelCase key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    /// Check if key exists
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get all keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    /// Convert a camelCase key to its attribute name
    pub fn to_attribute_name(key: &str) -> String {
        format!("data-{}", to_kebab_case(key))
    }
}

/// Convert kebab-case to camelCase
fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert camelCase to kebab-case
fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_from_attributes() {
        let attrs = vec![
            attr("data-command", "complete_task"),
            attr("data-payload", r#"{"id":"01H"}"#),
            attr("data-list-id", "7"),
            attr("class", "ignored"),
        ];

        let map = DOMStringMap::from_attributes(&attrs);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("command"), Some("complete_task"));
        assert_eq!(map.get("payload"), Some(r#"{"id":"01H"}"#));
        assert_eq!(map.get("listId"), Some("7"));
        assert!(!map.has("class"));
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_camel_case("list-id"), "listId");
        assert_eq!(to_camel_case("trigger"), "trigger");
        assert_eq!(to_kebab_case("listId"), "list-id");
        assert_eq!(DOMStringMap::to_attribute_name("trigger"), "data-trigger");
    }
}
