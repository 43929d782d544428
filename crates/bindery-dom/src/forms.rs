//! FormData
//!
//! Collects the successful controls of a form element in document order.

use crate::{DomTree, ElementData, NodeId};

/// Input types that never contribute an entry without a submitter
const SKIPPED_INPUT_TYPES: &[&str] = &["submit", "reset", "button", "image", "file"];

/// Form data set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    /// Entries (supports multiple values per key)
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the form data set of `form`
    pub fn from_form(tree: &DomTree, form: NodeId) -> Self {
        let mut data = Self::new();
        for node in tree.descendants(form) {
            let Some(el) = tree.element(node) else {
                continue;
            };
            let Some(name) = el.get_attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if el.has_attr("disabled") {
                continue;
            }
            match el.tag.as_str() {
                "input" => {
                    if let Some(value) = input_value(el) {
                        data.append(name, &value);
                    }
                }
                "textarea" => data.append(name, &tree.text_content(node)),
                "select" => {
                    for value in selected_options(tree, node, el) {
                        data.append(name, &value);
                    }
                }
                _ => {}
            }
        }
        data
    }

    /// Append an entry
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// Get first value for name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get all values for name
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Check if key exists
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Get all entries in document order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn input_value(el: &ElementData) -> Option<String> {
    let kind = el.get_attr("type").unwrap_or("text").to_ascii_lowercase();
    if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
        return None;
    }
    if kind == "checkbox" || kind == "radio" {
        if !el.has_attr("checked") {
            return None;
        }
        return Some(el.get_attr("value").unwrap_or("on").to_string());
    }
    Some(el.get_attr("value").unwrap_or("").to_string())
}

fn selected_options(tree: &DomTree, select: NodeId, el: &ElementData) -> Vec<String> {
    let options: Vec<NodeId> = tree
        .descendants(select)
        .into_iter()
        .filter(|&n| tree.tag_name(n) == Some("option"))
        .collect();
    let option_value = |n: NodeId| {
        tree.element(n)
            .and_then(|o| o.get_attr("value"))
            .map(str::to_string)
            .unwrap_or_else(|| tree.text_content(n).trim().to_string())
    };
    let selected: Vec<NodeId> = options
        .iter()
        .copied()
        .filter(|&n| {
            tree.element(n)
                .is_some_and(|o| o.has_attr("selected") && !o.has_attr("disabled"))
        })
        .collect();

    if el.has_attr("multiple") {
        return selected.into_iter().map(option_value).collect();
    }
    // Single select: last selected option wins, otherwise the first enabled one
    selected
        .last()
        .copied()
        .or_else(|| {
            options
                .iter()
                .copied()
                .find(|&n| tree.element(n).is_some_and(|o| !o.has_attr("disabled")))
        })
        .map(option_value)
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = tree.create_element_with_attrs(tag, attrs);
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_collects_successful_controls() {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        add(&mut tree, form, "input", &[("name", "title"), ("value", "foo")]);
        add(&mut tree, form, "input", &[("name", "skip"), ("value", "x"), ("disabled", "")]);
        add(&mut tree, form, "input", &[("value", "nameless")]);
        add(&mut tree, form, "input", &[("type", "checkbox"), ("name", "done")]);
        add(&mut tree, form, "input", &[("type", "checkbox"), ("name", "urgent"), ("checked", "")]);
        add(&mut tree, form, "input", &[("type", "submit"), ("name", "go"), ("value", "Add")]);
        let area = add(&mut tree, form, "textarea", &[("name", "description")]);
        let text = tree.create_text("some notes");
        tree.append_child(area, text).unwrap();

        let data = FormData::from_form(&tree, form);
        let entries: Vec<_> = data.entries().collect();
        assert_eq!(
            entries,
            vec![("title", "foo"), ("urgent", "on"), ("description", "some notes")]
        );
    }

    #[test]
    fn test_select_values() {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        let single = add(&mut tree, form, "select", &[("name", "list")]);
        add(&mut tree, single, "option", &[("value", "a")]);
        add(&mut tree, single, "option", &[("value", "b"), ("selected", "")]);
        let first_only = add(&mut tree, form, "select", &[("name", "fallback")]);
        let opt = add(&mut tree, first_only, "option", &[]);
        let label = tree.create_text(" Inbox ");
        tree.append_child(opt, label).unwrap();
        let multi = add(&mut tree, form, "select", &[("name", "tags"), ("multiple", "")]);
        add(&mut tree, multi, "option", &[("value", "x"), ("selected", "")]);
        add(&mut tree, multi, "option", &[("value", "y")]);
        add(&mut tree, multi, "option", &[("value", "z"), ("selected", "")]);

        let data = FormData::from_form(&tree, form);
        assert_eq!(data.get("list"), Some("b"));
        assert_eq!(data.get("fallback"), Some("Inbox"));
        assert_eq!(data.get_all("tags"), vec!["x", "z"]);
        assert_eq!(data.len(), 4);
    }
}
