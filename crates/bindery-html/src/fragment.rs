//! Fragment insertion
//!
//! `innerHTML` assignment and `insertAdjacentHTML`. Every insertion goes
//! through `Document`, so observers see the new nodes.

use std::str::FromStr;

use bindery_dom::{Document, DomError, NodeId};

use crate::{HtmlError, HtmlParser};

/// Position argument of `insert_adjacent_html`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacentPosition {
    /// Before the element itself
    BeforeBegin,
    /// Before the first child
    AfterBegin,
    /// After the last child
    BeforeEnd,
    /// After the element itself
    AfterEnd,
}

impl FromStr for AdjacentPosition {
    type Err = HtmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beforebegin" => Ok(Self::BeforeBegin),
            "afterbegin" => Ok(Self::AfterBegin),
            "beforeend" => Ok(Self::BeforeEnd),
            "afterend" => Ok(Self::AfterEnd),
            _ => Err(HtmlError::InvalidPosition(s.to_string())),
        }
    }
}

/// Replace the content of `target` with `html` parsed in its context
///
/// Returns the inserted top-level nodes.
pub fn set_inner_html(document: &mut Document, target: NodeId, html: &str) -> Result<Vec<NodeId>, HtmlError> {
    let nodes = HtmlParser::new().parse_fragment(document, target, html)?;
    document.replace_children(target, &nodes)?;
    Ok(nodes)
}

/// Insert parsed `html` relative to `target`, keeping source order
///
/// Markup inserted inside `target` is parsed with `target` as context;
/// markup inserted beside it uses the parent.
pub fn insert_adjacent_html(
    document: &mut Document,
    target: NodeId,
    position: AdjacentPosition,
    html: &str,
) -> Result<Vec<NodeId>, HtmlError> {
    let context = match position {
        AdjacentPosition::AfterBegin | AdjacentPosition::BeforeEnd => target,
        AdjacentPosition::BeforeBegin | AdjacentPosition::AfterEnd => document
            .tree()
            .parent(target)
            .ok_or(DomError::NoParent(target))?,
    };
    let nodes = HtmlParser::new().parse_fragment(document, context, html)?;
    match position {
        AdjacentPosition::BeforeBegin => {
            for &node in &nodes {
                document.insert_before(target, node)?;
            }
        }
        AdjacentPosition::AfterBegin => {
            for (index, &node) in nodes.iter().enumerate() {
                document.insert_child(target, index, node)?;
            }
        }
        AdjacentPosition::BeforeEnd => {
            for &node in &nodes {
                document.append_child(target, node)?;
            }
        }
        AdjacentPosition::AfterEnd => {
            let mut reference = target;
            for &node in &nodes {
                document.insert_after(reference, node)?;
                reference = node;
            }
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_dom::MutationObserverInit;

    fn doc_with_list() -> (Document, NodeId) {
        let mut doc = HtmlParser::new()
            .parse(r#"<body><ul id="list"><li>a</li></ul></body>"#)
            .unwrap();
        let list = doc.get_element_by_id("list").unwrap();
        let body = doc.body();
        doc.observe(body, MutationObserverInit { child_list: true, subtree: true });
        (doc, list)
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("beforeEnd".parse::<AdjacentPosition>().unwrap(), AdjacentPosition::BeforeEnd);
        assert!(matches!(
            "middle".parse::<AdjacentPosition>(),
            Err(HtmlError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_set_inner_html() {
        let (mut doc, list) = doc_with_list();
        set_inner_html(&mut doc, list, "<li>x</li><li>y</li>").unwrap();
        assert_eq!(doc.inner_html(list), "<li>x</li><li>y</li>");
        assert!(doc.has_pending_records());

        set_inner_html(&mut doc, list, "").unwrap();
        assert_eq!(doc.inner_html(list), "");
    }

    #[test]
    fn test_insert_adjacent_inside() {
        let (mut doc, list) = doc_with_list();
        insert_adjacent_html(&mut doc, list, AdjacentPosition::BeforeEnd, "<li>b</li><li>c</li>").unwrap();
        insert_adjacent_html(&mut doc, list, AdjacentPosition::AfterBegin, "<li>0</li><li>1</li>").unwrap();
        assert_eq!(
            doc.inner_html(list),
            "<li>0</li><li>1</li><li>a</li><li>b</li><li>c</li>"
        );
    }

    #[test]
    fn test_insert_adjacent_outside() {
        let (mut doc, list) = doc_with_list();
        let body = doc.body();
        insert_adjacent_html(&mut doc, list, AdjacentPosition::BeforeBegin, "<h1>T</h1><p>s</p>").unwrap();
        insert_adjacent_html(&mut doc, list, AdjacentPosition::AfterEnd, "<hr><footer>f</footer>").unwrap();
        assert_eq!(
            doc.inner_html(body),
            r#"<h1>T</h1><p>s</p><ul id="list"><li>a</li></ul><hr><footer>f</footer>"#
        );
    }

    #[test]
    fn test_insert_adjacent_outside_requires_parent() {
        let mut doc = Document::new();
        let detached = doc.create_element("div");
        let err = insert_adjacent_html(&mut doc, detached, AdjacentPosition::AfterEnd, "<p>x</p>").unwrap_err();
        assert!(matches!(err, HtmlError::Dom(_)));
    }

    #[test]
    fn test_table_rows_keep_structure() {
        let mut doc = HtmlParser::new()
            .parse(r#"<table><tbody id="rows"><tr><td>old</td></tr></tbody></table>"#)
            .unwrap();
        let rows = doc.get_element_by_id("rows").unwrap();

        set_inner_html(&mut doc, rows, "<tr><td>new</td></tr>").unwrap();
        insert_adjacent_html(&mut doc, rows, AdjacentPosition::BeforeEnd, "<tr><td>more</td></tr>").unwrap();
        assert_eq!(
            doc.inner_html(rows),
            "<tr><td>new</td></tr><tr><td>more</td></tr>"
        );

        let first = doc.tree().children(rows)[0];
        insert_adjacent_html(&mut doc, first, AdjacentPosition::BeforeBegin, "<tr><td>top</td></tr>").unwrap();
        assert_eq!(doc.text_content(rows), "topnewmore");
        assert_eq!(doc.query_selector_all(rows, "tr > td").unwrap().len(), 3);
    }
}
