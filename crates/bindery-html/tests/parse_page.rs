//! Integration tests - page bootstrap and fragment insertion

use bindery_dom::MutationObserverInit;
use bindery_html::{AdjacentPosition, HtmlParser, insert_adjacent_html, set_inner_html};

const PAGE: &str = r#"
<!DOCTYPE html>
<html>
    <head><title>Tasks</title></head>
    <body>
        <div id="notification" class="fixed top-4 right-4">
            <div class="bg-green-100 border-l-4 p-4 hidden">
                <p id="notification-text" class="text-sm"></p>
            </div>
        </div>
        <main id="app">
            <form data-command="add_task" data-trigger="submit" data-payload='{"list":"inbox"}'>
                <input type="text" name="title" value="Write tests">
                <button type="submit">Add</button>
            </form>
            <ul id="tasks"></ul>
        </main>
    </body>
</html>
"#;

#[test]
fn test_page_bootstrap() {
    let doc = HtmlParser::new().parse(PAGE).unwrap();

    let notification = doc.get_element_by_id("notification").unwrap();
    let panel = doc.query_selector(notification, "div").unwrap().unwrap();
    assert!(doc.has_class(panel, "hidden"));
    assert!(doc.get_element_by_id("notification-text").is_some());

    let form = doc.query_selector(doc.body(), "[data-command]").unwrap().unwrap();
    assert_eq!(doc.tree().tag_name(form), Some("form"));
    assert_eq!(doc.dataset(form).get("trigger"), Some("submit"));
    assert_eq!(doc.form_data(form).get("title"), Some("Write tests"));
}

#[test]
fn test_fragment_insertion_is_observed() {
    let mut doc = HtmlParser::new().parse(PAGE).unwrap();
    let body = doc.body();
    let observer = doc.observe(body, MutationObserverInit { child_list: true, subtree: true });
    let tasks = doc.get_element_by_id("tasks").unwrap();

    let added = insert_adjacent_html(
        &mut doc,
        tasks,
        AdjacentPosition::BeforeEnd,
        r#"<li><button data-command="complete_task" data-payload='{"id":"1"}'>Done</button></li>"#,
    )
    .unwrap();

    let records = doc.take_records(observer);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target, tasks);
    assert_eq!(records[0].added_nodes, added);

    let app = doc.get_element_by_id("app").unwrap();
    set_inner_html(&mut doc, app, "<p>x</p>").unwrap();
    assert_eq!(doc.inner_html(app), "<p>x</p>");
    assert!(!doc.tree().is_connected(tasks));
    let records = doc.take_records(observer);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].removed_nodes.len(), 2);
}
