use domesque::{Domesque, NodeEdge};

#[test]
fn test_navigation() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a><b/><c/><d/></a>").unwrap();
    let a = dom.root(doc).unwrap();
    let b = dom.first_child(a).unwrap();
    let c = dom.child(a, 1).unwrap();
    let d = dom.last_child(a).unwrap();
    assert_eq!(dom.next_sibling(b), Some(c));
    assert_eq!(dom.previous_sibling(d), Some(c));
    assert_eq!(dom.previous_sibling(b), None);
    assert_eq!(dom.index(d), Some(2));
    assert_eq!(dom.index(a), None);
    assert_eq!(dom.following_siblings(b).collect::<Vec<_>>(), vec![b, c, d]);
    assert_eq!(dom.preceding_siblings(d).collect::<Vec<_>>(), vec![d, c, b]);
    assert_eq!(dom.reverse_children(a).collect::<Vec<_>>(), vec![d, c, b]);
    assert_eq!(dom.top(c), a);
    assert_eq!(dom.document(c), Some(doc));
}

#[test]
fn test_descendants_in_document_order() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a><b><c/></b><d/></a>").unwrap();
    let a = dom.root(doc).unwrap();
    let names = dom
        .descendants(a)
        .map(|node| dom.local_name(node).unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_traverse() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a><b/>text</a>").unwrap();
    let a = dom.root(doc).unwrap();
    let b = dom.first_child(a).unwrap();
    let text = dom.last_child(a).unwrap();
    assert_eq!(
        dom.traverse(a).collect::<Vec<_>>(),
        vec![
            NodeEdge::Start(a),
            NodeEdge::Start(b),
            NodeEdge::End(b),
            NodeEdge::Start(text),
            NodeEdge::End(text),
            NodeEdge::End(a),
        ]
    );
}

#[test]
fn test_namespaces_in_scope() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<a xmlns="urn:a" xmlns:x="urn:x"><b xmlns:x="urn:y"><c xmlns=""/></b></a>"#)
        .unwrap();
    let a = dom.root(doc).unwrap();
    let b = dom.first_child(a).unwrap();
    let c = dom.first_child(b).unwrap();
    let mut scope = dom.namespaces_in_scope_str(c);
    scope.sort();
    assert_eq!(
        scope,
        vec![
            ("x", "urn:y"),
            ("xml", "http://www.w3.org/XML/1998/namespace")
        ]
    );
    let x = dom.prefix("x").unwrap();
    let y = dom.namespace("urn:y").unwrap();
    assert_eq!(dom.prefix_for_namespace(c, y), Some(x));
    let shadowed = dom.namespace("urn:x").unwrap();
    assert_eq!(dom.prefix_for_namespace(c, shadowed), None);
}

#[test]
fn test_attribute_access() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<a xmlns:x="urn:x" x:n="1" n="2"/>"#)
        .unwrap();
    let a = dom.root(doc).unwrap();
    assert_eq!(dom.attribute(a, "{urn:x}n"), Some("1"));
    assert_eq!(dom.attribute(a, "n"), Some("2"));
    dom.set_attribute(a, "{urn:z}new", "3").unwrap();
    assert_eq!(
        dom.remove_attribute(a, "n").unwrap(),
        Some("2".to_string())
    );
    assert_eq!(dom.remove_attribute(a, "missing").unwrap(), None);
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        r#"<a xmlns:x="urn:x" xmlns:ns0="urn:z" x:n="1" ns0:new="3"/>"#
    );
}

#[test]
fn test_text_value_access() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a>one<!--c-->two</a>").unwrap();
    let a = dom.root(doc).unwrap();
    let first = dom.first_child(a).unwrap();
    dom.text_mut(first).unwrap().set("ONE");
    assert_eq!(dom.text_content(a), "ONEtwo");
    let comment = dom.child(a, 1).unwrap();
    assert!(dom.comment_mut(comment).unwrap().set("bad--").is_err());
    assert_eq!(dom.comment_str(comment), Some("c"));
}
