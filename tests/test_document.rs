use std::path::PathBuf;

use domesque::{CleanupOptions, Domesque, Error, Source};

#[test]
fn test_cleanup_namespaces() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<root xmlns="D" xmlns:y="Y"><x:a xmlns:x="X"/><b/></root>"#)
        .unwrap();

    dom.cleanup_namespaces(doc, &CleanupOptions::new().retain("y"))
        .unwrap();
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        r#"<root xmlns="D" xmlns:y="Y"><x:a xmlns:x="X"/><b/></root>"#
    );

    dom.cleanup_namespaces(doc, &CleanupOptions::new()).unwrap();
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        r#"<root xmlns="D"><x:a xmlns:x="X"/><b/></root>"#
    );

    dom.cleanup_namespaces(
        doc,
        &CleanupOptions::new().namespace("", "X").namespace("d", "D"),
    )
    .unwrap();
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        r#"<root xmlns="D"><x:a xmlns:x="X"/><b/></root>"#
    );
}

#[test]
fn test_contains() {
    let mut dom = Domesque::new();
    let document_a = dom.parse_document("<root><a/></root>").unwrap();
    let document_b = dom.parse_document("<root><a/></root>").unwrap();

    let a = dom.first_child(dom.root(document_a).unwrap()).unwrap();
    assert!(dom.contains(document_a, a));
    assert!(!dom.contains(document_b, a));
}

#[test]
fn test_detached_node_not_contained() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<root><a/></root>").unwrap();
    let a = dom.first_child(dom.root(doc).unwrap()).unwrap();
    dom.detach(a);
    assert!(!dom.contains(doc, a));
}

#[test]
fn test_set_root() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<root><node/></root>").unwrap();
    let root = dom.root(doc).unwrap();
    let node = dom.detach(dom.first_child(root).unwrap());
    dom.set_root(doc, node).unwrap();
    assert_eq!(dom.document_to_string(doc).unwrap(), "<node/>");

    let doc_2 = dom
        .parse_document("<root><replacement/>parts</root>")
        .unwrap();
    let replacement = dom.first_child(dom.root(doc_2).unwrap()).unwrap();
    assert!(matches!(
        dom.set_root(doc, replacement),
        Err(Error::InvalidOperation(_))
    ));
    // nothing changed
    assert_eq!(dom.document_to_string(doc).unwrap(), "<node/>");
    assert_eq!(
        dom.document_to_string(doc_2).unwrap(),
        "<root><replacement/>parts</root>"
    );
}

#[test]
fn test_set_root_of_other_document_rejected() {
    let mut dom = Domesque::new();
    let doc_a = dom.parse_document("<a/>").unwrap();
    let doc_b = dom.parse_document("<b/>").unwrap();
    let b = dom.root(doc_b).unwrap();
    assert!(matches!(
        dom.set_root(doc_a, b),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn test_set_root_keeps_surrounding_nodes() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document("<!--before--><root/><?after?>")
        .unwrap();
    let name = dom.add_name("new");
    let new_root = dom.new_tag(name);
    dom.set_root(doc, new_root).unwrap();
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        "<!--before-->\n<new/>\n<?after?>"
    );
}

#[test]
fn test_rootless_document() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<root/>").unwrap();
    let root = dom.root(doc).unwrap();
    dom.detach(root);
    assert!(matches!(dom.root(doc), Err(Error::NoRoot)));
    assert!(matches!(
        dom.document_to_string(doc),
        Err(Error::NoRoot)
    ));
    dom.set_root(doc, root).unwrap();
    assert_eq!(dom.root(doc).unwrap(), root);
}

#[test]
fn test_document_from_tree() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<root xmlns:x="urn:x"><x:a><b/></x:a></root>"#)
        .unwrap();
    let a = dom.first_child(dom.root(doc).unwrap()).unwrap();
    let copy = dom.parse_document(a).unwrap();
    assert_eq!(
        dom.document_to_string(copy).unwrap(),
        r#"<x:a xmlns:x="urn:x"><b/></x:a>"#
    );
    assert_ne!(dom.root(copy).unwrap(), a);
    assert_eq!(dom.parent(a), dom.root(doc).ok());
}

#[test]
fn test_unsupported_tree_source() {
    let mut dom = Domesque::new();
    let text = dom.new_text("not a tag");
    assert!(matches!(
        dom.parse_document(Source::Tree(text)),
        Err(Error::UnsupportedSource(_))
    ));
}

#[test]
fn test_document_from_bytes() {
    let mut dom = Domesque::new();
    let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\xe9</a>".to_vec();
    let doc = dom.parse_document(&bytes).unwrap();
    assert_eq!(dom.text_content(dom.root(doc).unwrap()), "\u{e9}");
}

#[test]
fn test_document_from_path() {
    let mut dom = Domesque::new();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/marx_manifestws_1848.TEI-P5.xml");
    let doc = dom.parse_document(&path).unwrap();
    assert_eq!(
        dom.qualified_name(dom.root(doc).unwrap()).as_deref(),
        Some("{http://www.tei-c.org/ns/1.0}TEI")
    );
    assert_eq!(dom.source_url(doc), Some(path.display().to_string().as_str()));
    assert_eq!(dom.head_nodes(doc).len(), 1);
}

#[test]
fn test_missing_file() {
    let mut dom = Domesque::new();
    let path = PathBuf::from("does/not/exist.xml");
    assert!(matches!(dom.parse_document(&path), Err(Error::Io(_))));
}

#[test]
fn test_clone_document_is_independent() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<!--c--><root><a/></root>").unwrap();
    let copy = dom.clone_document(doc);
    let root = dom.root(copy).unwrap();
    let a = dom.first_child(root).unwrap();
    dom.remove(a);
    assert_eq!(dom.document_to_string(copy).unwrap(), "<!--c-->\n<root/>");
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        "<!--c-->\n<root><a/></root>"
    );
}
