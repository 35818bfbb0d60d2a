use domesque::{CleanupOptions, Domesque, SerializeOptions, WriteOptions};

#[test]
fn test_serialize_node() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<doc xmlns:foo="http://example.com"><foo:a/></doc>"#)
        .unwrap();
    let node = dom.first_child(dom.root(doc).unwrap()).unwrap();
    assert_eq!(
        dom.to_string(node).unwrap(),
        r#"<foo:a xmlns:foo="http://example.com"/>"#
    );
}

#[test]
fn test_serialize_node_default_ns() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<doc xmlns="http://example.com"><a/></doc>"#)
        .unwrap();
    let node = dom.first_child(dom.root(doc).unwrap()).unwrap();
    assert_eq!(
        dom.to_string(node).unwrap(),
        r#"<a xmlns="http://example.com"/>"#
    );
}

#[test]
fn test_serialize_node_with_namespaced_attribute() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<doc xmlns="urn:d" xmlns:x="urn:x"><a x:b="1"><c/></a></doc>"#)
        .unwrap();
    let node = dom.first_child(dom.root(doc).unwrap()).unwrap();
    assert_eq!(
        dom.to_string(node).unwrap(),
        r#"<a xmlns="urn:d" xmlns:x="urn:x" x:b="1"><c/></a>"#
    );
}

#[test]
fn test_attribute_order_kept() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document(r#"<a z="1" b="2" m="3"/>"#).unwrap();
    assert_eq!(
        dom.document_to_string(doc).unwrap(),
        r#"<a z="1" b="2" m="3"/>"#
    );
}

#[test]
fn test_attribute_escaping() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a/>").unwrap();
    let a = dom.root(doc).unwrap();
    dom.set_attribute(a, "v", "line\nbreak\t& \"quote\"").unwrap();
    insta::assert_snapshot!(dom.document_to_string(doc).unwrap(), @r#"<a v="line&#10;break&#9;&amp; &quot;quote&quot;"/>"#);
}

#[test]
fn test_xml_declaration() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a/>").unwrap();
    let options = SerializeOptions {
        pretty: false,
        xml_declaration: true,
    };
    assert_eq!(
        dom.document_to_string_with(doc, &options).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a/>"
    );
}

#[test]
fn test_write_document_cleans_up() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<a xmlns:unused="urn:u"><b/></a>"#)
        .unwrap();
    let mut out = Vec::new();
    dom.write_document(doc, &mut out, &WriteOptions::default())
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a><b/></a>"
    );
}

#[test]
fn test_write_document_without_cleanup() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<a xmlns:unused="urn:u"><b/></a>"#)
        .unwrap();
    let mut out = Vec::new();
    let options = WriteOptions {
        pretty: true,
        cleanup: None,
    };
    dom.write_document(doc, &mut out, &options).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a xmlns:unused=\"urn:u\">\n  <b/>\n</a>\n"
    );
}

#[test]
fn test_save_document_round_trip() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<r><x:a xmlns:x="urn:x">caf&#233;</x:a></r>"#)
        .unwrap();
    let dir = std::env::temp_dir().join(format!("domesque-save-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("saved.xml");
    let options = WriteOptions {
        pretty: false,
        cleanup: Some(CleanupOptions::new().namespace("y", "urn:x")),
    };
    dom.save_document(doc, &path, &options).unwrap();
    let loaded = dom.parse_document(&path).unwrap();
    assert_eq!(
        dom.document_to_string(loaded).unwrap(),
        r#"<r xmlns:y="urn:x"><y:a>café</y:a></r>"#
    );
    std::fs::remove_dir_all(&dir).unwrap();
}
