use std::path::PathBuf;

use domesque::{Document, Domesque, Error};
use rstest::{fixture, rstest};

const TEI: &str = "{http://www.tei-c.org/ns/1.0}";

struct Manifest {
    dom: Domesque,
    doc: Document,
}

#[fixture]
fn manifest() -> Manifest {
    let mut dom = Domesque::new();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/marx_manifestws_1848.TEI-P5.xml");
    let doc = dom.parse_document(&path).unwrap();
    Manifest { dom, doc }
}

#[rstest]
fn test_xpath(manifest: Manifest) {
    let Manifest { dom, doc } = manifest;

    let page_breaks = dom.document_xpath(doc, ".//pb").unwrap();
    assert_eq!(page_breaks.len(), 23);
    for page_break in &page_breaks {
        assert!(dom.is_tag(*page_break));
        assert_eq!(
            dom.qualified_name(*page_break),
            Some(format!("{}pb", TEI))
        );
    }

    let first_pages = dom.document_xpath(doc, r#".//pb[@n="I"]"#).unwrap();
    assert_eq!(first_pages.len(), 1);
    let page_break = first_pages.first().unwrap();
    assert_eq!(
        dom.qualified_name(page_break),
        Some(format!("{}pb", TEI))
    );
    assert_eq!(dom.attribute(page_break, "n"), Some("I"));
}

#[rstest]
#[case(".//pb/@facs")]
#[case(".//comment()")]
#[case(".//pb/@n = 'I'")]
#[case("count(.//pb)")]
fn test_invalid_xpath(manifest: Manifest, #[case] expression: &str) {
    let Manifest { dom, doc } = manifest;
    assert!(matches!(
        dom.document_xpath(doc, expression),
        Err(Error::InvalidOperation(_))
    ));
}

#[rstest]
fn test_results_in_document_order(manifest: Manifest) {
    let Manifest { dom, doc } = manifest;
    let pages = dom
        .document_xpath(doc, "//body//pb[@n] | //front/pb")
        .unwrap();
    let facs = pages
        .iter()
        .map(|node| dom.attribute(*node, "facs").unwrap())
        .collect::<Vec<_>>();
    let mut sorted = facs.clone();
    sorted.sort();
    assert_eq!(facs, sorted);
    assert_eq!(facs.len(), 22);
}

#[rstest]
fn test_relative_to_context_node(manifest: Manifest) {
    let Manifest { dom, doc } = manifest;
    let divisions = dom.document_xpath(doc, "//div").unwrap();
    assert_eq!(divisions.len(), 10);
    let third = divisions[2];
    assert_eq!(dom.xpath(third, "pb").unwrap().len(), 1);
    assert_eq!(dom.xpath(third, "p").unwrap().len(), 2);
    let previous = dom.xpath(third, "preceding-sibling::pb[1]").unwrap();
    assert_eq!(dom.attribute(previous[0], "n"), Some("III"));
    let ancestors = dom.xpath(third, "ancestor::*").unwrap();
    let names = ancestors
        .iter()
        .map(|node| dom.local_name(*node).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["TEI", "text", "body"]);
}

#[rstest]
fn test_prefixed_query(manifest: Manifest) {
    let Manifest { dom, doc } = manifest;
    let root = dom.root(doc).unwrap();
    let results = dom
        .xpath_with_namespaces(
            root,
            "//tei:persName[tei:surname='Engels']",
            &[("tei", "http://www.tei-c.org/ns/1.0")],
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        dom.attribute(results[0], "ref"),
        Some("http://d-nb.info/gnd/118534866")
    );
    assert!(matches!(
        dom.xpath(root, "//tei:persName"),
        Err(Error::UnknownPrefix(_))
    ));
}

#[rstest]
fn test_results_are_a_snapshot(manifest: Manifest) {
    let Manifest { mut dom, doc } = manifest;
    let page_breaks = dom.document_xpath(doc, ".//pb").unwrap();
    let first = page_breaks[0];
    dom.remove(first);
    assert_eq!(page_breaks.len(), 23);
    assert!(dom.is_removed(page_breaks[0]));
    assert_eq!(dom.document_xpath(doc, ".//pb").unwrap().len(), 22);
}

#[test]
fn test_no_namespace_attribute_and_default_namespace() {
    let mut dom = Domesque::new();
    let doc = dom
        .parse_document(r#"<r xmlns="urn:d" xmlns:x="urn:x"><a x:n="1"/><a n="1"/></r>"#)
        .unwrap();
    let results = dom.document_xpath(doc, "a[@n]").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.first(), dom.xpath(dom.root(doc).unwrap(), "a[2]").unwrap().first());
    assert_eq!(dom.document_xpath(doc, "a[@x:n]").unwrap().len(), 1);
}

#[test]
fn test_syntax_error() {
    let mut dom = Domesque::new();
    let doc = dom.parse_document("<a/>").unwrap();
    let err = dom.document_xpath(doc, "a[").unwrap_err();
    assert!(matches!(err, Error::XPathSyntax { .. }));
    insta::assert_snapshot!(err.to_string(), @"XPath syntax error at position 2: expected a node test, found end of expression");
}
