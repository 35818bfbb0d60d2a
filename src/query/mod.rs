//! XPath 1.0 queries.
//!
//! Queries are evaluated against a context node and must select tag
//! nodes only: a result holding attributes, text, comments or an atomic
//! value is an error rather than something to filter out.

mod ast;
mod eval;
mod lexer;
mod parser;
mod value;

use tracing::debug;

use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::error::Error;

use self::eval::Evaluator;
pub(crate) use self::value::{Item, XPathValue};

/// The tag nodes selected by a query, in document order.
///
/// This is a snapshot: nodes added to the tree afterwards don't show up,
/// and removed nodes stay in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResults {
    nodes: Vec<Node>,
}

impl QueryResults {
    /// Iterate over the selected nodes.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first node in document order.
    pub fn first(&self) -> Option<Node> {
        self.nodes.first().copied()
    }

    /// The last node in document order.
    pub fn last(&self) -> Option<Node> {
        self.nodes.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<Node> {
        self.nodes.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// The results for which `predicate` holds, order kept.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(r#"<a><b n="1"/><b/><b n="3"/></a>"#).unwrap();
    /// let results = dom.document_xpath(doc, "//b").unwrap();
    /// let numbered = results.filtered_by(&dom, |dom, node| dom.attribute(node, "n").is_some());
    /// assert_eq!(numbered.len(), 2);
    /// ```
    pub fn filtered_by(
        &self,
        dom: &Domesque,
        predicate: impl Fn(&Domesque, Node) -> bool,
    ) -> QueryResults {
        QueryResults {
            nodes: self
                .nodes
                .iter()
                .copied()
                .filter(|node| predicate(dom, *node))
                .collect(),
        }
    }
}

impl IntoIterator for QueryResults {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResults {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl std::ops::Index<usize> for QueryResults {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
}

/// ## Queries
impl Domesque {
    /// Select tag nodes with an XPath 1.0 expression, relative to `node`.
    ///
    /// Prefixes in the expression are resolved against the namespaces in
    /// scope at `node`. Unprefixed element names are in the default
    /// namespace in scope there; unprefixed attribute names are in no
    /// namespace.
    ///
    /// Fails with [`Error::XPathSyntax`] for a malformed expression,
    /// [`Error::UnknownPrefix`] for an unbound prefix, and
    /// [`Error::InvalidOperation`] if the expression selects anything but
    /// tag nodes.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom
    ///     .parse_document(r#"<text xmlns="urn:t"><pb n="I"/><p/><pb n="II"/></text>"#)
    ///     .unwrap();
    /// let root = dom.root(doc).unwrap();
    /// let results = dom.xpath(root, "./pb[@n='II']").unwrap();
    /// assert_eq!(results.len(), 1);
    /// assert_eq!(dom.attribute(results[0], "n"), Some("II"));
    /// assert!(dom.xpath(root, "./pb/@n").is_err());
    /// ```
    pub fn xpath(&self, node: Node, expression: &str) -> Result<QueryResults, Error> {
        self.xpath_with_namespaces(node, expression, &[])
    }

    /// Like [`Domesque::xpath`], with extra `(prefix, uri)` bindings that
    /// take precedence over those in scope.
    pub fn xpath_with_namespaces(
        &self,
        node: Node,
        expression: &str,
        namespaces: &[(&str, &str)],
    ) -> Result<QueryResults, Error> {
        let value = self.evaluate(node, expression, namespaces)?;
        let XPathValue::NodeSet(items) = value else {
            return Err(Error::InvalidOperation(format!(
                "query {:?} doesn't select nodes",
                expression
            )));
        };
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Item::Node(node) if self.is_tag(node) => nodes.push(node),
                Item::Node(node) => {
                    return Err(Error::InvalidOperation(format!(
                        "query {:?} selects a {:?} node; only tag nodes can be selected",
                        expression,
                        self.kind(node)
                    )))
                }
                Item::Attribute { .. } => {
                    return Err(Error::InvalidOperation(format!(
                        "query {:?} selects attributes; only tag nodes can be selected",
                        expression
                    )))
                }
            }
        }
        debug!(expression, selected = nodes.len(), "xpath query");
        Ok(QueryResults { nodes })
    }

    /// Query with the document's root as the context node.
    pub fn document_xpath(&self, document: Document, expression: &str) -> Result<QueryResults, Error> {
        let root = self.root(document)?;
        self.xpath(root, expression)
    }

    pub(crate) fn evaluate(
        &self,
        node: Node,
        expression: &str,
        namespaces: &[(&str, &str)],
    ) -> Result<XPathValue, Error> {
        let expr = parser::parse(expression)?;
        Evaluator::new(self, node, namespaces).evaluate(&expr)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const BOOK: &str = r#"<book xmlns="urn:b" xmlns:x="urn:x" id="1"><!--c--><ch n="1"><p>one</p><p>two</p></ch><ch n="2"><p>three</p><x:note/></ch></book>"#;

    fn evaluate(expression: &str) -> XPathValue {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        dom.evaluate(root, expression, &[]).unwrap()
    }

    #[rstest]
    #[case("count(//p)", 3.0)]
    #[case("count(ch[1]/p)", 2.0)]
    #[case("count(ch/p[last()])", 2.0)]
    #[case("count(//p/ancestor::*)", 3.0)]
    #[case("count(//x:note/preceding::p)", 3.0)]
    #[case("count(ch[1]/following::*)", 3.0)]
    #[case("count(@*)", 1.0)]
    #[case("count(//node())", 11.0)]
    #[case("sum(ch/@n) * 2", 6.0)]
    #[case("string-length(ch[2])", 5.0)]
    #[case("round(2.5) + floor(-1.5) + ceiling(0.2)", 2.0)]
    #[case("7 mod 4 - 6 div 3", 1.0)]
    fn test_numbers(#[case] expression: &str, #[case] expected: f64) {
        assert_eq!(evaluate(expression), XPathValue::Number(expected));
    }

    #[rstest]
    #[case("string(ch[2]/p)", "three")]
    #[case("concat(local-name(), '-', namespace-uri())", "book-urn:b")]
    #[case("name(//x:note)", "x:note")]
    #[case("substring('12345', 1.5, 2.6)", "234")]
    #[case("substring-after('a=b', '=')", "b")]
    #[case("normalize-space('  a   b ')", "a b")]
    #[case("translate('bar', 'abc', 'AB')", "BAr")]
    #[case("string(1 div 0)", "Infinity")]
    fn test_strings(#[case] expression: &str, #[case] expected: &str) {
        assert_eq!(evaluate(expression), XPathValue::String(expected.to_string()));
    }

    #[rstest]
    #[case("ch/@n = 2", true)]
    #[case("ch/@n != 1", true)]
    #[case("ch/@n > 2", false)]
    #[case("//p = 'two'", true)]
    #[case("not(//missing)", true)]
    #[case("starts-with(//p, 'on') and contains('abc', 'b')", true)]
    #[case("boolean(ch[3])", false)]
    #[case("1 = true()", true)]
    fn test_booleans(#[case] expression: &str, #[case] expected: bool) {
        assert_eq!(evaluate(expression), XPathValue::Boolean(expected));
    }

    #[test]
    fn test_attribute_name_skips_default_prefix() {
        let mut dom = Domesque::new();
        let doc = dom
            .parse_document(r#"<a xmlns="urn:x" xmlns:p="urn:x" p:att="1"/>"#)
            .unwrap();
        let a = dom.root(doc).unwrap();
        assert_eq!(
            dom.evaluate(a, "concat(name(), ' ', name(@*))", &[]).unwrap(),
            XPathValue::String("a p:att".to_string())
        );

        let doc = dom.parse_document(r#"<a xmlns="urn:x"/>"#).unwrap();
        let a = dom.root(doc).unwrap();
        dom.set_attribute(a, "{urn:x}att", "1").unwrap();
        assert_eq!(
            dom.evaluate(a, "name(@*)", &[]).unwrap(),
            XPathValue::String("{urn:x}att".to_string())
        );
    }

    #[test]
    fn test_document_order_of_union() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        let results = dom.xpath(root, "ch[2] | ch[1] | ch[1]").unwrap();
        let numbers = results
            .iter()
            .map(|node| dom.attribute(*node, "n").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec!["1", "2"]);
    }

    #[test]
    fn test_reverse_axis_positions() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        let results = dom.xpath(root, "//x:note/preceding::p[1]").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(dom.text_content(results[0]), "three");
    }

    #[test]
    fn test_root_path() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        let p = dom.xpath(root, "//p").unwrap().first().unwrap();
        let results = dom.xpath(p, "/book").unwrap();
        assert_eq!(results.as_slice(), &[root]);
        assert!(matches!(
            dom.xpath(p, "/"),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_extra_namespaces() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        let results = dom
            .xpath_with_namespaces(root, "//b:p", &[("b", "urn:b")])
            .unwrap();
        assert_eq!(results.len(), 3);
        let results = dom
            .xpath_with_namespaces(root, "//b:p", &[("b", "urn:unused")])
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_errors() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(BOOK).unwrap();
        let root = dom.root(doc).unwrap();
        assert!(matches!(
            dom.xpath(root, "//y:p"),
            Err(Error::UnknownPrefix(prefix)) if prefix == "y"
        ));
        assert!(matches!(
            dom.xpath(root, "frobnicate()"),
            Err(Error::UnknownFunction(_))
        ));
        assert!(matches!(
            dom.xpath(root, "count()"),
            Err(Error::FunctionArity(name, 0)) if name == "count"
        ));
        assert!(matches!(
            dom.xpath(root, "count(//p)"),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            dom.xpath(root, "//p/text()"),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            dom.xpath(root, "//p["),
            Err(Error::XPathSyntax { .. })
        ));
    }
}
