use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::access::NodeEdge;
use crate::cleanup::CleanupOptions;
use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::entity::{serialize_attribute, serialize_text};
use crate::error::Error;
use crate::fullname::{PrefixScope, Resolution};
use crate::id::NameId;
use crate::value::Value;

/// Options for turning a tree into markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerializeOptions {
    /// Indent nested tags by two spaces. Tags with text children are
    /// written as they are, as is anything under `xml:space="preserve"`.
    pub pretty: bool,
    /// Start with an XML declaration.
    pub xml_declaration: bool,
}

/// Options for [`Domesque::write_document`] and
/// [`Domesque::save_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteOptions {
    /// Indent nested tags by two spaces.
    pub pretty: bool,
    /// Clean up namespace declarations before writing. On by default;
    /// [`None`] writes the declarations as they are.
    pub cleanup: Option<CleanupOptions>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            pretty: false,
            cleanup: Some(CleanupOptions::default()),
        }
    }
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Indented,
    Inline,
}

struct Serializer<'a, W: Write> {
    dom: &'a Domesque,
    scope: PrefixScope<'a>,
    pretty: bool,
    layout: Vec<Layout>,
    close_names: Vec<Cow<'a, str>>,
    w: W,
}

impl<'a, W: Write> Serializer<'a, W> {
    fn new(dom: &'a Domesque, pretty: bool, w: W) -> Self {
        Serializer {
            dom,
            scope: PrefixScope::new(dom),
            pretty,
            layout: Vec::new(),
            close_names: Vec::new(),
            w,
        }
    }

    fn serialize(&mut self, node: Node) -> Result<(), Error> {
        let dom = self.dom;
        for edge in dom.traverse(node) {
            match edge {
                NodeEdge::Start(node) => self.start(node)?,
                NodeEdge::End(node) => self.end(node)?,
            }
        }
        Ok(())
    }

    fn indent(&mut self) -> Result<(), Error> {
        if self.pretty && self.layout.last() == Some(&Layout::Indented) {
            write!(self.w, "\n{}", "  ".repeat(self.layout.len()))?;
        }
        Ok(())
    }

    fn qname(&mut self, node: Node, name_id: NameId, is_attribute: bool) -> Cow<'a, str> {
        let resolve = |scope: &PrefixScope<'a>| {
            if is_attribute {
                scope.resolve_attribute(name_id)
            } else {
                scope.resolve_element(name_id)
            }
        };
        let mut resolution = resolve(&self.scope);
        if let Resolution::Missing(namespace_id) = resolution {
            let hint = self.dom.prefix_for_namespace(node, namespace_id);
            self.scope.declare_missing(node, name_id, is_attribute, hint);
            resolution = resolve(&self.scope);
        }
        self.scope.qname(name_id, resolution)
    }

    fn child_layout(&self, node: Node) -> Layout {
        if self.layout.last() == Some(&Layout::Inline) {
            return Layout::Inline;
        }
        let has_text = self.dom.children(node).any(|child| self.dom.is_text(child));
        let preserve = self
            .dom
            .attribute(node, "{http://www.w3.org/XML/1998/namespace}space")
            == Some("preserve");
        if has_text || preserve {
            Layout::Inline
        } else {
            Layout::Indented
        }
    }

    fn start(&mut self, node: Node) -> Result<(), Error> {
        let dom = self.dom;
        match dom.value(node) {
            Value::Document(_) => {}
            Value::Tag(tag) => {
                self.indent()?;
                self.scope.push(node, tag.prefixes());
                let name = self.qname(node, tag.name(), false);
                let attributes = tag
                    .attributes()
                    .iter()
                    .map(|(name_id, value)| (self.qname(node, *name_id, true), value.as_str()))
                    .collect::<Vec<_>>();
                write!(self.w, "<{}", name)?;
                for (prefix, namespace_id) in self.scope.top_declarations() {
                    let namespace = serialize_attribute(dom.namespace_str(*namespace_id));
                    let prefix = self.scope.prefix_str(*prefix);
                    if prefix.is_empty() {
                        write!(self.w, " xmlns=\"{}\"", namespace)?;
                    } else {
                        write!(self.w, " xmlns:{}=\"{}\"", prefix, namespace)?;
                    }
                }
                for (name, value) in attributes {
                    write!(self.w, " {}=\"{}\"", name, serialize_attribute(value))?;
                }
                if dom.first_child(node).is_none() {
                    write!(self.w, "/>")?;
                } else {
                    write!(self.w, ">")?;
                    let layout = self.child_layout(node);
                    self.layout.push(layout);
                    self.close_names.push(name);
                }
            }
            Value::Text(text) => {
                write!(self.w, "{}", serialize_text(text.get()))?;
            }
            Value::Comment(comment) => {
                self.indent()?;
                write!(self.w, "<!--{}-->", comment.get())?;
            }
            Value::ProcessingInstruction(pi) => {
                self.indent()?;
                match pi.data() {
                    Some(data) => write!(self.w, "<?{} {}?>", pi.target(), data)?,
                    None => write!(self.w, "<?{}?>", pi.target())?,
                }
            }
        }
        Ok(())
    }

    fn end(&mut self, node: Node) -> Result<(), Error> {
        if !self.dom.is_tag(node) {
            return Ok(());
        }
        if self.dom.first_child(node).is_some() {
            let layout = self.layout.pop();
            if self.pretty && layout == Some(Layout::Indented) {
                write!(self.w, "\n{}", "  ".repeat(self.layout.len()))?;
            }
            if let Some(name) = self.close_names.pop() {
                write!(self.w, "</{}>", name)?;
            }
        }
        self.scope.pop();
        Ok(())
    }
}

/// ## Serialization
impl Domesque {
    /// Serialize a node and its descendants.
    ///
    /// Namespaces the subtree uses but doesn't declare itself are declared
    /// on the tag that needs them, with the prefix they have in the
    /// surrounding tree where possible.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(r#"<a xmlns:x="urn:x"><x:b>text</x:b></a>"#).unwrap();
    /// let a = dom.root(doc).unwrap();
    /// let b = dom.first_child(a).unwrap();
    /// assert_eq!(dom.to_string(b).unwrap(), r#"<x:b xmlns:x="urn:x">text</x:b>"#);
    /// ```
    pub fn to_string(&self, node: Node) -> Result<String, Error> {
        self.to_string_with(node, &SerializeOptions::default())
    }

    /// Serialize a node with options.
    pub fn to_string_with(&self, node: Node, options: &SerializeOptions) -> Result<String, Error> {
        let mut buf = Vec::new();
        if options.xml_declaration {
            writeln!(buf, "{}", XML_DECLARATION)?;
        }
        Serializer::new(self, options.pretty, &mut buf).serialize(node)?;
        into_string(buf)
    }

    /// Serialize a document: the nodes before the root, the root and the
    /// nodes after it, each on its own line. There is no XML declaration.
    pub fn document_to_string(&self, document: Document) -> Result<String, Error> {
        self.document_to_string_with(document, &SerializeOptions::default())
    }

    /// Serialize a document with options.
    pub fn document_to_string_with(
        &self,
        document: Document,
        options: &SerializeOptions,
    ) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.serialize_document(document, &mut buf, options)?;
        into_string(buf)
    }

    /// Serialize a document to a writer.
    pub fn serialize_document(
        &self,
        document: Document,
        w: &mut impl Write,
        options: &SerializeOptions,
    ) -> Result<(), Error> {
        let root = self.root(document)?;
        if options.xml_declaration {
            writeln!(w, "{}", XML_DECLARATION)?;
        }
        for node in self.head_nodes(document) {
            Serializer::new(self, false, &mut *w).serialize(node)?;
            writeln!(w)?;
        }
        Serializer::new(self, options.pretty, &mut *w).serialize(root)?;
        for node in self.tail_nodes(document) {
            writeln!(w)?;
            Serializer::new(self, false, &mut *w).serialize(node)?;
        }
        if options.pretty {
            writeln!(w)?;
        }
        Ok(())
    }

    /// Write a document with an XML declaration, cleaning up its namespace
    /// declarations first unless that is turned off.
    pub fn write_document(
        &mut self,
        document: Document,
        w: &mut impl Write,
        options: &WriteOptions,
    ) -> Result<(), Error> {
        if let Some(cleanup) = &options.cleanup {
            self.cleanup_namespaces(document, cleanup)?;
        }
        let serialize_options = SerializeOptions {
            pretty: options.pretty,
            xml_declaration: true,
        };
        self.serialize_document(document, w, &serialize_options)
    }

    /// Write a document to a file, see [`Domesque::write_document`].
    pub fn save_document(
        &mut self,
        document: Document,
        path: impl AsRef<Path>,
        options: &WriteOptions,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "saving document");
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_document(document, &mut file, options)?;
        file.flush()?;
        Ok(())
    }
}

fn into_string(buf: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(buf).map_err(|e| Error::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<a/>", "<a/>\n")]
    #[case("<a><b/><c/></a>", "<a>\n  <b/>\n  <c/>\n</a>\n")]
    #[case("<a><b>x<c/></b></a>", "<a>\n  <b>x<c/></b>\n</a>\n")]
    #[case(
        r#"<a xml:space="preserve"><b/></a>"#,
        "<a xml:space=\"preserve\"><b/></a>\n"
    )]
    fn test_pretty(#[case] xml: &str, #[case] expected: &str) {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(xml).unwrap();
        let options = SerializeOptions {
            pretty: true,
            xml_declaration: false,
        };
        assert_eq!(dom.document_to_string_with(doc, &options).unwrap(), expected);
    }

    #[test]
    fn test_escaping() {
        let mut dom = Domesque::new();
        let doc = dom
            .parse_document(r#"<a b="&quot;&lt;">&lt;&amp;&gt;</a>"#)
            .unwrap();
        assert_eq!(
            dom.document_to_string(doc).unwrap(),
            r#"<a b="&quot;&lt;">&lt;&amp;&gt;</a>"#
        );
    }

    #[test]
    fn test_undeclares_default_for_no_namespace_tag() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document(r#"<a xmlns="urn:a"/>"#).unwrap();
        let a = dom.root(doc).unwrap();
        let b_name = dom.add_name("b");
        let b = dom.new_tag(b_name);
        dom.append(a, b).unwrap();
        assert_eq!(
            dom.document_to_string(doc).unwrap(),
            r#"<a xmlns="urn:a"><b xmlns=""/></a>"#
        );
    }

    #[test]
    fn test_head_and_tail_nodes() {
        let mut dom = Domesque::new();
        let doc = dom
            .parse_document("<?xml version=\"1.0\"?><?pi data?><!--c--><a/><!--t-->")
            .unwrap();
        assert_eq!(
            dom.document_to_string(doc).unwrap(),
            "<?pi data?>\n<!--c-->\n<a/>\n<!--t-->"
        );
    }
}
