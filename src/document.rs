use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domesque::{Domesque, Node};
use crate::encoding::decode;
use crate::error::Error;
use crate::parse::ParseOptions;
use crate::value::{NodeKind, Value};

/// A document: a single root tag, plus the comments and processing
/// instructions before and after it.
///
/// Like [`Node`], this is a lightweight handle into a [`Domesque`] and
/// compares by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Document(Node);

impl Document {
    #[inline]
    pub(crate) fn new(node: Node) -> Self {
        Document(node)
    }

    #[inline]
    pub(crate) fn node(self) -> Node {
        self.0
    }
}

/// Something a document can be loaded from.
///
/// Conversions exist for strings, byte slices, paths and tag nodes, so any
/// of these can be passed to [`Domesque::parse_document`]. Other types are
/// rejected by the compiler.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// XML markup.
    Text(&'a str),
    /// Encoded XML markup. The encoding is detected from a byte order mark
    /// or the XML declaration and defaults to UTF-8.
    Bytes(&'a [u8]),
    /// A file to read.
    Path(&'a Path),
    /// A tag whose subtree is copied to become the new document's root.
    Tree(Node),
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Source<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<Node> for Source<'_> {
    fn from(node: Node) -> Self {
        Source::Tree(node)
    }
}

/// ## Documents
impl Domesque {
    /// Load a document with the default [`ParseOptions`].
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<root><node/></root>").unwrap();
    /// let copy = dom.parse_document(dom.root(doc).unwrap()).unwrap();
    /// assert_ne!(dom.root(doc).unwrap(), dom.root(copy).unwrap());
    /// ```
    ///
    /// Only the supported source types are accepted:
    ///
    /// ```compile_fail
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(0);
    /// ```
    pub fn parse_document<'a>(&mut self, source: impl Into<Source<'a>>) -> Result<Document, Error> {
        self.parse_document_with(source, &ParseOptions::default())
    }

    /// Load a document.
    ///
    /// A [`Source::Tree`] must be a tag node that hasn't been removed;
    /// anything else fails with [`Error::UnsupportedSource`]. Its subtree is
    /// copied, the original stays where it is.
    pub fn parse_document_with<'a>(
        &mut self,
        source: impl Into<Source<'a>>,
        options: &ParseOptions,
    ) -> Result<Document, Error> {
        match source.into() {
            Source::Text(text) => {
                debug!(len = text.len(), "parsing document from text");
                self.parse_into_document(text, options, None)
            }
            Source::Bytes(bytes) => {
                debug!(len = bytes.len(), "parsing document from bytes");
                let text = decode(bytes)?;
                self.parse_into_document(&text, options, None)
            }
            Source::Path(path) => {
                debug!(path = %path.display(), "parsing document from file");
                let bytes = std::fs::read(path)?;
                let text = decode(&bytes)?;
                self.parse_into_document(&text, options, Some(path.display().to_string()))
            }
            Source::Tree(node) => {
                if self.is_removed(node) {
                    return Err(Error::UnsupportedSource("node has been removed".into()));
                }
                if !self.is_tag(node) {
                    return Err(Error::UnsupportedSource(format!(
                        "a document root must be a tag node, not {:?}",
                        self.kind(node)
                    )));
                }
                debug!("creating document from a copy of a tree");
                let root = self.clone_node(node);
                self.new_document(root)
            }
        }
    }

    /// Make a detached tag the root of a new document.
    pub fn new_document(&mut self, root: Node) -> Result<Document, Error> {
        if !self.is_tag(root) {
            return Err(Error::NotTag(root));
        }
        if self.raw_parent(root).is_some() {
            return Err(Error::InvalidOperation(
                "the root of a new document must be detached".into(),
            ));
        }
        let document = self.new_document_node(None);
        document.get().checked_append(root.get(), self.arena_mut())?;
        Ok(Document::new(document))
    }

    /// Deep copy of a document, including the nodes around its root.
    pub fn clone_document(&mut self, document: Document) -> Document {
        let copy = self.clone_subtree(document.node());
        Document::new(copy)
    }

    /// The root tag of the document.
    ///
    /// Fails with [`Error::NoRoot`] after the root has been detached and
    /// before a new one is set.
    pub fn root(&self, document: Document) -> Result<Node, Error> {
        self.children(document.node())
            .find(|node| self.is_tag(*node))
            .ok_or(Error::NoRoot)
    }

    /// Replace the root of a document.
    ///
    /// The candidate must be a tag node that has no parent and isn't the
    /// root of another document. The replaced root is detached; the
    /// comments and processing instructions around it stay in place.
    /// Setting the current root again does nothing.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<root><node/></root>").unwrap();
    /// let root = dom.root(doc).unwrap();
    /// let node = dom.detach(dom.first_child(root).unwrap());
    /// dom.set_root(doc, node).unwrap();
    /// assert_eq!(dom.document_to_string(doc).unwrap(), "<node/>");
    /// assert_eq!(dom.parent(root), None);
    /// ```
    pub fn set_root(&mut self, document: Document, candidate: Node) -> Result<(), Error> {
        if !self.is_tag(candidate) {
            return Err(Error::NotTag(candidate));
        }
        if self.is_removed(candidate) {
            return Err(Error::InvalidOperation("node has been removed".into()));
        }
        match self.raw_parent(candidate) {
            Some(parent) if parent == document.node() => return Ok(()),
            Some(parent) if self.kind(parent) == NodeKind::Document => {
                return Err(Error::InvalidOperation(
                    "node is the root of another document; detach it first".into(),
                ));
            }
            Some(_) => {
                return Err(Error::InvalidOperation(
                    "a root node must not have a parent; detach it first".into(),
                ));
            }
            None => {}
        }
        match self.root(document) {
            Ok(old_root) => {
                debug!("replacing document root");
                old_root
                    .get()
                    .checked_insert_after(candidate.get(), self.arena_mut())?;
                old_root.get().detach(self.arena_mut());
            }
            Err(_) => {
                debug!("setting root of rootless document");
                document
                    .node()
                    .get()
                    .checked_append(candidate.get(), self.arena_mut())?;
            }
        }
        Ok(())
    }

    /// Check whether the node belongs to this document.
    ///
    /// This is identity: a node from a structurally identical document is
    /// not contained.
    pub fn contains(&self, document: Document, node: Node) -> bool {
        node.get().ancestors(self.arena()).last() == Some(document.node().get())
            && node != document.node()
    }

    /// The comments and processing instructions before the root.
    pub fn head_nodes(&self, document: Document) -> Vec<Node> {
        self.children(document.node())
            .take_while(|node| !self.is_tag(*node))
            .collect()
    }

    /// The comments and processing instructions after the root.
    ///
    /// Empty if the document has no root.
    pub fn tail_nodes(&self, document: Document) -> Vec<Node> {
        self.children(document.node())
            .skip_while(|node| !self.is_tag(*node))
            .skip(1)
            .collect()
    }

    /// The path the document was loaded from, if it was loaded from a file.
    pub fn source_url(&self, document: Document) -> Option<&str> {
        match self.value(document.node()) {
            Value::Document(data) => data.source_url(),
            _ => None,
        }
    }
}
