use indextree::NodeEdge as IndexTreeNodeEdge;

use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::value::{NodeKind, Value};

/// Node edges.
///
/// Used by [`Domesque::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEdge {
    /// The start edge of a node. For a tag this is the start tag.
    Start(Node),
    /// The end edge of a node. For a tag this is the end tag. For any other
    /// node the end edge immediately follows the start edge.
    End(Node),
}

/// ## Read-only access
///
/// Navigation follows the parent, child and sibling links of the tree. The
/// document node that holds a root is never returned by these functions:
/// the root of a document has no parent.
impl Domesque {
    /// Get the parent node.
    ///
    /// Returns [`None`] for the root of a document and for detached nodes.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<p>Example</p>").unwrap();
    /// let p = dom.root(doc).unwrap();
    /// let text = dom.first_child(p).unwrap();
    /// assert_eq!(dom.parent(text), Some(p));
    /// assert_eq!(dom.parent(p), None);
    /// ```
    pub fn parent(&self, node: Node) -> Option<Node> {
        let parent = self.raw_parent(node)?;
        if self.kind(parent) == NodeKind::Document {
            None
        } else {
            Some(parent)
        }
    }

    // parent including the document node
    pub(crate) fn raw_parent(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].parent().map(Node::new)
    }

    /// The document this node belongs to, if any.
    ///
    /// The relation is derived from the parent chain; it does not keep the
    /// document alive and disappears as soon as the node (or an ancestor) is
    /// detached.
    pub fn document(&self, node: Node) -> Option<Document> {
        let top = node.get().ancestors(self.arena()).last().map(Node::new)?;
        if let Value::Document(_) = self.value(top) {
            Some(Document::new(top))
        } else {
            None
        }
    }

    /// The topmost node of the tree this node is in.
    ///
    /// For a node in a document this is the document's root. For a detached
    /// node it is the node at the top of the detached fragment.
    pub fn top(&self, node: Node) -> Node {
        let mut top = node;
        for ancestor in self.ancestors(node) {
            top = ancestor;
        }
        top
    }

    /// Check whether a node has been removed with [`Domesque::remove`].
    pub fn is_removed(&self, node: Node) -> bool {
        self.arena()[node.get()].is_removed()
    }

    /// Iterator over the child nodes of this node.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<p><a/>text<b/></p>").unwrap();
    /// let p = dom.root(doc).unwrap();
    /// assert_eq!(dom.children(p).count(), 3);
    /// ```
    pub fn children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().children(self.arena()).map(Node::new)
    }

    /// Iterator over the child nodes of this node, in reverse order.
    pub fn reverse_children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().reverse_children(self.arena()).map(Node::new)
    }

    /// Get the child at `index`.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<p><a/><b/></p>").unwrap();
    /// let p = dom.root(doc).unwrap();
    /// let b = dom.child(p, 1).unwrap();
    /// assert_eq!(dom.local_name(b), Some("b"));
    /// assert_eq!(dom.child(p, 2), None);
    /// ```
    pub fn child(&self, node: Node, index: usize) -> Option<Node> {
        self.children(node).nth(index)
    }

    /// Get the first child.
    pub fn first_child(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].first_child().map(Node::new)
    }

    /// Get the last child.
    pub fn last_child(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].last_child().map(Node::new)
    }

    /// Get the next sibling.
    ///
    /// For the root of a document the siblings are the comments and
    /// processing instructions around it.
    pub fn next_sibling(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].next_sibling().map(Node::new)
    }

    /// Get the previous sibling.
    pub fn previous_sibling(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].previous_sibling().map(Node::new)
    }

    /// The position of this node among its parent's children.
    ///
    /// Returns [`None`] if the node has no parent.
    pub fn index(&self, node: Node) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).position(|child| child == node)
    }

    /// Iterator over ancestor nodes, including this one.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<a><b><c/></b></a>").unwrap();
    /// let a = dom.root(doc).unwrap();
    /// let b = dom.first_child(a).unwrap();
    /// let c = dom.first_child(b).unwrap();
    /// assert_eq!(dom.ancestors(c).collect::<Vec<_>>(), vec![c, b, a]);
    /// ```
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get()
            .ancestors(self.arena())
            .map(Node::new)
            .take_while(|n| self.kind(*n) != NodeKind::Document)
    }

    /// Iterator over the descendants of this node, including this one, in
    /// document order.
    pub fn descendants(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().descendants(self.arena()).map(Node::new)
    }

    /// Iterator over the following siblings of this node, including this
    /// one.
    pub fn following_siblings(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().following_siblings(self.arena()).map(Node::new)
    }

    /// Iterator over the preceding siblings of this node, including this
    /// one, closest first.
    pub fn preceding_siblings(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().preceding_siblings(self.arena()).map(Node::new)
    }

    /// Traverse over node edges in document order.
    ///
    /// For the tree `<a><b/></a>` this generates a [`NodeEdge::Start`] for
    /// `<a>`, a [`NodeEdge::Start`] and [`NodeEdge::End`] for `<b>`, and
    /// finally a [`NodeEdge::End`] for `<a>`.
    pub fn traverse(&self, node: Node) -> impl Iterator<Item = NodeEdge> + '_ {
        node.get().traverse(self.arena()).map(|edge| match edge {
            IndexTreeNodeEdge::Start(node_id) => NodeEdge::Start(Node::new(node_id)),
            IndexTreeNodeEdge::End(node_id) => NodeEdge::End(Node::new(node_id)),
        })
    }
}
