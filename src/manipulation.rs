use crate::domesque::{Domesque, Node};
use crate::error::Error;
use crate::value::{NodeKind, Value};

/// ## Manipulation
///
/// These operations keep the tree well formed:
///
/// - A node lives in at most one tree. A node you insert must be detached
///   first; this includes the root of a document.
/// - A node can't be inserted below itself.
/// - Only tags have children.
/// - The only siblings a document root can have are comments and
///   processing instructions.
///
/// All checks happen before anything changes, so a failed operation leaves
/// the tree as it was.
///
/// Text nodes are consolidated: two text nodes are never adjacent. If you
/// insert a text node next to another text node, its text is merged into
/// the existing node and the inserted node is removed. Detaching a node
/// that separates two text nodes merges them as well.
impl Domesque {
    /// Append a child to the end of the children of the given parent.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<p>Hello</p>").unwrap();
    /// let p = dom.root(doc).unwrap();
    /// let text = dom.new_text(" world");
    /// dom.append(p, text).unwrap();
    /// assert_eq!(dom.document_to_string(doc).unwrap(), "<p>Hello world</p>");
    /// ```
    pub fn append(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.insert_check(parent, child)?;
        if self.consolidate_inserted_text(child, self.last_child(parent), None) {
            return Ok(());
        }
        parent.get().checked_append(child.get(), self.arena_mut())?;
        Ok(())
    }

    /// Append a new text node to a parent.
    pub fn append_text(&mut self, parent: Node, text: &str) -> Result<(), Error> {
        let text = self.new_text(text);
        self.append(parent, text)
    }

    /// Prepend a child to the beginning of the children of the given parent.
    pub fn prepend(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.insert_check(parent, child)?;
        if self.consolidate_inserted_text(child, None, self.first_child(parent)) {
            return Ok(());
        }
        parent.get().checked_prepend(child.get(), self.arena_mut())?;
        Ok(())
    }

    /// Insert a new sibling after a reference node.
    pub fn insert_after(&mut self, reference: Node, new_sibling: Node) -> Result<(), Error> {
        let parent = self.sibling_parent(reference)?;
        self.insert_check(parent, new_sibling)?;
        if self.consolidate_inserted_text(
            new_sibling,
            Some(reference),
            self.next_sibling(reference),
        ) {
            return Ok(());
        }
        reference
            .get()
            .checked_insert_after(new_sibling.get(), self.arena_mut())?;
        Ok(())
    }

    /// Insert a new sibling before a reference node.
    pub fn insert_before(&mut self, reference: Node, new_sibling: Node) -> Result<(), Error> {
        let parent = self.sibling_parent(reference)?;
        self.insert_check(parent, new_sibling)?;
        if self.consolidate_inserted_text(
            new_sibling,
            self.previous_sibling(reference),
            Some(reference),
        ) {
            return Ok(());
        }
        reference
            .get()
            .checked_insert_before(new_sibling.get(), self.arena_mut())?;
        Ok(())
    }

    /// Replace a node with another one, returning the replaced node, which
    /// is now detached.
    ///
    /// A document root can only be replaced by a tag; this is the same as
    /// [`Domesque::set_root`].
    pub fn replace(&mut self, old: Node, new: Node) -> Result<Node, Error> {
        if old == new {
            return Ok(old);
        }
        let parent = self.sibling_parent(old)?;
        self.detached_check(parent, new)?;
        if self.kind(parent) == NodeKind::Document {
            let (old_kind, new_kind) = (self.kind(old), self.kind(new));
            if (old_kind == NodeKind::Tag) != (new_kind == NodeKind::Tag) {
                return Err(Error::InvalidOperation(
                    "a document holds exactly one tag, its root".into(),
                ));
            }
            if new_kind == NodeKind::Text {
                return Err(Error::InvalidOperation(
                    "text cannot be a sibling of a document root".into(),
                ));
            }
        }
        if let (Value::Text(_), Value::Text(_)) = (self.value(old), self.value(new)) {
            // same shape, so no consolidation can be triggered
            old.get().insert_after(new.get(), self.arena_mut());
            old.get().detach(self.arena_mut());
            return Ok(old);
        }
        let previous = self.previous_sibling(old);
        let next = self.next_sibling(old);
        old.get().detach(self.arena_mut());
        if self.consolidate_inserted_text(new, previous, next) {
            // the new text may now touch text on both sides
            self.consolidate_adjacent_text(previous, next);
        } else {
            match (previous, next) {
                (Some(previous), _) => previous.get().insert_after(new.get(), self.arena_mut()),
                (None, Some(next)) => next.get().insert_before(new.get(), self.arena_mut()),
                (None, None) => parent.get().append(new.get(), self.arena_mut()),
            }
        }
        Ok(old)
    }

    /// Detach a node (and its descendants) from its tree and return it.
    ///
    /// The node keeps its children, attributes and namespace declarations
    /// but no longer has a parent or a document. Detaching the root of a
    /// document leaves that document without a root. Detaching a node that
    /// is already detached does nothing.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<root><node/></root>").unwrap();
    /// let root = dom.root(doc).unwrap();
    /// let node = dom.detach(dom.first_child(root).unwrap());
    /// assert_eq!(dom.parent(node), None);
    /// assert!(!dom.contains(doc, node));
    /// ```
    pub fn detach(&mut self, node: Node) -> Node {
        if self.raw_parent(node).is_none() {
            return node;
        }
        let previous = self.previous_sibling(node);
        let next = self.next_sibling(node);
        node.get().detach(self.arena_mut());
        self.consolidate_adjacent_text(previous, next);
        node
    }

    /// Detach a node and free it and its descendants.
    ///
    /// Handles to removed nodes must not be used anymore. Only until a new
    /// node is created does [`Domesque::is_removed`] reliably report them;
    /// after that the freed slots may hold other nodes.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<a><b/></a>").unwrap();
    /// let b = dom.first_child(dom.root(doc).unwrap()).unwrap();
    /// dom.remove(b);
    /// assert!(dom.is_removed(b));
    /// assert_eq!(dom.document_to_string(doc).unwrap(), "<a/>");
    /// ```
    pub fn remove(&mut self, node: Node) {
        if self.is_removed(node) {
            return;
        }
        self.detach(node);
        node.get().remove_subtree(self.arena_mut());
    }

    fn sibling_parent(&self, reference: Node) -> Result<Node, Error> {
        self.raw_parent(reference).ok_or_else(|| {
            Error::InvalidOperation("cannot add a sibling to a node without a parent".into())
        })
    }

    fn detached_check(&self, parent: Node, node: Node) -> Result<(), Error> {
        match self.kind(node) {
            NodeKind::Document => {
                return Err(Error::InvalidOperation("cannot move a document node".into()));
            }
            _ if self.is_removed(node) => {
                return Err(Error::InvalidOperation("node has been removed".into()));
            }
            _ => {}
        }
        if let Some(current) = self.raw_parent(node) {
            let message = if self.kind(current) == NodeKind::Document {
                "node is the root of a document; detach it first"
            } else {
                "node already has a parent; detach it first"
            };
            return Err(Error::InvalidOperation(message.into()));
        }
        if parent.get().ancestors(self.arena()).any(|a| a == node.get()) {
            return Err(Error::InvalidOperation(
                "cannot insert a node below itself".into(),
            ));
        }
        Ok(())
    }

    fn insert_check(&self, parent: Node, child: Node) -> Result<(), Error> {
        match self.kind(parent) {
            NodeKind::Tag => {}
            NodeKind::Document => match self.kind(child) {
                NodeKind::Comment | NodeKind::ProcessingInstruction => {}
                _ => {
                    return Err(Error::InvalidOperation(
                        "only comments and processing instructions can be siblings of a document root"
                            .into(),
                    ));
                }
            },
            _ => {
                return Err(Error::InvalidOperation(
                    "only tag nodes can have children".into(),
                ));
            }
        }
        self.detached_check(parent, child)
    }

    // merges an inserted text node into an adjacent one; returns true if
    // the inserted node was consumed
    fn consolidate_inserted_text(
        &mut self,
        node: Node,
        previous: Option<Node>,
        next: Option<Node>,
    ) -> bool {
        let Some(added) = self.text_str(node).map(|t| t.to_string()) else {
            return false;
        };
        if let Some(text) = previous.and_then(|previous| self.text_mut(previous)) {
            let merged = format!("{}{}", text.get(), added);
            text.set(merged);
        } else if let Some(text) = next.and_then(|next| self.text_mut(next)) {
            let merged = format!("{}{}", added, text.get());
            text.set(merged);
        } else {
            return false;
        }
        node.get().remove(self.arena_mut());
        true
    }

    fn consolidate_adjacent_text(&mut self, previous: Option<Node>, next: Option<Node>) {
        let (Some(previous), Some(next)) = (previous, next) else {
            return;
        };
        let Some(following) = self.text_str(next).map(|t| t.to_string()) else {
            return;
        };
        if let Some(text) = self.text_mut(previous) {
            let merged = format!("{}{}", text.get(), following);
            text.set(merged);
            next.get().remove(self.arena_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_merges_text() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document("<p>a<b/>c</p>").unwrap();
        let p = dom.root(doc).unwrap();
        let b = dom.child(p, 1).unwrap();
        dom.detach(b);
        assert_eq!(dom.children(p).count(), 1);
        assert_eq!(dom.text_content(p), "ac");
    }

    #[test]
    fn test_replace_with_text_between_texts() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document("<p>a<b/>c</p>").unwrap();
        let p = dom.root(doc).unwrap();
        let b = dom.child(p, 1).unwrap();
        let x = dom.new_text("X");
        assert_eq!(dom.replace(b, x).unwrap(), b);
        assert_eq!(dom.children(p).count(), 1);
        assert_eq!(dom.text_content(p), "aXc");
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_failed_insert_leaves_tree_unchanged() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document("<a><b/></a>").unwrap();
        let a = dom.root(doc).unwrap();
        let b = dom.first_child(a).unwrap();
        let other = dom.parse_document("<c/>").unwrap();
        let c = dom.root(other).unwrap();
        assert!(matches!(dom.append(b, c), Err(Error::InvalidOperation(_))));
        assert_eq!(dom.root(other).unwrap(), c);
        assert_eq!(dom.first_child(b), None);
    }

    #[test]
    fn test_cannot_insert_below_itself() {
        let mut dom = Domesque::new();
        let doc = dom.parse_document("<a><b><c/></b></a>").unwrap();
        let a = dom.root(doc).unwrap();
        let b = dom.detach(dom.first_child(a).unwrap());
        let c = dom.first_child(b).unwrap();
        assert!(matches!(dom.append(c, b), Err(Error::InvalidOperation(_))));
    }
}
