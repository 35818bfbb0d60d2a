use crate::domesque::{Domesque, Node};
use crate::value::{Comment, NodeKind, ProcessingInstruction, Tag, Text, Value};

/// Obtain node values and their kinds.
///
/// These are handy if you only need a single kind of value or already know
/// the kind. To handle all kinds, `match` on [`Value`] instead.
impl Domesque {
    /// Access to the value of this node.
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        self.arena()[node.get()].get()
    }

    /// Mutable access to the value of this node.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        self.arena_mut()[node.get()].get_mut()
    }

    /// The [`NodeKind`] of a node.
    pub fn kind(&self, node: Node) -> NodeKind {
        self.value(node).kind()
    }

    /// Return true if node is a tag node.
    pub fn is_tag(&self, node: Node) -> bool {
        self.kind(node) == NodeKind::Tag
    }

    /// Return true if node is a text node.
    pub fn is_text(&self, node: Node) -> bool {
        self.kind(node) == NodeKind::Text
    }

    /// Return true if node is a comment.
    pub fn is_comment(&self, node: Node) -> bool {
        self.kind(node) == NodeKind::Comment
    }

    /// Return true if node is a processing instruction.
    pub fn is_processing_instruction(&self, node: Node) -> bool {
        self.kind(node) == NodeKind::ProcessingInstruction
    }

    /// If this node is a tag, return a reference to it.
    pub fn tag(&self, node: Node) -> Option<&Tag> {
        match self.value(node) {
            Value::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// If this node is a tag, return a mutable reference to it.
    pub fn tag_mut(&mut self, node: Node) -> Option<&mut Tag> {
        match self.value_mut(node) {
            Value::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// If this node is text, return a reference to it.
    pub fn text(&self, node: Node) -> Option<&Text> {
        match self.value(node) {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// If this node is text, return a mutable reference to it.
    pub fn text_mut(&mut self, node: Node) -> Option<&mut Text> {
        match self.value_mut(node) {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// If this node is text, return the string.
    pub fn text_str(&self, node: Node) -> Option<&str> {
        self.text(node).map(|t| t.get())
    }

    /// If this node is a comment, return a reference to it.
    pub fn comment(&self, node: Node) -> Option<&Comment> {
        match self.value(node) {
            Value::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// If this node is a comment, return a mutable reference to it.
    pub fn comment_mut(&mut self, node: Node) -> Option<&mut Comment> {
        match self.value_mut(node) {
            Value::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// If this node is a comment, return its text.
    pub fn comment_str(&self, node: Node) -> Option<&str> {
        self.comment(node).map(|c| c.get())
    }

    /// If this node is a processing instruction, return a reference to it.
    pub fn processing_instruction(&self, node: Node) -> Option<&ProcessingInstruction> {
        match self.value(node) {
            Value::ProcessingInstruction(pi) => Some(pi),
            _ => None,
        }
    }

    /// If this node is a processing instruction, return a mutable reference
    /// to it.
    pub fn processing_instruction_mut(&mut self, node: Node) -> Option<&mut ProcessingInstruction> {
        match self.value_mut(node) {
            Value::ProcessingInstruction(pi) => Some(pi),
            _ => None,
        }
    }

    /// The concatenated text of all text nodes in this subtree.
    ///
    /// For a text node this is its own text, for comments and processing
    /// instructions it is their content.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document("<p>Hello <em>world</em>!</p>").unwrap();
    /// let p = dom.root(doc).unwrap();
    /// assert_eq!(dom.text_content(p), "Hello world!");
    /// ```
    pub fn text_content(&self, node: Node) -> String {
        match self.value(node) {
            Value::Text(text) => text.get().to_string(),
            Value::Comment(comment) => comment.get().to_string(),
            Value::ProcessingInstruction(pi) => pi.data().unwrap_or_default().to_string(),
            Value::Tag(_) | Value::Document(_) => self
                .descendants(node)
                .filter_map(|n| self.text_str(n))
                .collect(),
        }
    }
}
