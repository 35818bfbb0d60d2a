use crate::domesque::{Domesque, Node};
use crate::error::Error;
use crate::id::NameId;
use crate::value::{
    validate_comment, validate_target, Comment, DocumentData, Prefixes, ProcessingInstruction,
    Tag, Text, Value,
};

/// ## Creation
///
/// New nodes are always detached. Put them into a tree with
/// [`Domesque::append`] and friends, or make a tag the root of a document
/// with [`Domesque::new_document`] or [`Domesque::set_root`].
impl Domesque {
    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        Node::new(self.arena_mut().new_node(value))
    }

    pub(crate) fn new_document_node(&mut self, source_url: Option<String>) -> Node {
        self.new_node(Value::Document(DocumentData { source_url }))
    }

    /// Create a new tag node with the given name.
    ///
    /// Get a name id with [`Domesque::add_name`], [`Domesque::add_name_ns`]
    /// or [`Domesque::name_from_clark`].
    pub fn new_tag(&mut self, name_id: NameId) -> Node {
        self.new_node(Value::Tag(Tag::new(name_id)))
    }

    /// Create a new tag node named `local` in `namespace`.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let pb = dom.new_tag_ns("pb", "http://www.tei-c.org/ns/1.0");
    /// assert_eq!(
    ///     dom.qualified_name(pb).as_deref(),
    ///     Some("{http://www.tei-c.org/ns/1.0}pb")
    /// );
    /// ```
    pub fn new_tag_ns(&mut self, local: &str, namespace: &str) -> Node {
        let namespace_id = self.add_namespace(namespace);
        let name_id = self.add_name_ns(local, namespace_id);
        self.new_tag(name_id)
    }

    /// Create a new text node.
    pub fn new_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    /// Create a new comment node.
    ///
    /// Fails with [`Error::InvalidComment`] if the text contains `--` or ends
    /// with `-`.
    pub fn new_comment(&mut self, comment: &str) -> Result<Node, Error> {
        validate_comment(comment)?;
        Ok(self.new_node(Value::Comment(Comment::new(comment.to_string()))))
    }

    /// Create a new processing instruction node.
    ///
    /// Fails with [`Error::InvalidTarget`] if the target is empty or `xml`.
    pub fn new_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<Node, Error> {
        validate_target(target)?;
        let data = data.filter(|d| !d.is_empty()).map(|d| d.to_string());
        Ok(self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
            target.to_string(),
            data,
        ))))
    }

    /// Deep copy of a node and its descendants.
    ///
    /// The copy is detached. When a tag is copied out of a tree, the
    /// namespace declarations it inherited from its ancestors are declared
    /// on the copy, so it reads the same on its own.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(r#"<a xmlns:x="urn:x"><x:b/></a>"#).unwrap();
    /// let a = dom.root(doc).unwrap();
    /// let b = dom.first_child(a).unwrap();
    /// let copy = dom.clone_node(b);
    /// assert_ne!(copy, b);
    /// assert_eq!(dom.parent(copy), None);
    /// assert_eq!(dom.to_string(copy).unwrap(), r#"<x:b xmlns:x="urn:x"/>"#);
    /// ```
    pub fn clone_node(&mut self, node: Node) -> Node {
        let inherited = self
            .parent(node)
            .filter(|_| self.is_tag(node))
            .map(|parent| self.namespaces_in_scope(parent));
        let copy = self.clone_subtree(node);
        if let Some(inherited) = inherited {
            let xml_prefix_id = self.xml_prefix_id;
            if let Some(tag) = self.tag_mut(copy) {
                let mut prefixes = Prefixes::new();
                for (prefix_id, namespace_id) in inherited.iter().chain(tag.prefixes().iter()) {
                    if *prefix_id != xml_prefix_id {
                        prefixes.insert(*prefix_id, *namespace_id);
                    }
                }
                tag.prefixes = prefixes;
            }
        }
        copy
    }

    pub(crate) fn clone_subtree(&mut self, node: Node) -> Node {
        let value = self.value(node).clone();
        let copy = self.new_node(value);
        let children = self.children(node).collect::<Vec<_>>();
        for child in children {
            let child_copy = self.clone_subtree(child);
            copy.get().append(child_copy.get(), self.arena_mut());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_comment() {
        let mut dom = Domesque::new();
        assert!(matches!(
            dom.new_comment("a--b"),
            Err(Error::InvalidComment(_))
        ));
        assert!(dom.new_comment("fine").is_ok());
    }

    #[test]
    fn test_invalid_target() {
        let mut dom = Domesque::new();
        assert!(matches!(
            dom.new_processing_instruction("xml", None),
            Err(Error::InvalidTarget(_))
        ));
        let pi = dom.new_processing_instruction("go", Some("")).unwrap();
        assert_eq!(dom.processing_instruction(pi).unwrap().data(), None);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut dom = Domesque::new();
        let name = dom.add_name("a");
        let a = dom.new_tag(name);
        let text = dom.new_text("hello");
        dom.append(a, text).unwrap();
        let copy = dom.clone_node(a);
        let copied_text = dom.first_child(copy).unwrap();
        assert_ne!(copied_text, text);
        assert_eq!(dom.text_str(copied_text), Some("hello"));
        dom.text_mut(text).unwrap().set("changed");
        assert_eq!(dom.text_str(copied_text), Some("hello"));
    }
}
