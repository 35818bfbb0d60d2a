use vector_map::VecMap;

use crate::error::Error;
use crate::id::{NameId, NamespaceId, PrefixId};

/// The kind of a node.
///
/// Use it when you are interested in the kind of a node without needing
/// to match on its [`Value`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NodeKind {
    /// The document node that holds the root and the nodes around it.
    /// It is not the root tag itself and is never returned as a parent.
    Document,
    /// Tag node (element); it has a name, attributes and namespace
    /// declarations.
    Tag,
    /// Text node.
    Text,
    /// Comment node.
    Comment,
    /// Processing instruction node.
    ProcessingInstruction,
}

/// The value stored at a node.
#[derive(Debug, Clone)]
pub enum Value {
    /// Document node.
    Document(DocumentData),
    /// Tag node.
    Tag(Tag),
    /// Text node.
    Text(Text),
    /// Comment node.
    Comment(Comment),
    /// Processing instruction node.
    ProcessingInstruction(ProcessingInstruction),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> NodeKind {
        match self {
            Value::Document(_) => NodeKind::Document,
            Value::Tag(_) => NodeKind::Tag,
            Value::Text(_) => NodeKind::Text,
            Value::Comment(_) => NodeKind::Comment,
            Value::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }
}

/// Attributes of a tag, in insertion order.
pub type Attributes = VecMap<NameId, String>;
/// Namespace declarations made on a tag, prefix to namespace.
///
/// The empty prefix declares the default namespace; binding it to the empty
/// namespace undeclares the default (`xmlns=""`).
pub type Prefixes = VecMap<PrefixId, NamespaceId>;

/// Data kept on the document node.
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    pub(crate) source_url: Option<String>,
}

impl DocumentData {
    /// The path the document was loaded from, if any.
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// Tag node value.
///
/// Example: `<foo/>` or `<x:foo xmlns:x="urn:x" bar="baz"/>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub(crate) name_id: NameId,
    pub(crate) prefixes: Prefixes,
    pub(crate) attributes: Attributes,
}

impl Tag {
    pub(crate) fn new(name_id: NameId) -> Self {
        Tag {
            name_id,
            prefixes: Prefixes::new(),
            attributes: Attributes::new(),
        }
    }

    /// The name of the tag.
    pub fn name(&self) -> NameId {
        self.name_id
    }

    /// Rename the tag.
    pub fn set_name(&mut self, name_id: NameId) {
        self.name_id = name_id;
    }

    /// The attributes of the tag.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get an attribute by name.
    pub fn get_attribute(&self, name_id: NameId) -> Option<&str> {
        self.attributes.get(&name_id).map(|s| s.as_str())
    }

    /// Set an attribute value. An existing attribute keeps its position.
    pub fn set_attribute<S: Into<String>>(&mut self, name_id: NameId, value: S) {
        self.attributes.insert(name_id, value.into());
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name_id: NameId) -> Option<String> {
        let value = self.attributes.get(&name_id)?.clone();
        let mut kept = Attributes::new();
        for (key, value) in self.attributes.iter() {
            if *key != name_id {
                kept.insert(*key, value.clone());
            }
        }
        self.attributes = kept;
        Some(value)
    }

    /// The namespace declarations made on this tag.
    ///
    /// Declarations of ancestors are not included; see
    /// [`Domesque::namespaces_in_scope`](crate::Domesque::namespaces_in_scope).
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Declare a prefix on this tag.
    ///
    /// This never changes what the tag or its attributes are named; names
    /// are stored by namespace, prefixes only matter for serialization.
    pub fn set_prefix(&mut self, prefix_id: PrefixId, namespace_id: NamespaceId) {
        self.prefixes.insert(prefix_id, namespace_id);
    }

    /// Remove a prefix declaration from this tag.
    pub fn remove_prefix(&mut self, prefix_id: PrefixId) {
        self.retain_prefixes(|p, _| p != prefix_id);
    }

    /// The namespace a prefix is declared for on this tag.
    pub fn get_namespace(&self, prefix_id: PrefixId) -> Option<NamespaceId> {
        self.prefixes.get(&prefix_id).copied()
    }

    // rebuilds so that the declaration order stays stable
    pub(crate) fn retain_prefixes(&mut self, mut keep: impl FnMut(PrefixId, NamespaceId) -> bool) {
        let mut kept = Prefixes::new();
        for (prefix_id, namespace_id) in self.prefixes.iter() {
            if keep(*prefix_id, *namespace_id) {
                kept.insert(*prefix_id, *namespace_id);
            }
        }
        self.prefixes = kept;
    }
}

/// Text node value.
#[derive(Debug, Clone)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    /// Get the text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// Comment node value.
///
/// Example: `<!-- foo -->`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    /// Get the comment text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the comment text.
    ///
    /// Rejects text containing `--` or ending in `-`.
    pub fn set<S: Into<String>>(&mut self, text: S) -> Result<(), Error> {
        let text = text.into();
        validate_comment(&text)?;
        self.text = text;
        Ok(())
    }
}

pub(crate) fn validate_comment(text: &str) -> Result<(), Error> {
    if text.contains("--") || text.ends_with('-') {
        return Err(Error::InvalidComment(text.to_string()));
    }
    Ok(())
}

/// Processing instruction node value.
///
/// Example: `<?foo?>` or `<?foo bar?>`.
#[derive(Debug, Clone)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    /// Get the target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Set the target. `xml` in any casing is reserved.
    pub fn set_target<S: Into<String>>(&mut self, target: S) -> Result<(), Error> {
        let target = target.into();
        validate_target(&target)?;
        self.target = target;
        Ok(())
    }

    /// Set the data. Empty data is the same as no data.
    pub fn set_data<S: Into<String>>(&mut self, data: Option<S>) {
        self.data = data.map(Into::into).filter(|d| !d.is_empty());
    }
}

pub(crate) fn validate_target(target: &str) -> Result<(), Error> {
    if target.is_empty() || target.eq_ignore_ascii_case("xml") {
        return Err(Error::InvalidTarget(target.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_rejects_double_hyphen() {
        let mut comment = Comment::new("fine".to_string());
        assert!(matches!(
            comment.set("not -- fine"),
            Err(Error::InvalidComment(_))
        ));
        assert_eq!(comment.get(), "fine");
    }

    #[test]
    fn test_reserved_target() {
        let mut pi = ProcessingInstruction::new("target".to_string(), None);
        assert!(matches!(pi.set_target("XmL"), Err(Error::InvalidTarget(_))));
        assert!(matches!(pi.set_target(""), Err(Error::InvalidTarget(_))));
        pi.set_target("other").unwrap();
        assert_eq!(pi.target(), "other");
    }

    #[test]
    fn test_empty_data_is_none() {
        let mut pi = ProcessingInstruction::new("target".to_string(), None);
        pi.set_data(Some(""));
        assert_eq!(pi.data(), None);
        pi.set_data(Some("data"));
        assert_eq!(pi.data(), Some("data"));
    }
}
