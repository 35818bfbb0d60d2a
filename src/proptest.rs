//! Proptest support for domesque
//!
//! Generates arbitrary documents as plain [`TreeDocument`] values that can
//! be built into a [`Domesque`], so properties can be checked against
//! arbitrary trees: namespace declarations scattered all over, shadowed,
//! redundant or missing.
//!
//! This can be enabled by adding the `proptest` feature to your
//! `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! domesque = { version = "0.1", features = ["proptest"] }
//! ```

use ahash::HashSet;
use proptest::prelude::*;

use crate::cleanup::CleanupOptions;
use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::error::Error;

const NAMESPACES: &[&str] = &["", "http://example.com/x", "http://example.com/y"];
const PREFIXES: &[&str] = &["", "x", "y"];
const TAG_NAMES: &[&str] = &["a", "b", "c", "d", "e"];
const ATTRIBUTE_NAMES: &[&str] = &["q", "r", "s"];
const PI_TARGETS: &[&str] = &["pi1", "pi2", "pi3"];
const XML_STRING: &str = "[\u{000a}\u{0009}][\u{0020}-\u{D7FF}][\u{E000}-\u{FFFD}]*";
const XML_STRING_WITHOUT_WHITESPACE: &str = "[\u{0020}-\u{D7FF}][\u{E000}-\u{FFFD}]*";

/// A document to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDocument {
    /// Comments and processing instructions before the root.
    pub before: Vec<TreeContent>,
    pub root: TreeTag,
    /// Comments and processing instructions after the root.
    pub after: Vec<TreeContent>,
}

/// A tag to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeTag {
    /// Namespace URI, empty for no namespace.
    pub namespace: String,
    pub name: String,
    /// `(prefix, namespace)` declarations. The empty prefix declares the
    /// default namespace.
    pub prefixes: Vec<(String, String)>,
    /// `((name, namespace), value)`
    pub attributes: Vec<((String, String), String)>,
    pub children: Vec<TreeContent>,
}

/// Content of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeContent {
    Tag(TreeTag),
    Text(String),
    Comment(String),
    ProcessingInstruction(String, Option<String>),
}

impl TreeDocument {
    /// Build the document.
    pub fn build(&self, dom: &mut Domesque) -> Result<Document, Error> {
        let root = self.root.build(dom)?;
        let document = dom.new_document(root)?;
        for content in &self.before {
            let node = content.build(dom)?;
            dom.insert_before(root, node)?;
        }
        let mut last = root;
        for content in &self.after {
            let node = content.build(dom)?;
            dom.insert_after(last, node)?;
            last = node;
        }
        Ok(document)
    }
}

impl TreeTag {
    /// Build the tag and its content, detached.
    pub fn build(&self, dom: &mut Domesque) -> Result<Node, Error> {
        let namespace_id = dom.add_namespace(&self.namespace);
        let name_id = dom.add_name_ns(&self.name, namespace_id);
        let node = dom.new_tag(name_id);
        let mut prefixes = Vec::with_capacity(self.prefixes.len());
        for (prefix, namespace) in &self.prefixes {
            prefixes.push((dom.add_prefix(prefix), dom.add_namespace(namespace)));
        }
        let mut attributes = Vec::with_capacity(self.attributes.len());
        for ((name, namespace), value) in &self.attributes {
            let namespace_id = dom.add_namespace(namespace);
            attributes.push((dom.add_name_ns(name, namespace_id), value));
        }
        if let Some(tag) = dom.tag_mut(node) {
            for (prefix_id, namespace_id) in prefixes {
                tag.set_prefix(prefix_id, namespace_id);
            }
            for (name_id, value) in attributes {
                tag.set_attribute(name_id, value.as_str());
            }
        }
        for child in &self.children {
            let child = child.build(dom)?;
            dom.append(node, child)?;
        }
        Ok(node)
    }
}

impl TreeContent {
    /// Build the content, detached.
    pub fn build(&self, dom: &mut Domesque) -> Result<Node, Error> {
        match self {
            TreeContent::Tag(tag) => tag.build(dom),
            TreeContent::Text(text) => Ok(dom.new_text(text)),
            TreeContent::Comment(comment) => dom.new_comment(comment),
            TreeContent::ProcessingInstruction(target, data) => {
                dom.new_processing_instruction(target, data.as_deref())
            }
        }
    }
}

fn arb_attribute() -> impl Strategy<Value = ((String, String), String)> {
    (
        prop::sample::select(ATTRIBUTE_NAMES),
        prop::sample::select(NAMESPACES),
        XML_STRING_WITHOUT_WHITESPACE,
    )
        .prop_map(|(name, namespace, value)| ((name.to_string(), namespace.to_string()), value))
}

// only the default prefix can be undeclared
fn arb_prefix() -> impl Strategy<Value = (String, String)> {
    (
        prop::sample::select(PREFIXES),
        prop::sample::select(NAMESPACES),
    )
        .prop_filter("prefix bound to no namespace", |(prefix, namespace)| {
            prefix.is_empty() || !namespace.is_empty()
        })
        .prop_map(|(prefix, namespace)| (prefix.to_string(), namespace.to_string()))
}

fn arb_comment() -> impl Strategy<Value = String> {
    XML_STRING.prop_filter("comment", |s| !s.contains('-'))
}

fn arb_processing_instruction() -> impl Strategy<Value = (String, Option<String>)> {
    (
        prop::sample::select(PI_TARGETS),
        prop::option::of(
            XML_STRING_WITHOUT_WHITESPACE
                .prop_filter("non-empty and unterminated", |s| !s.is_empty() && !s.contains("?>")),
        ),
    )
        .prop_map(|(target, data)| (target.to_string(), data))
}

fn arb_misc() -> impl Strategy<Value = TreeContent> {
    prop_oneof![
        arb_comment().prop_map(TreeContent::Comment),
        arb_processing_instruction()
            .prop_map(|(target, data)| TreeContent::ProcessingInstruction(target, data)),
    ]
}

fn arb_tag(children: impl Strategy<Value = Vec<TreeContent>>) -> impl Strategy<Value = TreeTag> {
    (
        prop::sample::select(TAG_NAMES),
        prop::sample::select(NAMESPACES),
        children,
        prop::collection::vec(arb_attribute(), 0..4),
        prop::collection::vec(arb_prefix(), 0..4),
    )
        .prop_map(|(name, namespace, children, attributes, prefixes)| TreeTag {
            namespace: namespace.to_string(),
            name: name.to_string(),
            prefixes: unduplicate(prefixes, |(prefix, _)| prefix.clone()),
            attributes: unduplicate(attributes, |(name, _)| name.clone()),
            children,
        })
}

fn arb_content() -> impl Strategy<Value = TreeContent> {
    let leaf = prop_oneof![XML_STRING.prop_map(TreeContent::Text), arb_misc()];
    leaf.prop_recursive(
        6,   // levels deep
        128, // maximum number of nodes
        8,   // items per collection
        |inner| arb_tag(prop::collection::vec(inner, 0..8)).prop_map(TreeContent::Tag),
    )
}

fn unduplicate<T, K: std::hash::Hash + Eq>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen = HashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Generate an arbitrary document.
///
/// ```notrust
/// use domesque::proptest::arb_document;
/// use domesque::Domesque;
///
/// proptest! {
///   #[test]
///   fn test_builds(tree in arb_document()) {
///     let mut dom = Domesque::new();
///     prop_assert!(tree.build(&mut dom).is_ok());
///   }
/// }
/// ```
pub fn arb_document() -> impl Strategy<Value = TreeDocument> {
    (
        prop::collection::vec(arb_misc(), 0..4),
        arb_tag(prop::collection::vec(arb_content(), 0..8)),
        prop::collection::vec(arb_misc(), 0..4),
    )
        .prop_map(|(before, root, after)| TreeDocument {
            before,
            root,
            after,
        })
}

/// Generate arbitrary [`CleanupOptions`] over the prefixes and namespaces
/// that [`arb_document`] uses.
pub fn arb_cleanup_options() -> impl Strategy<Value = CleanupOptions> {
    (
        prop::collection::vec(prop::sample::select(PREFIXES), 0..3),
        prop::collection::vec(arb_prefix(), 0..3),
    )
        .prop_map(|(retain_prefixes, namespaces)| CleanupOptions {
            retain_prefixes: retain_prefixes.into_iter().map(String::from).collect(),
            namespaces,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded_names(dom: &Domesque, root: Node) -> Vec<String> {
        let mut names = Vec::new();
        for node in dom.descendants(root) {
            if let Some(tag) = dom.tag(node) {
                names.push(dom.clark_name(tag.name()));
                for (name_id, value) in tag.attributes().iter() {
                    names.push(format!("@{}={:?}", dom.clark_name(*name_id), value));
                }
            }
        }
        names
    }

    proptest! {
        #[test]
        fn test_cleanup_is_idempotent(
            tree in arb_document(),
            options in arb_cleanup_options()
        ) {
            let mut dom = Domesque::new();
            let doc = tree.build(&mut dom).unwrap();
            dom.cleanup_namespaces(doc, &options).unwrap();
            let once = dom.document_to_string(doc).unwrap();
            dom.cleanup_namespaces(doc, &options).unwrap();
            let twice = dom.document_to_string(doc).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    proptest! {
        #[test]
        fn test_cleanup_and_round_trip_keep_names(
            tree in arb_document(),
            options in arb_cleanup_options()
        ) {
            let mut dom = Domesque::new();
            let doc = tree.build(&mut dom).unwrap();
            let before = expanded_names(&dom, dom.root(doc).unwrap());
            dom.cleanup_namespaces(doc, &options).unwrap();
            let serialized = dom.document_to_string(doc).unwrap();
            let parsed = dom.parse_document(&serialized);
            prop_assert!(parsed.is_ok(), "Cannot parse: {} {:?}", serialized, parsed.err());
            let parsed = parsed.unwrap();
            let after = expanded_names(&dom, dom.root(parsed).unwrap());
            prop_assert_eq!(before, after);
        }
    }
}
