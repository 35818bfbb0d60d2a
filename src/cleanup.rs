use ahash::HashSet;
use tracing::{debug, trace};

use crate::access::NodeEdge;
use crate::document::Document;
use crate::domesque::{Domesque, Node};
use crate::error::Error;
use crate::fullname::{PrefixRef, PrefixScope, Resolution};
use crate::id::{NamespaceId, PrefixId};

/// Options for [`Domesque::cleanup_namespaces`].
///
/// Prefixes are given as strings; the empty string stands for the default
/// namespace.
///
/// ```rust
/// use domesque::CleanupOptions;
///
/// let options = CleanupOptions::new()
///     .retain("y")
///     .namespace("", "urn:x")
///     .namespace("d", "urn:d");
/// assert_eq!(options.retain_prefixes, vec!["y".to_string()]);
/// assert_eq!(options.namespaces.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanupOptions {
    /// Declarations of these prefixes are never removed.
    pub retain_prefixes: Vec<String>,
    /// Prefix and namespace pairs to declare on the root, so that
    /// descendants can share them.
    pub namespaces: Vec<(String, String)>,
}

impl CleanupOptions {
    /// Options that only drop redundant and unused declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep all declarations of `prefix`.
    pub fn retain(mut self, prefix: &str) -> Self {
        self.retain_prefixes.push(prefix.to_string());
        self
    }

    /// Declare `prefix` for `namespace` on the root.
    pub fn namespace(mut self, prefix: &str, namespace: &str) -> Self {
        self.namespaces
            .push((prefix.to_string(), namespace.to_string()));
        self
    }
}

type Declaration = (Node, PrefixId);

/// ## Namespace cleanup
impl Domesque {
    /// Remove namespace declarations that aren't needed.
    ///
    /// A declaration goes away if its prefix is already bound to the same
    /// namespace by an ancestor, if one of the requested
    /// [`CleanupOptions::namespaces`] already binds its namespace, or if no
    /// tag or attribute name is written with it. Declarations of retained
    /// prefixes always stay. Requested namespaces are declared on the root
    /// and kept if anything uses them. Names that end up with no usable
    /// prefix get a declaration on their own tag.
    ///
    /// The expanded names of all tags and attributes stay the same, and
    /// running it a second time changes nothing.
    ///
    /// ```rust
    /// use domesque::CleanupOptions;
    ///
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom
    ///     .parse_document(r#"<root xmlns="D" xmlns:y="Y"><x:a xmlns:x="X"/><b/></root>"#)
    ///     .unwrap();
    /// dom.cleanup_namespaces(doc, &CleanupOptions::new()).unwrap();
    /// assert_eq!(
    ///     dom.document_to_string(doc).unwrap(),
    ///     r#"<root xmlns="D"><x:a xmlns:x="X"/><b/></root>"#
    /// );
    /// ```
    pub fn cleanup_namespaces(
        &mut self,
        document: Document,
        options: &CleanupOptions,
    ) -> Result<(), Error> {
        let root = self.root(document)?;
        let retained = options
            .retain_prefixes
            .iter()
            .map(|prefix| self.add_prefix(prefix))
            .collect::<HashSet<_>>();
        let requested = options
            .namespaces
            .iter()
            .map(|(prefix, namespace)| (self.add_prefix(prefix), self.add_namespace(namespace)))
            .collect::<Vec<_>>();

        // a declaration of a requested prefix that the root doesn't need
        // must not keep the requested one off the root
        let mut removed = self.remove_unneeded_declarations(root, &retained, &[], &requested);
        let held = self.declare_requested(root, &requested, &retained);
        removed += self.remove_unneeded_declarations(root, &retained, &held, &requested);

        let used = self.used_declarations(root);
        for (node, prefix_id) in held.iter().copied() {
            if !retained.contains(&prefix_id) && !used.contains(&(node, prefix_id)) {
                self.remove_declaration(node, prefix_id);
            }
        }

        // materializing can rewrite a default declaration to `xmlns=""`,
        // which may then be redundant
        let mut added = 0;
        loop {
            removed += self.remove_unneeded_declarations(root, &retained, &held, &requested);
            let declared = self.declare_missing_namespaces(root);
            if declared == 0 {
                break;
            }
            added += declared;
        }
        debug!(removed, added, "cleaned up namespace declarations");
        Ok(())
    }

    fn declare_requested(
        &mut self,
        root: Node,
        requested: &[(PrefixId, NamespaceId)],
        retained: &HashSet<PrefixId>,
    ) -> Vec<Declaration> {
        let mut held = Vec::new();
        for (prefix_id, namespace_id) in requested {
            let (prefix_id, namespace_id) = (*prefix_id, *namespace_id);
            let Some(tag) = self.tag(root) else {
                break;
            };
            if namespace_id == self.no_namespace_id || tag.get_namespace(prefix_id).is_some() {
                continue;
            }
            if prefix_id == self.empty_prefix_id
                && self.namespace_for_name(tag.name()) == self.no_namespace_id
            {
                trace!("not declaring a default namespace on a root in no namespace");
                continue;
            }
            if retained.contains(&prefix_id)
                && self.declarations(root).iter().any(|(node, p)| {
                    *p == prefix_id
                        && self.tag(*node).and_then(|t| t.get_namespace(*p)) != Some(namespace_id)
                })
            {
                trace!(
                    prefix = self.prefix_str(prefix_id),
                    "retained prefix is bound to another namespace"
                );
                continue;
            }
            if let Some(tag) = self.tag_mut(root) {
                tag.set_prefix(prefix_id, namespace_id);
                held.push((root, prefix_id));
            }
        }
        held
    }

    // drops redundant declarations first, then unused ones, one at a time
    // until none is left; returns how many were removed
    fn remove_unneeded_declarations(
        &mut self,
        root: Node,
        retained: &HashSet<PrefixId>,
        held: &[Declaration],
        requested: &[(PrefixId, NamespaceId)],
    ) -> usize {
        let kept = |declaration: &Declaration| {
            retained.contains(&declaration.1) || held.contains(declaration)
        };
        let mut removed = 0;
        loop {
            let found = self
                .find_redundant_declaration(root, &kept, requested)
                .or_else(|| {
                    let used = self.used_declarations(root);
                    self.declarations(root)
                        .into_iter()
                        .find(|declaration| !kept(declaration) && !used.contains(declaration))
                });
            let Some((node, prefix_id)) = found else {
                return removed;
            };
            self.remove_declaration(node, prefix_id);
            removed += 1;
        }
    }

    // all declarations in document order
    fn declarations(&self, root: Node) -> Vec<Declaration> {
        self.descendants(root)
            .filter_map(|node| self.tag(node).map(|tag| (node, tag)))
            .flat_map(|(node, tag)| tag.prefixes().iter().map(move |(p, _)| (node, *p)))
            .collect()
    }

    fn parent_binding(&self, node: Node, prefix_id: PrefixId) -> Option<NamespaceId> {
        if prefix_id == self.xml_prefix_id {
            return Some(self.xml_namespace_id);
        }
        self.parent(node)
            .and_then(|parent| self.namespace_for_prefix(parent, prefix_id))
    }

    fn find_redundant_declaration(
        &self,
        root: Node,
        kept: &impl Fn(&Declaration) -> bool,
        requested: &[(PrefixId, NamespaceId)],
    ) -> Option<Declaration> {
        self.declarations(root).into_iter().find(|(node, prefix_id)| {
            if kept(&(*node, *prefix_id)) {
                return false;
            }
            let Some(tag) = self.tag(*node) else {
                return false;
            };
            let Some(namespace_id) = tag.get_namespace(*prefix_id) else {
                return false;
            };
            let inherited = self.parent_binding(*node, *prefix_id);
            if inherited == Some(namespace_id)
                || (inherited.is_none() && namespace_id == self.no_namespace_id)
            {
                return true;
            }
            requested.iter().any(|(requested_prefix, requested_namespace)| {
                *requested_namespace == namespace_id
                    && *requested_prefix != *prefix_id
                    && *requested_prefix != self.empty_prefix_id
                    && tag.get_namespace(*requested_prefix).is_none()
                    && self.parent_binding(*node, *requested_prefix) == Some(namespace_id)
            })
        })
    }

    // declarations that some tag or attribute name is written with
    fn used_declarations(&self, root: Node) -> HashSet<Declaration> {
        let mut used = HashSet::default();
        let mut mark = |resolution: Resolution| match resolution {
            Resolution::Unprefixed {
                declaration: Some(owner),
            } => {
                used.insert((owner, self.empty_prefix_id));
            }
            Resolution::Prefixed {
                prefix: PrefixRef::Id(prefix_id),
                owner: Some(owner),
            } => {
                used.insert((owner, prefix_id));
            }
            _ => {}
        };
        let mut scope = PrefixScope::new(self);
        for edge in self.traverse(root) {
            match edge {
                NodeEdge::Start(node) => {
                    if let Some(tag) = self.tag(node) {
                        scope.push(node, tag.prefixes());
                        mark(scope.resolve_element(tag.name()));
                        for (name_id, _) in tag.attributes().iter() {
                            mark(scope.resolve_attribute(*name_id));
                        }
                    }
                }
                NodeEdge::End(node) => {
                    if self.is_tag(node) {
                        scope.pop();
                    }
                }
            }
        }
        used
    }

    fn remove_declaration(&mut self, node: Node, prefix_id: PrefixId) {
        trace!(
            prefix = self.prefix_str(prefix_id),
            "removing namespace declaration"
        );
        if let Some(tag) = self.tag_mut(node) {
            tag.remove_prefix(prefix_id);
        }
    }

    // declares the namespaces no prefix in scope can express; returns how
    // many declarations were added
    fn declare_missing_namespaces(&mut self, root: Node) -> usize {
        let mut additions = Vec::new();
        let mut scope = PrefixScope::new(self);
        for edge in self.traverse(root) {
            match edge {
                NodeEdge::Start(node) => {
                    let Some(tag) = self.tag(node) else {
                        continue;
                    };
                    scope.push(node, tag.prefixes());
                    let names = std::iter::once((tag.name(), false))
                        .chain(tag.attributes().iter().map(|(name_id, _)| (*name_id, true)));
                    for (name_id, is_attribute) in names {
                        let resolution = if is_attribute {
                            scope.resolve_attribute(name_id)
                        } else {
                            scope.resolve_element(name_id)
                        };
                        if let Resolution::Missing(namespace_id) = resolution {
                            let prefix = scope.declare_missing(node, name_id, is_attribute, None);
                            additions.push((node, prefix, namespace_id));
                        }
                    }
                }
                NodeEdge::End(node) => {
                    if self.is_tag(node) {
                        scope.pop();
                    }
                }
            }
        }
        let added = additions.len();
        for (node, prefix, namespace_id) in additions {
            let prefix_id = match prefix {
                PrefixRef::Id(prefix_id) => prefix_id,
                PrefixRef::Generated(n) => self.add_prefix(&format!("ns{}", n)),
            };
            if let Some(tag) = self.tag_mut(node) {
                tag.set_prefix(prefix_id, namespace_id);
            }
        }
        added
    }
}
