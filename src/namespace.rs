use crate::domesque::{Domesque, Node};
use crate::id::{NamespaceId, PrefixId};
use crate::value::Prefixes;

/// ## Namespace scope
///
/// The namespaces in scope at a node are never stored. They are computed
/// from the declarations on the node and its ancestors, closer declarations
/// shadowing those further out. The `xml` prefix is always in scope.
impl Domesque {
    /// All prefixes in scope at this node, outermost declarations first.
    ///
    /// For a node that is not a tag, this is the scope of its parent. An
    /// undeclared default namespace (`xmlns=""`) is not part of the result.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(r#"<a xmlns="urn:d"><b xmlns:x="urn:x"/></a>"#).unwrap();
    /// let a = dom.root(doc).unwrap();
    /// let b = dom.first_child(a).unwrap();
    /// let scope = dom.namespaces_in_scope(b);
    /// let x = dom.prefix("x").unwrap();
    /// assert_eq!(scope.get(&x), dom.namespace("urn:x").as_ref());
    /// assert_eq!(scope.get(&dom.empty_prefix()), dom.namespace("urn:d").as_ref());
    /// ```
    pub fn namespaces_in_scope(&self, node: Node) -> Prefixes {
        let mut scope = Prefixes::new();
        scope.insert(self.xml_prefix_id, self.xml_namespace_id);
        let chain = self.ancestors(node).collect::<Vec<_>>();
        for ancestor in chain.into_iter().rev() {
            if let Some(tag) = self.tag(ancestor) {
                for (prefix_id, namespace_id) in tag.prefixes().iter() {
                    scope.insert(*prefix_id, *namespace_id);
                }
            }
        }
        if scope.get(&self.empty_prefix_id) == Some(&self.no_namespace_id) {
            let mut without_default = Prefixes::new();
            for (prefix_id, namespace_id) in scope.iter() {
                if *prefix_id != self.empty_prefix_id {
                    without_default.insert(*prefix_id, *namespace_id);
                }
            }
            scope = without_default;
        }
        scope
    }

    /// The namespace bound to `prefix` at this node.
    ///
    /// Looking up the empty prefix gives the default namespace, if any.
    pub fn namespace_for_prefix(&self, node: Node, prefix_id: PrefixId) -> Option<NamespaceId> {
        if prefix_id == self.xml_prefix_id {
            return Some(self.xml_namespace_id);
        }
        let namespace_id = self
            .ancestors(node)
            .filter_map(|ancestor| self.tag(ancestor))
            .find_map(|tag| tag.get_namespace(prefix_id))?;
        if namespace_id == self.no_namespace_id {
            None
        } else {
            Some(namespace_id)
        }
    }

    /// The closest prefix bound to `namespace_id` at this node that isn't
    /// shadowed by a closer declaration.
    pub fn prefix_for_namespace(&self, node: Node, namespace_id: NamespaceId) -> Option<PrefixId> {
        if namespace_id == self.xml_namespace_id {
            return Some(self.xml_prefix_id);
        }
        for ancestor in self.ancestors(node) {
            let Some(tag) = self.tag(ancestor) else {
                continue;
            };
            for (prefix_id, declared) in tag.prefixes().iter() {
                if *declared == namespace_id
                    && self.namespace_for_prefix(node, *prefix_id) == Some(namespace_id)
                {
                    return Some(*prefix_id);
                }
            }
        }
        None
    }

    /// Strings for the prefixes in scope, `""` for the default namespace.
    pub fn namespaces_in_scope_str(&self, node: Node) -> Vec<(&str, &str)> {
        self.namespaces_in_scope(node)
            .iter()
            .map(|(prefix_id, namespace_id)| {
                (self.prefix_str(*prefix_id), self.namespace_str(*namespace_id))
            })
            .collect()
    }
}
