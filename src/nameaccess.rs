use crate::domesque::{Domesque, Node};
use crate::error::Error;
use crate::id::{Name, NameId, NamespaceId, PrefixId};

/// ## Names, namespaces and prefixes
///
/// Names are interned: every distinct `{namespace}local` pair has a single
/// [`NameId`]. Tags and attributes store only that id, so a name never
/// depends on the prefix it happens to be written with.
impl Domesque {
    /// Look up name without a namespace.
    pub fn name(&self, name: &str) -> Option<NameId> {
        self.name_ns(name, self.no_namespace_id)
    }

    /// Add name without a namespace.
    /// If the name already exists, return its id.
    pub fn add_name(&mut self, name: &str) -> NameId {
        self.add_name_ns(name, self.no_namespace_id)
    }

    /// Look up name with a namespace.
    pub fn name_ns(&self, name: &str, namespace_id: NamespaceId) -> Option<NameId> {
        self.name_lookup.get_id(&Name::new(name, namespace_id))
    }

    /// Add name with a namespace.
    /// If the name already exists, return its id.
    pub fn add_name_ns(&mut self, name: &str, namespace_id: NamespaceId) -> NameId {
        self.name_lookup.get_id_mut(Name::new(name, namespace_id))
    }

    /// Add a name given in Clark notation, `{uri}local` or plain `local`.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let name = dom.name_from_clark("{http://www.tei-c.org/ns/1.0}pb");
    /// assert_eq!(dom.local_name_str(name), "pb");
    /// assert_eq!(dom.clark_name(name), "{http://www.tei-c.org/ns/1.0}pb");
    /// ```
    pub fn name_from_clark(&mut self, clark: &str) -> NameId {
        let (namespace, local) = split_clark(clark);
        let namespace_id = self.add_namespace(namespace);
        self.add_name_ns(local, namespace_id)
    }

    /// Look up a name given in Clark notation without interning it.
    pub fn lookup_clark(&self, clark: &str) -> Option<NameId> {
        let (namespace, local) = split_clark(clark);
        let namespace_id = self.namespace(namespace)?;
        self.name_ns(local, namespace_id)
    }

    /// Look up namespace.
    pub fn namespace(&self, namespace: &str) -> Option<NamespaceId> {
        self.namespace_lookup.get_id(&namespace.to_string())
    }

    /// Add namespace.
    /// If the namespace already exists, return its id.
    pub fn add_namespace(&mut self, namespace: &str) -> NamespaceId {
        self.namespace_lookup.get_id_mut(namespace.to_string())
    }

    /// Look up prefix.
    pub fn prefix(&self, prefix: &str) -> Option<PrefixId> {
        self.prefix_lookup.get_id(&prefix.to_string())
    }

    /// Add prefix. The empty prefix stands for the default namespace.
    /// If the prefix already exists, return its id.
    pub fn add_prefix(&mut self, prefix: &str) -> PrefixId {
        self.prefix_lookup.get_id_mut(prefix.to_string())
    }

    /// The id of "no namespace".
    pub fn no_namespace(&self) -> NamespaceId {
        self.no_namespace_id
    }

    /// The id of the default (empty) prefix.
    pub fn empty_prefix(&self) -> PrefixId {
        self.empty_prefix_id
    }

    /// The id of the namespace bound to the `xml` prefix.
    pub fn xml_namespace(&self) -> NamespaceId {
        self.xml_namespace_id
    }

    /// The id of the `xml` prefix.
    pub fn xml_prefix(&self) -> PrefixId {
        self.xml_prefix_id
    }

    /// The local part of a name.
    pub fn local_name_str(&self, name_id: NameId) -> &str {
        &self.name_value(name_id).local
    }

    /// The namespace of a name.
    pub fn namespace_for_name(&self, name_id: NameId) -> NamespaceId {
        self.name_value(name_id).namespace_id
    }

    /// The namespace URI; empty for no namespace.
    pub fn namespace_str(&self, namespace_id: NamespaceId) -> &str {
        self.namespace_lookup.get_value(namespace_id)
    }

    /// The prefix string; empty for the default prefix.
    pub fn prefix_str(&self, prefix_id: PrefixId) -> &str {
        self.prefix_lookup.get_value(prefix_id)
    }

    /// The name in Clark notation: `{uri}local`, or `local` if the name is
    /// in no namespace.
    pub fn clark_name(&self, name_id: NameId) -> String {
        let name = self.name_value(name_id);
        if name.namespace_id == self.no_namespace_id {
            name.local.clone()
        } else {
            format!("{{{}}}{}", self.namespace_str(name.namespace_id), name.local)
        }
    }

    /// The expanded name of a tag in Clark notation.
    ///
    /// Returns [`None`] if the node is not a tag.
    ///
    /// ```rust
    /// let mut dom = domesque::Domesque::new();
    /// let doc = dom.parse_document(r#"<x:a xmlns:x="urn:x"/>"#).unwrap();
    /// let a = dom.root(doc).unwrap();
    /// assert_eq!(dom.qualified_name(a).as_deref(), Some("{urn:x}a"));
    /// ```
    pub fn qualified_name(&self, node: Node) -> Option<String> {
        self.tag(node).map(|tag| self.clark_name(tag.name()))
    }

    /// The local name of a tag.
    pub fn local_name(&self, node: Node) -> Option<&str> {
        self.tag(node).map(|tag| self.local_name_str(tag.name()))
    }

    /// The namespace URI of a tag, [`None`] if it is in no namespace or the
    /// node is not a tag.
    pub fn namespace_uri(&self, node: Node) -> Option<&str> {
        let tag = self.tag(node)?;
        let namespace_id = self.namespace_for_name(tag.name());
        if namespace_id == self.no_namespace_id {
            None
        } else {
            Some(self.namespace_str(namespace_id))
        }
    }

    /// Get an attribute value by its Clark name.
    pub fn attribute(&self, node: Node, clark: &str) -> Option<&str> {
        let name_id = self.lookup_clark(clark)?;
        self.tag(node)?.get_attribute(name_id)
    }

    /// Set an attribute by its Clark name.
    ///
    /// Fails with [`Error::NotTag`] if the node is not a tag.
    pub fn set_attribute(&mut self, node: Node, clark: &str, value: &str) -> Result<(), Error> {
        if !self.is_tag(node) {
            return Err(Error::NotTag(node));
        }
        let name_id = self.name_from_clark(clark);
        if let Some(tag) = self.tag_mut(node) {
            tag.set_attribute(name_id, value);
        }
        Ok(())
    }

    /// Remove an attribute by its Clark name, returning the old value.
    pub fn remove_attribute(&mut self, node: Node, clark: &str) -> Result<Option<String>, Error> {
        if !self.is_tag(node) {
            return Err(Error::NotTag(node));
        }
        let Some(name_id) = self.lookup_clark(clark) else {
            return Ok(None);
        };
        Ok(self.tag_mut(node).and_then(|tag| tag.remove_attribute(name_id)))
    }

    /// The attributes of a tag as `(clark name, value)` pairs, in order.
    ///
    /// Empty for nodes that are not tags.
    pub fn attributes(&self, node: Node) -> Vec<(String, &str)> {
        match self.tag(node) {
            Some(tag) => tag
                .attributes()
                .iter()
                .map(|(name_id, value)| (self.clark_name(*name_id), value.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }
}

fn split_clark(clark: &str) -> (&str, &str) {
    if let Some(rest) = clark.strip_prefix('{') {
        if let Some((namespace, local)) = rest.split_once('}') {
            return (namespace, local);
        }
    }
    ("", clark)
}
