use indextree::{Arena, NodeId};

use crate::id::{Name, NameId, NameLookup, NamespaceId, NamespaceLookup, PrefixId, PrefixLookup};
use crate::value::Value;

pub(crate) type NodeArena = Arena<Value>;

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A node in a tree.
///
/// This is a lightweight handle and can be copied. Equality is identity:
/// two handles are equal only if they refer to the very same node, never
/// because two nodes look alike.
///
/// A handle stays valid while its node lives in the [`Domesque`]: moving
/// or detaching the node keeps it. Once the node is dropped with
/// [`Domesque::remove`] its arena slot can be reused by a node created
/// later, so a handle kept past removal may refer to that unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(NodeId);

impl Node {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        Node(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// The `Domesque` struct owns all nodes of all documents and fragments in
/// your program and is the entry point for reading, editing and querying
/// them.
///
/// Its functionality is implemented in several sections: node access,
/// value access, construction, names, manipulation, documents, namespaces
/// and queries.
pub struct Domesque {
    pub(crate) arena: NodeArena,
    pub(crate) namespace_lookup: NamespaceLookup,
    pub(crate) prefix_lookup: PrefixLookup,
    pub(crate) name_lookup: NameLookup,
    pub(crate) no_namespace_id: NamespaceId,
    pub(crate) empty_prefix_id: PrefixId,
    pub(crate) xml_namespace_id: NamespaceId,
    pub(crate) xml_prefix_id: PrefixId,
}

impl Domesque {
    /// Create a new, empty `Domesque`.
    pub fn new() -> Self {
        let mut namespace_lookup = NamespaceLookup::new();
        let no_namespace_id = namespace_lookup.get_id_mut(String::new());
        let xml_namespace_id = namespace_lookup.get_id_mut(XML_NAMESPACE.to_string());
        let mut prefix_lookup = PrefixLookup::new();
        let empty_prefix_id = prefix_lookup.get_id_mut(String::new());
        let xml_prefix_id = prefix_lookup.get_id_mut("xml".to_string());
        Domesque {
            arena: NodeArena::new(),
            namespace_lookup,
            prefix_lookup,
            name_lookup: NameLookup::new(),
            no_namespace_id,
            empty_prefix_id,
            xml_namespace_id,
            xml_prefix_id,
        }
    }

    #[inline]
    pub(crate) fn arena(&self) -> &NodeArena {
        &self.arena
    }

    #[inline]
    pub(crate) fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    #[inline]
    pub(crate) fn name_value(&self, name_id: NameId) -> &Name {
        self.name_lookup.get_value(name_id)
    }
}

impl Default for Domesque {
    fn default() -> Self {
        Self::new()
    }
}
