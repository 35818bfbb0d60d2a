use ahash::HashMap;
use std::borrow::Cow;

use crate::domesque::{Domesque, Node};
use crate::id::{NameId, NamespaceId, PrefixId};
use crate::value::Prefixes;

/// A prefix as seen by the resolver: either interned, or generated while
/// resolving (`ns0`, `ns1`, ...) by a caller that cannot intern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PrefixRef {
    Id(PrefixId),
    Generated(u32),
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    namespace_id: NamespaceId,
    depth: usize,
    order: usize,
    owner: Node,
}

struct Frame {
    declarations: Vec<(PrefixRef, NamespaceId)>,
    shadowed: Vec<(PrefixRef, Option<Binding>)>,
}

/// How a name is written at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// No prefix. `declaration` is the tag whose default namespace
    /// declaration (or `xmlns=""`) is relied upon, if any.
    Unprefixed { declaration: Option<Node> },
    /// With a prefix. `owner` is the declaring tag; [`None`] for `xml`.
    Prefixed {
        prefix: PrefixRef,
        owner: Option<Node>,
    },
    /// The namespace cannot be expressed with the declarations in scope.
    Missing(NamespaceId),
}

/// Prefix resolution while walking a tree top-down.
///
/// Push the declarations of each tag on entering it and pop on leaving.
/// For a name in a namespace the default prefix is preferred when it is
/// bound to that namespace, otherwise the closest declaration wins, and
/// the first declared on the same tag on ties. Attributes never use the
/// default prefix.
pub(crate) struct PrefixScope<'a> {
    dom: &'a Domesque,
    bindings: HashMap<PrefixRef, Binding>,
    frames: Vec<Frame>,
}

impl<'a> PrefixScope<'a> {
    pub(crate) fn new(dom: &'a Domesque) -> Self {
        PrefixScope {
            dom,
            bindings: HashMap::default(),
            frames: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, owner: Node, prefixes: &Prefixes) {
        self.frames.push(Frame {
            declarations: Vec::new(),
            shadowed: Vec::new(),
        });
        for (prefix_id, namespace_id) in prefixes.iter() {
            self.declare(owner, PrefixRef::Id(*prefix_id), *namespace_id);
        }
    }

    pub(crate) fn pop(&mut self) {
        if let Some(frame) = self.frames.pop() {
            for (prefix, binding) in frame.shadowed.into_iter().rev() {
                match binding {
                    Some(binding) => {
                        self.bindings.insert(prefix, binding);
                    }
                    None => {
                        self.bindings.remove(&prefix);
                    }
                }
            }
        }
    }

    /// Declare a prefix on the tag of the current frame. A declaration of
    /// the same prefix on that tag is replaced in place.
    pub(crate) fn declare(&mut self, owner: Node, prefix: PrefixRef, namespace_id: NamespaceId) {
        let depth = self.frames.len();
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        let order = match frame.declarations.iter().position(|(p, _)| *p == prefix) {
            Some(order) => {
                frame.declarations[order].1 = namespace_id;
                order
            }
            None => {
                frame
                    .shadowed
                    .push((prefix, self.bindings.get(&prefix).copied()));
                frame.declarations.push((prefix, namespace_id));
                frame.declarations.len() - 1
            }
        };
        self.bindings.insert(
            prefix,
            Binding {
                namespace_id,
                depth,
                order,
                owner,
            },
        );
    }

    /// The declarations made on the tag of the current frame, including
    /// any added with [`PrefixScope::declare`].
    pub(crate) fn top_declarations(&self) -> &[(PrefixRef, NamespaceId)] {
        self.frames
            .last()
            .map(|frame| frame.declarations.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn lookup(&self, prefix: PrefixRef) -> Option<NamespaceId> {
        self.bindings.get(&prefix).map(|b| b.namespace_id)
    }

    fn default_binding(&self) -> Option<&Binding> {
        self.bindings.get(&PrefixRef::Id(self.dom.empty_prefix_id))
    }

    pub(crate) fn resolve_element(&self, name_id: NameId) -> Resolution {
        let namespace_id = self.dom.namespace_for_name(name_id);
        if namespace_id == self.dom.no_namespace_id {
            return match self.default_binding() {
                None => Resolution::Unprefixed { declaration: None },
                Some(b) if b.namespace_id == self.dom.no_namespace_id => Resolution::Unprefixed {
                    declaration: Some(b.owner),
                },
                Some(_) => Resolution::Missing(namespace_id),
            };
        }
        if let Some(b) = self.default_binding() {
            if b.namespace_id == namespace_id {
                return Resolution::Unprefixed {
                    declaration: Some(b.owner),
                };
            }
        }
        self.resolve_prefixed(namespace_id)
    }

    pub(crate) fn resolve_attribute(&self, name_id: NameId) -> Resolution {
        let namespace_id = self.dom.namespace_for_name(name_id);
        if namespace_id == self.dom.no_namespace_id {
            return Resolution::Unprefixed { declaration: None };
        }
        self.resolve_prefixed(namespace_id)
    }

    fn resolve_prefixed(&self, namespace_id: NamespaceId) -> Resolution {
        if namespace_id == self.dom.xml_namespace_id {
            return Resolution::Prefixed {
                prefix: PrefixRef::Id(self.dom.xml_prefix_id),
                owner: None,
            };
        }
        let empty = PrefixRef::Id(self.dom.empty_prefix_id);
        let best = self
            .bindings
            .iter()
            .filter(|(prefix, b)| **prefix != empty && b.namespace_id == namespace_id)
            .min_by_key(|(_, b)| (std::cmp::Reverse(b.depth), b.order));
        match best {
            Some((prefix, b)) => Resolution::Prefixed {
                prefix: *prefix,
                owner: Some(b.owner),
            },
            None => Resolution::Missing(namespace_id),
        }
    }

    /// Declare a prefix for a name that resolved as missing and return the
    /// prefix used.
    ///
    /// A name in no namespace undeclares the default. Otherwise a free
    /// non-default `hint` is used, then the default prefix for a tag name
    /// if the tag doesn't declare it itself, and finally a generated `nsN`.
    pub(crate) fn declare_missing(
        &mut self,
        owner: Node,
        name_id: NameId,
        is_attribute: bool,
        hint: Option<PrefixId>,
    ) -> PrefixRef {
        let namespace_id = self.dom.namespace_for_name(name_id);
        let empty = PrefixRef::Id(self.dom.empty_prefix_id);
        let declares_default = self
            .top_declarations()
            .iter()
            .any(|(prefix, _)| *prefix == empty);
        let default_free = !is_attribute && !declares_default;
        let prefix = match hint {
            _ if namespace_id == self.dom.no_namespace_id => empty,
            Some(hint)
                if hint != self.dom.empty_prefix_id
                    && hint != self.dom.xml_prefix_id
                    && self.lookup(PrefixRef::Id(hint)).is_none() =>
            {
                PrefixRef::Id(hint)
            }
            _ if default_free => empty,
            _ => self.generate_prefix(),
        };
        tracing::trace!(
            prefix = %self.prefix_str(prefix),
            namespace = self.dom.namespace_str(namespace_id),
            "declaring missing namespace"
        );
        self.declare(owner, prefix, namespace_id);
        prefix
    }

    fn generate_prefix(&self) -> PrefixRef {
        let mut n = 0;
        loop {
            let generated = PrefixRef::Generated(n);
            let interned = self
                .dom
                .prefix(&format!("ns{}", n))
                .map(PrefixRef::Id)
                .and_then(|p| self.lookup(p));
            if self.lookup(generated).is_none() && interned.is_none() {
                return generated;
            }
            n += 1;
        }
    }

    pub(crate) fn prefix_str(&self, prefix: PrefixRef) -> Cow<'a, str> {
        match prefix {
            PrefixRef::Id(prefix_id) => Cow::Borrowed(self.dom.prefix_str(prefix_id)),
            PrefixRef::Generated(n) => Cow::Owned(format!("ns{}", n)),
        }
    }

    /// The name as written at the current position, `prefix:local` or
    /// `local`.
    pub(crate) fn qname(&self, name_id: NameId, resolution: Resolution) -> Cow<'a, str> {
        let local = self.dom.local_name_str(name_id);
        match resolution {
            Resolution::Prefixed { prefix, .. } => {
                Cow::Owned(format!("{}:{}", self.prefix_str(prefix), local))
            }
            Resolution::Unprefixed { .. } | Resolution::Missing(_) => Cow::Borrowed(local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferred_for_elements_only() {
        let mut dom = Domesque::new();
        let ns = dom.add_namespace("urn:x");
        let x = dom.add_prefix("x");
        let empty = dom.empty_prefix();
        let name = dom.add_name_ns("a", ns);
        let tag = dom.new_tag(name);
        let mut prefixes = Prefixes::new();
        prefixes.insert(x, ns);
        prefixes.insert(empty, ns);
        let mut scope = PrefixScope::new(&dom);
        scope.push(tag, &prefixes);
        assert_eq!(
            scope.resolve_element(name),
            Resolution::Unprefixed {
                declaration: Some(tag)
            }
        );
        assert_eq!(
            scope.resolve_attribute(name),
            Resolution::Prefixed {
                prefix: PrefixRef::Id(x),
                owner: Some(tag)
            }
        );
    }

    #[test]
    fn test_closest_declaration_wins() {
        let mut dom = Domesque::new();
        let ns = dom.add_namespace("urn:x");
        let outer_prefix = dom.add_prefix("a");
        let inner_prefix = dom.add_prefix("b");
        let name = dom.add_name_ns("e", ns);
        let outer = dom.new_tag(name);
        let inner = dom.new_tag(name);
        let mut outer_prefixes = Prefixes::new();
        outer_prefixes.insert(outer_prefix, ns);
        let mut inner_prefixes = Prefixes::new();
        inner_prefixes.insert(inner_prefix, ns);
        let mut scope = PrefixScope::new(&dom);
        scope.push(outer, &outer_prefixes);
        scope.push(inner, &inner_prefixes);
        assert_eq!(scope.qname(name, scope.resolve_element(name)), "b:e");
        scope.pop();
        assert_eq!(scope.qname(name, scope.resolve_element(name)), "a:e");
        scope.pop();
        assert_eq!(scope.resolve_element(name), Resolution::Missing(ns));
    }

    #[test]
    fn test_generated_prefix_skips_bound() {
        let mut dom = Domesque::new();
        let ns = dom.add_namespace("urn:x");
        let other = dom.add_namespace("urn:other");
        let ns0 = dom.add_prefix("ns0");
        let name = dom.add_name_ns("attr", ns);
        let tag_name = dom.add_name("e");
        let tag = dom.new_tag(tag_name);
        let mut prefixes = Prefixes::new();
        prefixes.insert(ns0, other);
        let mut scope = PrefixScope::new(&dom);
        scope.push(tag, &prefixes);
        let prefix = scope.declare_missing(tag, name, true, None);
        assert_eq!(scope.prefix_str(prefix), "ns1");
        assert_eq!(scope.qname(name, scope.resolve_attribute(name)), "ns1:attr");
    }
}
