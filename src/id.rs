// persistent ids for names, namespaces and prefixes
use crate::idmap::{IdIndex, IdMap};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Ord, PartialOrd)]
        pub struct $name(u32);

        impl IdIndex for $name {
            fn to_id(index: usize) -> Self {
                $name(index as u32)
            }

            fn from_id(self) -> usize {
                self.0 as usize
            }
        }
    };
}

id_type!(
    /// Id of an expanded name: a local name in a namespace.
    ///
    /// Two tags with the same `NameId` have the same `{uri}local` identity,
    /// whatever prefix they are serialized with.
    NameId
);

id_type!(
    /// Id of a namespace URI. The empty URI stands for "no namespace".
    NamespaceId
);

id_type!(
    /// Id of a prefix. The empty prefix is the default namespace prefix.
    PrefixId
);

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct Name {
    pub(crate) local: String,
    pub(crate) namespace_id: NamespaceId,
}

impl Name {
    pub(crate) fn new<S: Into<String>>(local: S, namespace_id: NamespaceId) -> Self {
        Self {
            local: local.into(),
            namespace_id,
        }
    }
}

pub(crate) type NameLookup = IdMap<NameId, Name>;
pub(crate) type NamespaceLookup = IdMap<NamespaceId, String>;
pub(crate) type PrefixLookup = IdMap<PrefixId, String>;
