use ahash::HashMap;

/// Conversion between a dense index and a typed id.
pub(crate) trait IdIndex: Copy {
    fn to_id(index: usize) -> Self;
    fn from_id(self) -> usize;
}

/// Interning table: every distinct value gets a stable, small id.
///
/// Values are never removed, so an id stays valid for the lifetime of the
/// table.
pub(crate) struct IdMap<K: IdIndex, V: Eq + std::hash::Hash + Clone> {
    by_id: Vec<V>,
    by_value: HashMap<V, K>,
}

impl<K: IdIndex, V: Eq + std::hash::Hash + Clone> IdMap<K, V> {
    pub(crate) fn new() -> Self {
        IdMap {
            by_id: Vec::new(),
            by_value: HashMap::default(),
        }
    }

    /// Look up the id of a value without interning it.
    pub(crate) fn get_id(&self, value: &V) -> Option<K> {
        self.by_value.get(value).copied()
    }

    /// Look up the id of a value, interning it if it is new.
    pub(crate) fn get_id_mut(&mut self, value: V) -> K {
        if let Some(id) = self.by_value.get(&value) {
            return *id;
        }
        let id = K::to_id(self.by_id.len());
        self.by_value.insert(value.clone(), id);
        self.by_id.push(value);
        id
    }

    #[inline]
    pub(crate) fn get_value(&self, id: K) -> &V {
        &self.by_id[id.from_id()]
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    struct Id(u32);

    impl IdIndex for Id {
        fn to_id(index: usize) -> Id {
            Id(index as u32)
        }

        fn from_id(self) -> usize {
            self.0 as usize
        }
    }

    #[test]
    fn test_interning_is_stable() {
        let mut map = IdMap::<Id, String>::new();
        let foo = map.get_id_mut("foo".to_string());
        let bar = map.get_id_mut("bar".to_string());
        assert_eq!(map.get_id_mut("foo".to_string()), foo);
        assert_ne!(foo, bar);
        assert_eq!(map.get_value(bar), "bar");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let mut map = IdMap::<Id, String>::new();
        assert_eq!(map.get_id(&"foo".to_string()), None);
        assert_eq!(map.len(), 0);
        let foo = map.get_id_mut("foo".to_string());
        assert_eq!(map.get_id(&"foo".to_string()), Some(foo));
    }
}
