//! Builder that enforces the directory invariants: unique child names,
//! canonical (locale-insensitive, i.e. plain codepoint order rather than
//! locale-aware collation — the same on every machine) ordering by name.

use smol_str::SmolStr;

use crate::{CodecError, ContentKey, DictNode};

/// Incrementally builds a [`DictNode`], rejecting duplicate names.
#[derive(Debug, Default)]
pub struct DictBuilder {
    entries: Vec<(SmolStr, ContentKey)>,
}

impl From<DictNode> for DictBuilder {
    /// Resume building from an already-canonical directory, e.g. to apply
    /// a single insert/remove without re-validating the rest.
    fn from(dict: DictNode) -> Self {
        Self {
            entries: dict.names.into_iter().zip(dict.child_keys).collect(),
        }
    }
}

impl DictBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one child, failing if the name is already present.
    pub fn insert(mut self, name: SmolStr, key: ContentKey) -> Result<Self, CodecError> {
        if self.entries.iter().any(|(n, _)| n == &name) {
            return Err(CodecError::DuplicateName(name.to_string()));
        }
        self.entries.push((name, key));
        Ok(self)
    }

    /// Insert many children at once; `names` and `child_keys` must have
    /// equal length.
    pub fn extend(
        mut self,
        names: Vec<SmolStr>,
        child_keys: Vec<ContentKey>,
    ) -> Result<Self, CodecError> {
        if names.len() != child_keys.len() {
            return Err(CodecError::LengthMismatch {
                names: names.len(),
                keys: child_keys.len(),
            });
        }
        for (name, key) in names.into_iter().zip(child_keys) {
            self = self.insert(name, key)?;
        }
        Ok(self)
    }

    /// Remove a child by name, if present.
    pub fn remove(mut self, name: &str) -> Self {
        self.entries.retain(|(n, _)| n.as_str() != name);
        self
    }

    /// Replace or insert a child's key.
    pub fn upsert(mut self, name: SmolStr, key: ContentKey) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| n == &name) {
            slot.1 = key;
        } else {
            self.entries.push((name, key));
        }
        self
    }

    /// Finalize into a [`DictNode`] with children sorted into canonical order.
    pub fn build(mut self) -> DictNode {
        self.entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        let (names, child_keys) = self.entries.into_iter().unzip();
        DictNode { names, child_keys }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let key = ContentKey::of(b"x");
        let builder = DictBuilder::new().insert(SmolStr::new("a"), key).unwrap();
        assert!(matches!(
            builder.insert(SmolStr::new("a"), key),
            Err(CodecError::DuplicateName(_))
        ));
    }

    #[test]
    fn build_sorts_by_name() {
        let k = ContentKey::of(b"x");
        let dict = DictBuilder::new()
            .insert(SmolStr::new("zebra"), k)
            .unwrap()
            .insert(SmolStr::new("apple"), k)
            .unwrap()
            .build();
        assert_eq!(dict.names(), &[SmolStr::new("apple"), SmolStr::new("zebra")]);
    }

    #[test]
    fn upsert_replaces_existing() {
        let k1 = ContentKey::of(b"1");
        let k2 = ContentKey::of(b"2");
        let dict = DictBuilder::new()
            .insert(SmolStr::new("a"), k1)
            .unwrap()
            .upsert(SmolStr::new("a"), k2)
            .build();
        assert_eq!(dict.get("a"), Some(k2));
        assert_eq!(dict.len(), 1);
    }
}
