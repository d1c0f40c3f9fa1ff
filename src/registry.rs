//! Per-build object registry keyed on (domain, kind, qualified name).

use std::collections::BTreeMap;

use crate::domain::Domain;
use crate::types::{ObjectKind, SourceLocation};

/// Registry key: one declared object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Domain the directive belongs to.
    pub domain: Domain,
    /// Kind of object.
    pub kind: ObjectKind,
    /// Canonical (qualified) name.
    pub name: String,
}

/// Maps each declared object to where it was declared. Lives for one build.
/// Duplicates are advisory: the later declaration always wins.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    /// Declarations in key order.
    objects: BTreeMap<ObjectKey, SourceLocation>,
}

impl ObjectRegistry {
    /// Iterate declarations in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&ObjectKey, &SourceLocation)> {
        return self.objects.iter();
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        return self.objects.is_empty();
    }

    /// Number of distinct objects registered.
    pub fn len(&self) -> usize {
        return self.objects.len();
    }

    /// Where an object was last declared.
    pub fn lookup(&self, domain: Domain, kind: ObjectKind, name: &str) -> Option<&SourceLocation> {
        let key = ObjectKey { domain, kind, name: name.to_string() };
        return self.objects.get(&key);
    }

    /// Record a declaration. Returns the earlier location when the key was
    /// already present; the new location replaces it either way.
    pub fn register(
        &mut self,
        domain: Domain,
        kind: ObjectKind,
        name: &str,
        location: SourceLocation,
    ) -> Option<SourceLocation> {
        let key = ObjectKey { domain, kind, name: name.to_string() };
        return self.objects.insert(key, location);
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn at(document: &str, line: u32) -> SourceLocation {
        return SourceLocation { document: PathBuf::from(document), line };
    }

    #[test]
    fn first_declaration_has_no_previous() {
        let mut registry = ObjectRegistry::default();
        assert!(registry.is_empty());
        let previous = registry.register(Domain::Go, ObjectKind::Function, "http.Get", at("a.rst", 3));
        assert_eq!(previous, None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_reports_first_and_keeps_second() {
        let mut registry = ObjectRegistry::default();
        registry.register(Domain::Go, ObjectKind::Function, "http.Get", at("a.rst", 3));
        let previous = registry.register(Domain::Go, ObjectKind::Function, "http.Get", at("b.rst", 7));
        assert_eq!(previous, Some(at("a.rst", 3)));
        assert_eq!(registry.lookup(Domain::Go, ObjectKind::Function, "http.Get"), Some(&at("b.rst", 7)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_name_in_other_kind_or_domain_is_distinct() {
        let mut registry = ObjectRegistry::default();
        registry.register(Domain::Go, ObjectKind::Function, "Open", at("a.rst", 1));
        assert_eq!(registry.register(Domain::Go, ObjectKind::Type, "Open", at("a.rst", 2)), None);
        assert_eq!(registry.register(Domain::Rust, ObjectKind::Function, "Open", at("a.rst", 3)), None);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup(Domain::C, ObjectKind::Function, "Open"), None);
    }
}
