//! Named-object catalog.
//!
//! The host owns discovery of named assets and hands the console a flat
//! table of `(name, type lineage, handle)` entries. The console only reads
//! it: the object-reference converter and the matching hint branch look
//! names up here.

use std::any::Any;
use std::sync::Arc;

use crate::model::{ObjectRef, ObjectType};

/// One catalog entry.
#[derive(Clone)]
pub struct NamedObject {
    pub name: String,
    /// Type names this object is assignable to, most derived first.
    lineage: Vec<String>,
    handle: Arc<dyn Any + Send + Sync>,
}

impl NamedObject {
    pub fn new<T, I, S>(name: impl Into<String>, object: Arc<T>, lineage: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            lineage: lineage.into_iter().map(Into::into).collect(),
            handle: object,
        }
    }

    pub fn is_assignable_to(&self, ty: &ObjectType) -> bool {
        self.lineage.iter().any(|t| t == ty.name())
    }

    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    pub fn to_ref(&self) -> ObjectRef {
        ObjectRef::new(self.name.clone(), Arc::clone(&self.handle))
    }
}

impl std::fmt::Debug for NamedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedObject")
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    entries: Vec<NamedObject>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: NamedObject) {
        self.entries.push(object);
    }

    pub fn with(mut self, object: NamedObject) -> Self {
        self.push(object);
        self
    }

    /// Replace the whole table, as the host does when its asset set changes.
    pub fn replace(&mut self, entries: Vec<NamedObject>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[NamedObject] {
        &self.entries
    }

    /// Entries whose type lineage satisfies `ty`, in catalog order.
    pub fn assignable<'a>(&'a self, ty: &'a ObjectType) -> impl Iterator<Item = &'a NamedObject> + 'a {
        self.entries.iter().filter(move |e| e.is_assignable_to(ty))
    }

    /// First assignable entry whose name equals `name`, ignoring case.
    pub fn find<'a>(&'a self, ty: &'a ObjectType, name: &str) -> Option<&'a NamedObject> {
        self.assignable(ty)
            .find(|e| crate::input::tokenizer::eq_ignore_case(&e.name, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ObjectCatalog {
        ObjectCatalog::new()
            .with(NamedObject::new("Fire Sword", Arc::new(1u32), ["Weapon", "Item"]))
            .with(NamedObject::new("Iron Shield", Arc::new(2u32), ["Armor", "Item"]))
            .with(NamedObject::new("fire sword", Arc::new(3u32), ["Weapon", "Item"]))
    }

    #[test]
    fn filters_by_lineage() {
        let catalog = catalog();
        let weapon = ObjectType::new("Weapon");
        let names: Vec<_> = catalog.assignable(&weapon).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Fire Sword", "fire sword"]);
        assert_eq!(catalog.assignable(&ObjectType::new("Item")).count(), 3);
    }

    #[test]
    fn find_is_case_insensitive_and_first_match_wins() {
        let catalog = catalog();
        let item = ObjectType::new("Item");
        let found = catalog.find(&item, "FIRE SWORD");
        let handle = found.map(NamedObject::to_ref);
        assert_eq!(handle.as_ref().and_then(|r| r.downcast::<u32>()), Some(&1));
        assert!(catalog.find(&ObjectType::new("Armor"), "fire sword").is_none());
    }
}
