//! Persistent collection of IR definitions.
//!
//! A [`CompilerContext`] is a value: every "mutation" returns a new context
//! and leaves the receiver untouched. Definitions live behind an `Arc`, so
//! cloning a context is cheap and unchanged contexts share storage.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ir::{Definition, Fragment, Operation};
use crate::schema::Schema;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct CompilerContext {
    base_schema: Arc<Schema>,
    schema: Arc<Schema>,
    definitions: Arc<IndexMap<String, Definition>>,
}

impl CompilerContext {
    /// Empty context for a (server schema, extended schema) pair.
    pub fn new(base_schema: Arc<Schema>, schema: Arc<Schema>) -> Self {
        Self {
            base_schema,
            schema,
            definitions: Arc::new(IndexMap::new()),
        }
    }

    /// The schema without client extensions.
    pub fn base_schema(&self) -> &Schema {
        &self.base_schema
    }

    /// The extended schema definitions were lowered against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.get(name).and_then(Definition::as_fragment)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.get(name).and_then(Definition::as_operation)
    }

    /// Definitions in insertion order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// A new context that also holds `definition`. Names must be unique.
    pub fn add(&self, definition: Definition) -> Result<Self> {
        self.add_all([definition])
    }

    /// A new context that also holds every definition in `definitions`.
    pub fn add_all(&self, definitions: impl IntoIterator<Item = Definition>) -> Result<Self> {
        let mut map = IndexMap::clone(&self.definitions);
        for definition in definitions {
            let name = definition.name().to_string();
            if map.contains_key(&name) {
                return Err(Error::Transform {
                    pipeline: "context".to_string(),
                    step: "add".to_string(),
                    message: format!("duplicate definition `{name}`"),
                });
            }
            map.insert(name, definition);
        }
        Ok(self.with_map(map))
    }

    /// A new context where each definition is replaced by what `f` returns for
    /// it. `None` drops the definition.
    pub fn map<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&CompilerContext, &Definition) -> Result<Option<Definition>>,
    {
        let mut map = IndexMap::with_capacity(self.definitions.len());
        for definition in self.definitions.values() {
            if let Some(next) = f(self, definition)? {
                map.insert(next.name().to_string(), next);
            }
        }
        Ok(self.with_map(map))
    }

    /// A new context without the named definitions.
    pub fn without<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let mut map = IndexMap::clone(&self.definitions);
        for name in names {
            map.shift_remove(name);
        }
        self.with_map(map)
    }

    /// Whether two contexts share definition storage.
    pub fn shares_storage_with(&self, other: &CompilerContext) -> bool {
        Arc::ptr_eq(&self.definitions, &other.definitions)
    }

    fn with_map(&self, map: IndexMap<String, Definition>) -> Self {
        Self {
            base_schema: Arc::clone(&self.base_schema),
            schema: Arc::clone(&self.schema),
            definitions: Arc::new(map),
        }
    }
}
