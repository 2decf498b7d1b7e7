use std::collections::HashMap;

use treetype::ConversionTree;

use crate::error::DefinitionError;

/// User-defined type aliases, name to compiled schema.
///
/// Names that collide with a built-in atom are stored but never consulted:
/// the built-in always wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomTable {
    types: HashMap<String, ConversionTree>,
}

impl AtomTable {
    pub fn new() -> Self {
        AtomTable::default()
    }

    /// Compile every `(name, description)` pair. Each definition is lexed and
    /// parsed on its own; the first one that fails is reported by name.
    pub fn compile<I, K, V>(definitions: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut table = AtomTable::new();
        for (name, description) in definitions {
            let name = name.into();
            match treetype::compile(description.as_ref()) {
                Ok(schema) => table.insert(name, schema),
                Err(error) => return Err(DefinitionError::in_atom(name, error)),
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: ConversionTree) {
        self.types.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&ConversionTree> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, ConversionTree)> for AtomTable {
    fn from_iter<I: IntoIterator<Item = (K, ConversionTree)>>(iter: I) -> Self {
        let mut table = AtomTable::new();
        for (name, schema) in iter {
            table.insert(name, schema);
        }
        table
    }
}
