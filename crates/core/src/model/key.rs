//! Stable identity keys for the schema arena (§3.1 / §9 "Design Notes").
//!
//! Entities never hold owning pointers or `Rc`/`Weak` cycles back to their parent; they hold a
//! `{schema, table, column}`-shaped key instead. Every key is `Ord` so dependency graphs built
//! over `BTreeMap`/`BTreeSet` iterate in a deterministic, lexicographic order (the `by_keys`
//! discipline described in §9 "Determinism").

use crate::{Ident, QualifiedName};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaKey(pub Ident);

impl SchemaKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Ident::unquoted(name))
    }

    pub fn name(&self) -> &str {
        &self.0.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey(pub QualifiedName);

impl TableKey {
    pub fn new(schema: &SchemaKey, table: impl Into<String>) -> Self {
        Self(QualifiedName {
            schema: Some(schema.0.clone()),
            name: Ident::unquoted(table),
        })
    }

    pub fn from_qualified(name: QualifiedName) -> Self {
        Self(name)
    }

    pub fn schema_key(&self) -> Option<SchemaKey> {
        self.0.schema.clone().map(SchemaKey)
    }

    pub fn name(&self) -> &QualifiedName {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub table: TableKey,
    pub column: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey {
    pub table: TableKey,
    pub index: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForeignKeyKey {
    pub table: TableKey,
    pub symbol: Ident,
}

/// Identity of an opaque [`crate::Object`] (§3 "Object"): either realm-scoped or attached to a
/// schema. `Object`s may be shared across schemas via `Deps`; this key always names the owning
/// schema (the first schema that declared it), never a borrowing reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKey {
    Realm(Ident),
    Schema(SchemaKey, Ident),
}

impl ObjectKey {
    pub fn name(&self) -> &Ident {
        match self {
            Self::Realm(name) | Self::Schema(_, name) => name,
        }
    }
}
