use crate::{
    Ident,
    model::{
        key::SchemaKey,
        object::Object,
        routine::{Func, Proc},
        table::Table,
        view::View,
    },
};

/// Realm-level (schema-less) or schema-scoped attributes such as collation/charset (§3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    pub collation: Option<String>,
    pub charset: Option<String>,
}

/// `Schema` owns ordered sets of `Table`, `View`, `Func`, `Proc`, and `Object` (§3). Children
/// carry their own `schema: SchemaKey` back-reference rather than a pointer to this struct, so
/// `Schema` can be freely cloned/moved without invalidating them (§9 "arena-like stores").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub name: Ident,
    pub attrs: Attributes,
    pub tables: Vec<Table>,
    pub views: Vec<View>,
    pub funcs: Vec<Func>,
    pub procs: Vec<Proc>,
    pub objects: Vec<Object>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Ident::unquoted(name),
            attrs: Attributes::default(),
            tables: Vec::new(),
            views: Vec::new(),
            funcs: Vec::new(),
            procs: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn key(&self) -> SchemaKey {
        SchemaKey(self.name.clone())
    }

    pub fn table(&self, name: &Ident) -> Option<&Table> {
        self.tables.iter().find(|t| &t.name == name)
    }

    pub fn view(&self, name: &Ident) -> Option<&View> {
        self.views.iter().find(|v| &v.name == name)
    }

    /// I4: `T.schema == self.key()` for every `T` in `self.tables` (and similarly for every
    /// other owned child). Re-asserted after structural rewrites by [`crate::Realm::relink`].
    pub fn assert_children_linked(&self) -> bool {
        let key = self.key();
        self.tables.iter().all(|t| t.schema == key)
            && self.views.iter().all(|v| v.schema == key)
            && self.funcs.iter().all(|f| f.schema == key)
            && self.procs.iter().all(|p| p.schema == key)
    }
}
