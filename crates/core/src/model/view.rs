use crate::{
    Ident,
    model::key::{ObjectKey, SchemaKey, TableKey},
};

/// A `View` mirrors `Table`'s ownership shape (§3): a defining query instead of a column/index
/// body, optional triggers, and the same `Deps` list used by the Dependency Sorter (§4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub schema: SchemaKey,
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: String,
    pub triggers: Vec<super::routine::Trigger>,
    pub deps: Vec<ObjectKey>,
}

impl View {
    pub fn new(schema: SchemaKey, name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            schema,
            name: Ident::unquoted(name),
            columns: Vec::new(),
            query: query.into(),
            triggers: Vec::new(),
            deps: Vec::new(),
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, self.name.value.clone())
    }
}
