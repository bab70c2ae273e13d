use crate::{
    DataType, Ident,
    model::key::{ObjectKey, SchemaKey, TableKey},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Ident,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub schema: SchemaKey,
    pub name: Ident,
    pub args: Vec<Argument>,
    pub returns: Option<DataType>,
    pub body: String,
    pub deps: Vec<ObjectKey>,
}

impl Func {
    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, self.name.value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Proc {
    pub schema: SchemaKey,
    pub name: Ident,
    pub args: Vec<Argument>,
    pub body: String,
    pub deps: Vec<ObjectKey>,
}

impl Proc {
    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, self.name.value.clone())
    }
}

/// A trigger's host is the table or view it fires on (§4.3: "AddTrigger{T} depends on
/// AddTable/AddView of T's host").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerHost {
    Table(TableKey),
    View(TableKey),
}

impl TriggerHost {
    pub fn key(&self) -> &TableKey {
        match self {
            Self::Table(key) | Self::View(key) => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub name: Ident,
    pub host: TriggerHost,
    /// The function this trigger invokes, if the dialect represents triggers that way
    /// (`EXECUTE FUNCTION ...`). Distinct from `deps`: this is a named reference the Dependency
    /// Sorter orders against directly (§4.3: "AddTrigger{T} ... AddFunc in its Deps"), not an
    /// opaque object.
    pub function: Option<TableKey>,
    pub body: String,
    pub deps: Vec<ObjectKey>,
}
