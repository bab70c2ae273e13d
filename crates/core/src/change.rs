//! C2: the Change Algebra (§4.1). A change-set is an ordered sequence of [`Change`] values; each
//! wraps a tagged [`ChangeOp`] plus any [`Clause`]s. Changes are data-only — the planner (C3/C4),
//! validator (C5), and apply pipeline (C6) supply all behavior over them.

use crate::model::{
    Check, Column, Func, ForeignKey, Index, Object, ObjectKey, Proc, Schema, SchemaKey, Table,
    TableKey, Trigger, TriggerHost, View,
};
use crate::Ident;

/// Structural clause attached to a change (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    IfExists,
    IfNotExists,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub op: ChangeOp,
    pub clauses: Vec<Clause>,
}

impl Change {
    pub fn new(op: ChangeOp) -> Self {
        Self {
            op,
            clauses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn has_clause(&self, clause: Clause) -> bool {
        self.clauses.contains(&clause)
    }
}

/// Drop variants that participate in §4.3/§4.4 dependency rules carry the full entity being
/// removed (its last-known shape), not just its key — the rules need to inspect, e.g., a dropped
/// table's foreign keys to know what else must drop first. Variants the rules never inspect
/// (`DropCheck`, `DropTrigger`, `DropSchema`) stay identity-only.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOp {
    AddSchema(Schema),
    DropSchema(SchemaKey),
    ModifySchema(SchemaKey, Vec<Change>),

    AddTable(Table),
    DropTable(Box<Table>),
    ModifyTable(TableKey, Vec<Change>),
    RenameTable { from: TableKey, to: TableKey },

    AddColumn { table: TableKey, column: Box<Column> },
    DropColumn { table: TableKey, column: Box<Column> },
    ModifyColumn { table: TableKey, from: Box<Column>, to: Box<Column> },

    AddIndex { table: TableKey, index: Index },
    DropIndex { table: TableKey, index: Index },
    ModifyIndex { table: TableKey, from: Index, to: Index },

    AddForeignKey { table: TableKey, fk: ForeignKey },
    DropForeignKey { table: TableKey, fk: ForeignKey },
    ModifyForeignKey { table: TableKey, from: ForeignKey, to: ForeignKey },

    AddCheck { table: TableKey, check: Check },
    DropCheck { table: TableKey, name: Ident },

    AddView(View),
    DropView(View),
    ModifyView(TableKey, Vec<Change>),

    AddFunc(Func),
    DropFunc(Func),
    ModifyFunc(TableKey, Vec<Change>),

    AddProc(Proc),
    DropProc(Proc),
    ModifyProc(TableKey, Vec<Change>),

    AddTrigger(Trigger),
    DropTrigger { host: TriggerHost, name: Ident },
    ModifyTrigger(Trigger),

    AddObject(Object),
    DropObject(ObjectKey),
    ModifyObject { from: Object, to: Object },
}

impl ChangeOp {
    /// The schema this change touches, if any — used by the Scope Validator (§4.2).
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Self::AddSchema(schema) => Some(schema.name.value.as_str()),
            Self::DropSchema(key) | Self::ModifySchema(key, _) => Some(key.name()),
            Self::AddTable(table) => Some(table.schema.name()),
            Self::DropTable(table) => Some(table.schema.name()),
            Self::ModifyTable(key, _) => key.schema_key_str(),
            Self::RenameTable { to, .. } => to.schema_key_str(),
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::ModifyColumn { table, .. }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. }
            | Self::ModifyIndex { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. }
            | Self::ModifyForeignKey { table, .. }
            | Self::AddCheck { table, .. }
            | Self::DropCheck { table, .. } => table.schema_key_str(),
            Self::AddView(view) => Some(view.schema.name()),
            Self::DropView(view) => Some(view.schema.name()),
            Self::ModifyView(key, _) => key.schema_key_str(),
            Self::AddFunc(func) => Some(func.schema.name()),
            Self::DropFunc(func) => Some(func.schema.name()),
            Self::ModifyFunc(key, _) => key.schema_key_str(),
            Self::AddProc(proc) => Some(proc.schema.name()),
            Self::DropProc(proc) => Some(proc.schema.name()),
            Self::ModifyProc(key, _) => key.schema_key_str(),
            Self::AddTrigger(trigger) => trigger.host.key().schema_key_str(),
            Self::DropTrigger { host, .. } => host.key().schema_key_str(),
            Self::ModifyTrigger(trigger) => trigger.host.key().schema_key_str(),
            Self::AddObject(object) | Self::ModifyObject { to: object, .. } => {
                object_schema_name(&object.key)
            }
            Self::DropObject(key) => object_schema_name(key),
        }
    }

    /// `true` for the `Drop*` family (§4.3 Step A bucket (ii)).
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            Self::DropSchema(_)
                | Self::DropTable(_)
                | Self::DropFunc(_)
                | Self::DropProc(_)
                | Self::DropObject(_)
        )
    }

    /// `true` for the view family (§4.3 Step A bucket (i)).
    pub fn is_view(&self) -> bool {
        matches!(self, Self::AddView(_) | Self::DropView(_) | Self::ModifyView(_, _))
    }

    /// The `TableKey` this change is scoped to, for the table/column/index/FK/check family and
    /// for view/func/proc (which share the `TableKey` namespace via their own `.key()`).
    pub fn table_key(&self) -> Option<TableKey> {
        match self {
            Self::AddTable(table) => Some(table.key()),
            Self::DropTable(table) => Some(table.key()),
            Self::ModifyTable(key, _) => Some(key.clone()),
            Self::RenameTable { to, .. } => Some(to.clone()),
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::ModifyColumn { table, .. }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. }
            | Self::ModifyIndex { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. }
            | Self::ModifyForeignKey { table, .. }
            | Self::AddCheck { table, .. }
            | Self::DropCheck { table, .. } => Some(table.clone()),
            Self::AddView(view) => Some(view.key()),
            Self::DropView(view) => Some(view.key()),
            Self::ModifyView(key, _) => Some(key.clone()),
            Self::AddFunc(func) => Some(func.key()),
            Self::DropFunc(func) => Some(func.key()),
            Self::ModifyFunc(key, _) => Some(key.clone()),
            Self::AddProc(proc) => Some(proc.key()),
            Self::DropProc(proc) => Some(proc.key()),
            Self::ModifyProc(key, _) => Some(key.clone()),
            _ => None,
        }
    }

    /// Schema names reachable through this change's `deps: Vec<ObjectKey>` (§4.2: "column types
    /// that embed opaque enum types referencing a schema count the enum's schema as used").
    /// `Realm`-scoped deps carry no schema name and are skipped. Only populated for the variants
    /// that carry a full entity (its `deps` are only known at `Add`/`Drop` time, not from a bare
    /// `TableKey` in a `Modify*` change).
    pub fn dep_schema_names(&self) -> Vec<&str> {
        let deps: &[ObjectKey] = match self {
            Self::AddTable(table) => &table.deps,
            Self::DropTable(table) => &table.deps,
            Self::AddView(view) => &view.deps,
            Self::DropView(view) => &view.deps,
            Self::AddFunc(func) => &func.deps,
            Self::DropFunc(func) => &func.deps,
            Self::AddProc(proc) => &proc.deps,
            Self::DropProc(proc) => &proc.deps,
            _ => &[],
        };
        deps.iter().filter_map(object_schema_name).collect()
    }

    /// Foreign keys this change adds/drops/modifies at the table level, with the action that
    /// applies to each — the raw material for the FK Detacher's adjacency map (§4.4 Step 1).
    pub fn foreign_key_edges(&self) -> Vec<ForeignKeyEdge<'_>> {
        match self {
            Self::AddTable(table) => table
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeyEdge::Add(fk))
                .collect(),
            Self::DropTable(table) => table
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeyEdge::Drop(fk))
                .collect(),
            Self::ModifyTable(_, sub) => sub
                .iter()
                .filter_map(|change| match &change.op {
                    Self::AddForeignKey { fk, .. } => Some(ForeignKeyEdge::Add(fk)),
                    Self::DropForeignKey { fk, .. } => Some(ForeignKeyEdge::Drop(fk)),
                    Self::ModifyForeignKey { to, .. } => Some(ForeignKeyEdge::Add(to)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One foreign-key-level edge contributed by a table-level change (§4.4 Step 1).
#[derive(Debug, Clone, Copy)]
pub enum ForeignKeyEdge<'a> {
    Add(&'a ForeignKey),
    Drop(&'a ForeignKey),
}

impl ForeignKeyEdge<'_> {
    pub fn foreign_key(&self) -> &ForeignKey {
        match self {
            Self::Add(fk) | Self::Drop(fk) => fk,
        }
    }
}

fn object_schema_name(key: &ObjectKey) -> Option<&str> {
    match key {
        ObjectKey::Realm(_) => None,
        ObjectKey::Schema(schema, _) => Some(schema.name()),
    }
}

impl crate::model::TableKey {
    fn schema_key_str(&self) -> Option<&str> {
        self.name().schema.as_ref().map(|ident| ident.value.as_str())
    }
}

/// A first-class wrapper around `Vec<Change>`: the unit passed between the Sorter (C3), Detacher
/// (C4), and Validator (C5), named instead of threading a bare `Vec` through every signature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(pub Vec<Change>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_changes(changes: impl IntoIterator<Item = Change>) -> Self {
        Self(changes.into_iter().collect())
    }

    pub fn push(&mut self, change: Change) {
        self.0.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Change> {
        self.0
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = Change>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
