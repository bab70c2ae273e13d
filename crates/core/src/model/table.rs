use crate::{
    Expr, Ident, ValidationError,
    model::key::{ObjectKey, TableKey},
    types::DataType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub schema: crate::model::key::SchemaKey,
    pub name: Ident,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<Check>,
    pub triggers: Vec<super::routine::Trigger>,
    /// Opaque objects (user types, sequences, ...) this table depends on (§3 "Deps").
    pub deps: Vec<ObjectKey>,
}

impl Table {
    pub fn new(schema: crate::model::key::SchemaKey, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: Ident::unquoted(name),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            triggers: Vec::new(),
            deps: Vec::new(),
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, self.name.value.clone())
    }

    /// I1: every column is unique by name within the table.
    pub fn add_column(&mut self, column: Column) -> crate::Result<()> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(ValidationError::DuplicateColumn {
                table: self.key().name().clone(),
                column: column.name,
            }
            .into());
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &Ident) -> Option<&Column> {
        self.columns.iter().find(|c| &c.name == name)
    }

    /// Indexes this column participates in, resolved through the arena rather than a stored
    /// back-reference (§9 "Design Notes").
    pub fn indexes_for_column<'a>(&'a self, name: &'a Ident) -> impl Iterator<Item = &'a Index> {
        self.indexes
            .iter()
            .filter(move |index| index.parts.iter().any(|p| p.references_column(name)))
    }

    /// Foreign keys this column participates in, resolved through the arena.
    pub fn foreign_keys_for_column<'a>(
        &'a self,
        name: &'a Ident,
    ) -> impl Iterator<Item = &'a ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.columns.contains(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Ident,
    pub column_type: ColumnType,
    pub default: Option<Expr>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    pub auto_increment: bool,
    pub generated: Option<Expr>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Ident::unquoted(name),
            column_type: ColumnType {
                nullable: true,
                data_type,
            },
            default: None,
            collation: None,
            comment: None,
            auto_increment: false,
            generated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnType {
    pub nullable: bool,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: Ident,
    pub unique: bool,
    pub parts: Vec<IndexPart>,
    pub predicate: Option<Expr>,
    pub include: Vec<Ident>,
    pub index_type: Option<String>,
}

/// I3: a `PrimaryKey` is a unique `Index`.
pub type PrimaryKey = Index;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexPart {
    pub target: IndexPartTarget,
    pub direction: SortDirection,
    /// Ordinal position within the index; also recoverable from `Vec` order, kept explicit
    /// because the source DDL may declare parts out of textual order.
    pub seq: u32,
}

impl IndexPart {
    fn references_column(&self, name: &Ident) -> bool {
        matches!(&self.target, IndexPartTarget::Column(column) if column == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexPartTarget {
    Column(Ident),
    Expression(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub symbol: Ident,
    pub columns: Vec<Ident>,
    pub referenced_table: TableKey,
    pub referenced_columns: Vec<Ident>,
    pub on_delete: Option<ForeignKeyAction>,
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKey {
    /// I2 / §4.4 `checkFK`: well-formed iff it has a non-empty, equal-length pair of column
    /// lists on both ends. The child table is implicit (the `Table` that owns this `ForeignKey`
    /// in its `foreign_keys` list), so the caller supplies it for the error message.
    pub fn validate(&self, child_table: &TableKey) -> crate::Result<()> {
        let mut missing = Vec::new();
        if self.columns.is_empty() {
            missing.push("child columns");
        }
        if self.referenced_columns.is_empty() {
            missing.push("parent columns");
        }
        if !missing.is_empty() || self.columns.len() != self.referenced_columns.len() {
            return Err(ValidationError::MalformedForeignKey {
                symbol: self.symbol.clone(),
                table: child_table.name().clone(),
                missing: if missing.is_empty() {
                    vec!["matching column counts"]
                } else {
                    missing
                }
                .into_iter()
                .map(str::to_string)
                .collect(),
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub name: Option<Ident>,
    pub expr: Expr,
}
