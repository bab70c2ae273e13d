//! Shared test fixtures: the literal inputs from §8's end-to-end scenarios (S1-S7), built with
//! the public model/change constructors so every test file works from the same ground truth.

#![allow(dead_code)]

use schemaplan_core::{
    Change, ChangeOp, Column, DataType, ForeignKey, ForeignKeyAction, Ident, PrimaryKey, Schema,
    SchemaKey, Table, TableKey,
};

pub fn schema_key(name: &str) -> SchemaKey {
    SchemaKey::new(name)
}

pub fn pk(table: &Table, column: &str) -> PrimaryKey {
    use schemaplan_core::{Index, IndexPart, IndexPartTarget, SortDirection};
    Index {
        name: Ident::unquoted(format!("{}_pkey", table.name.value)),
        unique: true,
        parts: vec![IndexPart {
            target: IndexPartTarget::Column(Ident::unquoted(column)),
            direction: SortDirection::Asc,
            seq: 0,
        }],
        predicate: None,
        include: Vec::new(),
        index_type: None,
    }
}

fn int_column(name: &str) -> Column {
    Column::new(name, DataType::Integer)
}

fn foreign_key(symbol: &str, column: &str, referenced_table: &TableKey, referenced_column: &str) -> ForeignKey {
    ForeignKey {
        symbol: Ident::unquoted(symbol),
        columns: vec![Ident::unquoted(column)],
        referenced_table: referenced_table.clone(),
        referenced_columns: vec![Ident::unquoted(referenced_column)],
        on_delete: Some(ForeignKeyAction::NoAction),
        on_update: Some(ForeignKeyAction::NoAction),
    }
}

/// S1/S2/S3: `users(id, workplace_id, spouse_id)` and `workplaces(id, owner_id)` with a mutual
/// foreign-key cycle between the two tables, plus a self-reference on `users.spouse_id`.
pub struct CyclicSchema {
    pub schema: SchemaKey,
    pub users: Table,
    pub workplaces: Table,
}

pub fn cyclic_schema() -> CyclicSchema {
    let schema = schema_key("public");

    let mut workplaces = Table::new(schema.clone(), "workplaces");
    workplaces.columns.push(int_column("id"));
    workplaces.columns.push(int_column("owner_id"));
    workplaces.primary_key = Some(pk(&workplaces, "id"));

    let mut users = Table::new(schema.clone(), "users");
    users.columns.push(int_column("id"));
    users.columns.push(int_column("workplace_id"));
    users.columns.push(int_column("spouse_id"));
    users.primary_key = Some(pk(&users, "id"));

    let users_key = users.key();
    let workplaces_key = workplaces.key();

    workplaces
        .foreign_keys
        .push(foreign_key("workplaces_owner_fk", "owner_id", &users_key, "id"));
    users
        .foreign_keys
        .push(foreign_key("users_workplace_fk", "workplace_id", &workplaces_key, "id"));
    users
        .foreign_keys
        .push(foreign_key("users_spouse_fk", "spouse_id", &users_key, "id"));

    CyclicSchema {
        schema,
        users,
        workplaces,
    }
}

impl CyclicSchema {
    pub fn add_workplaces(&self) -> Change {
        Change::new(ChangeOp::AddTable(self.workplaces.clone()))
    }

    pub fn add_users(&self) -> Change {
        Change::new(ChangeOp::AddTable(self.users.clone()))
    }

    pub fn drop_workplaces(&self) -> Change {
        Change::new(ChangeOp::DropTable(Box::new(self.workplaces.clone())))
    }

    pub fn drop_users(&self) -> Change {
        Change::new(ChangeOp::DropTable(Box::new(self.users.clone())))
    }

    /// S3: a `ModifyTable(users, [DropForeignKey(workplace)])` change already present in the
    /// input, ahead of the detacher deciding it needs one.
    pub fn modify_users_drop_workplace_fk(&self) -> Change {
        let fk = self
            .users
            .foreign_keys
            .iter()
            .find(|fk| fk.symbol.value == "users_workplace_fk")
            .cloned()
            .expect("fixture defines users_workplace_fk");
        Change::new(ChangeOp::ModifyTable(
            self.users.key(),
            vec![Change::new(ChangeOp::DropForeignKey {
                table: self.users.key(),
                fk,
            })],
        ))
    }
}

/// S6: function `f1` depends on table `t1`; trigger `tr1` on `t1` depends on `f1`.
pub struct TriggerFunctionSchema {
    pub schema: SchemaKey,
    pub t1: Table,
    pub f1: schemaplan_core::Func,
    pub tr1: schemaplan_core::Trigger,
}

pub fn trigger_function_schema() -> TriggerFunctionSchema {
    use schemaplan_core::{ObjectKey, TriggerHost};

    let schema = schema_key("public");
    let mut t1 = Table::new(schema.clone(), "t1");
    t1.columns.push(int_column("id"));
    t1.primary_key = Some(pk(&t1, "id"));

    let f1 = schemaplan_core::Func {
        schema: schema.clone(),
        name: Ident::unquoted("f1"),
        args: Vec::new(),
        returns: Some(DataType::Boolean),
        body: format!("select count(*) > 0 from {}", t1.name.value),
        deps: Vec::new(),
    };

    let tr1 = schemaplan_core::Trigger {
        name: Ident::unquoted("tr1"),
        host: TriggerHost::Table(t1.key()),
        function: Some(f1.key()),
        body: String::from("execute function f1()"),
        deps: vec![ObjectKey::Schema(schema.clone(), Ident::unquoted("f1"))],
    };

    TriggerFunctionSchema { schema, t1, f1, tr1 }
}

/// S7: a minimal realm with one schema, `"test"`, carrying no explicit attributes (the dev
/// database is expected to report back `charset = utf8mb4` once normalized).
pub fn minimal_test_realm() -> schemaplan_core::Realm {
    let mut realm = schemaplan_core::Realm::new();
    realm.schemas.push(Schema::new("test"));
    realm
}
