//! §4.8's in-memory reference driver: holds a [`Realm`] as its "database" and implements the
//! [`Driver`] contract by mutating that realm directly. It exists purely to exercise the Driver
//! Contract (§4.7) and the Dev-DB Normalizer (§4.6) end-to-end without a real database; it is not
//! a dialect and must not accrete dialect-specific SQL.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use schemaplan_core::{
    Attributes, Change, ChangeOp, ChangeSet, Driver, DriverError, Ident, InspectFilter,
    NotCleanError, Object, Plan, PlanOptions, Realm, RestoreHandle, Statement, StatementExecutor,
};

#[derive(Debug)]
pub struct MemoryDriver {
    realm: Arc<Mutex<Realm>>,
    pub executed: Vec<String>,
    pub restore_calls: Arc<AtomicUsize>,
    /// When set, `execute` fails on the call at this 0-indexed position instead of applying it,
    /// to exercise the Apply Pipeline's partial-failure accounting (P5).
    pub fail_at: Option<usize>,
    /// When set, the next `snapshot`'s restore closure returns an error instead of restoring.
    pub fail_restore: bool,
    calls: usize,
}

impl MemoryDriver {
    pub fn new(realm: Realm) -> Self {
        Self {
            realm: Arc::new(Mutex::new(realm)),
            executed: Vec::new(),
            restore_calls: Arc::new(AtomicUsize::new(0)),
            fail_at: None,
            fail_restore: false,
            calls: 0,
        }
    }

    pub fn realm(&self) -> Realm {
        self.realm.lock().unwrap().clone()
    }
}

impl StatementExecutor for MemoryDriver {
    fn execute(&mut self, statement: &Statement) -> Result<(), schemaplan_core::BoxedError> {
        let index = self.calls;
        self.calls += 1;
        if Some(index) == self.fail_at {
            return Err(Box::new(DriverError {
                dialect: "memory".to_string(),
                source: format!("simulated failure executing `{}`", statement.cmd).into(),
            }));
        }
        self.executed.push(statement.cmd.clone());
        if let Some(change) = &statement.source {
            let mut realm = self.realm.lock().unwrap();
            apply_change(&mut realm, change)
                .map_err(|err| Box::new(err) as schemaplan_core::BoxedError)?;
        }
        Ok(())
    }
}

impl Driver for MemoryDriver {
    fn introspect(&self, filter: &InspectFilter) -> schemaplan_core::Result<Realm> {
        let realm = self.realm.lock().unwrap();
        if filter.schemas.is_empty() {
            Ok(realm.clone())
        } else {
            Ok(realm.filtered_to(&filter.schemas))
        }
    }

    fn diff(&self, current: &Realm, desired: &Realm) -> schemaplan_core::Result<ChangeSet> {
        let mut changes = Vec::new();
        for schema in &desired.schemas {
            if current.schema(&schema.name).is_none() {
                changes.push(Change::new(ChangeOp::AddSchema(schema.clone())));
            }
        }
        for schema in &current.schemas {
            if desired.schema(&schema.name).is_none() {
                changes.push(Change::new(ChangeOp::DropSchema(schema.key())));
            }
        }
        Ok(ChangeSet::from_changes(changes))
    }

    fn plan_changes(&self, changes: ChangeSet, _options: &PlanOptions) -> schemaplan_core::Result<Plan> {
        let statements = changes
            .into_inner()
            .into_iter()
            .map(|change| {
                let cmd = describe(&change.op);
                let reverse = reverse_of(&change.op);
                let statement = Statement::new(cmd).with_source(change);
                match reverse {
                    Some(reverse) => statement.with_reverse(reverse),
                    None => statement,
                }
            })
            .collect();
        Ok(Plan::new("memory", statements))
    }

    fn snapshot(&mut self) -> schemaplan_core::Result<RestoreHandle> {
        let saved = self.realm();
        let cell = self.realm.clone();
        let calls = self.restore_calls.clone();
        let fail = self.fail_restore;
        self.fail_restore = false;
        Ok(RestoreHandle::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                return Err(NotCleanError {
                    reason: "simulated restore failure".to_string(),
                }
                .into());
            }
            *cell.lock().unwrap() = saved;
            Ok(())
        }))
    }

    fn check_clean(&self) -> schemaplan_core::Result<()> {
        let realm = self.realm.lock().unwrap();
        if realm.schemas.is_empty() && realm.objects.is_empty() {
            Ok(())
        } else {
            Err(NotCleanError {
                reason: realm
                    .schemas
                    .first()
                    .map(|schema| schema.name.value.clone())
                    .unwrap_or_else(|| "<objects>".to_string()),
            }
            .into())
        }
    }
}

fn describe(op: &ChangeOp) -> String {
    match op {
        ChangeOp::AddSchema(schema) => format!("ADD SCHEMA {}", schema.name.value),
        ChangeOp::DropSchema(key) => format!("DROP SCHEMA {}", key.name()),
        ChangeOp::ModifySchema(key, _) => format!("MODIFY SCHEMA {}", key.name()),
        ChangeOp::AddTable(table) => format!("ADD TABLE {}", table.name.value),
        ChangeOp::DropTable(table) => format!("DROP TABLE {}", table.name.value),
        ChangeOp::ModifyTable(key, sub) => {
            format!("MODIFY TABLE {} ({} changes)", key.name().name.value, sub.len())
        }
        ChangeOp::RenameTable { from, to } => {
            format!("RENAME TABLE {} TO {}", from.name().name.value, to.name().name.value)
        }
        ChangeOp::AddColumn { table, column } => {
            format!("ADD COLUMN {}.{}", table.name().name.value, column.name.value)
        }
        ChangeOp::DropColumn { table, column } => {
            format!("DROP COLUMN {}.{}", table.name().name.value, column.name.value)
        }
        ChangeOp::ModifyColumn { table, to, .. } => {
            format!("MODIFY COLUMN {}.{}", table.name().name.value, to.name.value)
        }
        ChangeOp::AddIndex { table, index } => {
            format!("ADD INDEX {} ON {}", index.name.value, table.name().name.value)
        }
        ChangeOp::DropIndex { table, index } => {
            format!("DROP INDEX {} ON {}", index.name.value, table.name().name.value)
        }
        ChangeOp::ModifyIndex { table, to, .. } => {
            format!("MODIFY INDEX {} ON {}", to.name.value, table.name().name.value)
        }
        ChangeOp::AddForeignKey { table, fk } => {
            format!("ADD FOREIGN KEY {} ON {}", fk.symbol.value, table.name().name.value)
        }
        ChangeOp::DropForeignKey { table, fk } => {
            format!("DROP FOREIGN KEY {} ON {}", fk.symbol.value, table.name().name.value)
        }
        ChangeOp::ModifyForeignKey { table, to, .. } => {
            format!("MODIFY FOREIGN KEY {} ON {}", to.symbol.value, table.name().name.value)
        }
        ChangeOp::AddCheck { table, check } => format!(
            "ADD CHECK {} ON {}",
            check.name.as_ref().map_or("<unnamed>", |n| n.value.as_str()),
            table.name().name.value
        ),
        ChangeOp::DropCheck { table, name } => {
            format!("DROP CHECK {} ON {}", name.value, table.name().name.value)
        }
        ChangeOp::AddView(view) => format!("ADD VIEW {}", view.name.value),
        ChangeOp::DropView(view) => format!("DROP VIEW {}", view.name.value),
        ChangeOp::ModifyView(key, _) => format!("MODIFY VIEW {}", key.name().name.value),
        ChangeOp::AddFunc(func) => format!("ADD FUNCTION {}", func.name.value),
        ChangeOp::DropFunc(func) => format!("DROP FUNCTION {}", func.name.value),
        ChangeOp::ModifyFunc(key, _) => format!("MODIFY FUNCTION {}", key.name().name.value),
        ChangeOp::AddProc(proc) => format!("ADD PROCEDURE {}", proc.name.value),
        ChangeOp::DropProc(proc) => format!("DROP PROCEDURE {}", proc.name.value),
        ChangeOp::ModifyProc(key, _) => format!("MODIFY PROCEDURE {}", key.name().name.value),
        ChangeOp::AddTrigger(trigger) => format!("ADD TRIGGER {}", trigger.name.value),
        ChangeOp::DropTrigger { name, .. } => format!("DROP TRIGGER {}", name.value),
        ChangeOp::ModifyTrigger(trigger) => format!("MODIFY TRIGGER {}", trigger.name.value),
        ChangeOp::AddObject(object) => format!("ADD OBJECT {}", object.key.name().value),
        ChangeOp::DropObject(key) => format!("DROP OBJECT {}", key.name().value),
        ChangeOp::ModifyObject { to, .. } => format!("MODIFY OBJECT {}", to.key.name().value),
    }
}

fn reverse_of(op: &ChangeOp) -> Option<String> {
    match op {
        ChangeOp::AddSchema(schema) => Some(format!("DROP SCHEMA {}", schema.name.value)),
        ChangeOp::DropSchema(key) => Some(format!("ADD SCHEMA {}", key.name())),
        ChangeOp::AddTable(table) => Some(format!("DROP TABLE {}", table.name.value)),
        ChangeOp::DropTable(table) => Some(format!("ADD TABLE {}", table.name.value)),
        ChangeOp::AddForeignKey { table, fk } => {
            Some(format!("DROP FOREIGN KEY {} ON {}", fk.symbol.value, table.name().name.value))
        }
        ChangeOp::DropForeignKey { table, fk } => {
            Some(format!("ADD FOREIGN KEY {} ON {}", fk.symbol.value, table.name().name.value))
        }
        ChangeOp::AddColumn { table, column } => Some(format!(
            "DROP COLUMN {}.{}",
            table.name().name.value,
            column.name.value
        )),
        ChangeOp::DropColumn { table, column } => Some(format!(
            "ADD COLUMN {}.{}",
            table.name().name.value,
            column.name.value
        )),
        ChangeOp::AddView(view) => Some(format!("DROP VIEW {}", view.name.value)),
        ChangeOp::DropView(view) => Some(format!("ADD VIEW {}", view.name.value)),
        ChangeOp::AddFunc(func) => Some(format!("DROP FUNCTION {}", func.name.value)),
        ChangeOp::AddProc(proc) => Some(format!("DROP PROCEDURE {}", proc.name.value)),
        ChangeOp::AddObject(object) => Some(format!("DROP OBJECT {}", object.key.name().value)),
        ChangeOp::AddTrigger(trigger) => Some(format!("DROP TRIGGER {}", trigger.name.value)),
        // ModifyTable/View/Func/Proc carry sub-changes the reference driver does not recurse
        // into for reversal; a real dialect emits per-statement reverses for each sub-change.
        _ => None,
    }
}

/// Mutates `realm` to reflect `change`, simulating what a real dialect's executed SQL would do.
/// Deliberately minimal: covers exactly the variants the normalize/apply test scenarios exercise.
fn apply_change(realm: &mut Realm, change: &Change) -> schemaplan_core::Result<()> {
    match &change.op {
        ChangeOp::AddSchema(schema) => {
            if realm.schema(&schema.name).is_none() {
                let mut schema = schema.clone();
                // Simulates a real server assigning a default charset a user-authored schema
                // left unset, which is exactly what Dev-DB Normalization (§4.6) exists to surface.
                if schema.attrs.charset.is_none() {
                    schema.attrs.charset = Some("utf8mb4".to_string());
                }
                realm.schemas.push(schema);
            }
        }
        ChangeOp::DropSchema(key) => {
            realm.schemas.retain(|schema| schema.key() != *key);
        }
        ChangeOp::AddTable(table) => {
            if let Some(schema) = realm.schema_mut(&table.schema.0.clone()) {
                schema.tables.push(table.clone());
            }
        }
        ChangeOp::DropTable(table) => {
            if let Some(schema) = realm.schema_mut(&table.schema.0.clone()) {
                schema.tables.retain(|t| t.name != table.name);
            }
        }
        ChangeOp::ModifyTable(key, sub) => {
            let schema_ident = key.name().schema.clone().unwrap_or_else(|| Ident::unquoted(""));
            if let Some(schema) = realm.schema_mut(&schema_ident) {
                if let Some(table) = schema.tables.iter_mut().find(|t| t.name == key.name().name) {
                    for inner in sub {
                        apply_table_sub_change(table, &inner.op);
                    }
                }
            }
        }
        ChangeOp::AddView(view) => {
            if let Some(schema) = realm.schema_mut(&view.schema.0.clone()) {
                schema.views.push(view.clone());
            }
        }
        ChangeOp::DropView(view) => {
            if let Some(schema) = realm.schema_mut(&view.schema.0.clone()) {
                schema.views.retain(|v| v.name != view.name);
            }
        }
        ChangeOp::AddFunc(func) => {
            if let Some(schema) = realm.schema_mut(&func.schema.0.clone()) {
                schema.funcs.push(func.clone());
            }
        }
        ChangeOp::AddProc(proc) => {
            if let Some(schema) = realm.schema_mut(&proc.schema.0.clone()) {
                schema.procs.push(proc.clone());
            }
        }
        ChangeOp::AddObject(object) => {
            add_object(realm, object.clone());
        }
        ChangeOp::DropObject(key) => {
            drop_object(realm, key);
        }
        // Triggers, checks, indexes and renames are host-attribute concerns a real dialect
        // tracks on the table/view itself; the reference driver records that the statement ran
        // without modeling their effect, since no test scenario inspects them.
        _ => {}
    }
    Ok(())
}

fn apply_table_sub_change(table: &mut schemaplan_core::Table, op: &ChangeOp) {
    match op {
        ChangeOp::AddColumn { column, .. } => table.columns.push((**column).clone()),
        ChangeOp::DropColumn { column, .. } => table.columns.retain(|c| c.name != column.name),
        ChangeOp::AddForeignKey { fk, .. } => table.foreign_keys.push(fk.clone()),
        ChangeOp::DropForeignKey { fk, .. } => {
            table.foreign_keys.retain(|existing| existing.symbol != fk.symbol);
        }
        ChangeOp::AddIndex { index, .. } => table.indexes.push(index.clone()),
        ChangeOp::DropIndex { index, .. } => table.indexes.retain(|i| i.name != index.name),
        _ => {}
    }
}

fn add_object(realm: &mut Realm, object: Object) {
    match &object.key {
        schemaplan_core::ObjectKey::Realm(_) => realm.objects.push(object),
        schemaplan_core::ObjectKey::Schema(schema_key, _) => {
            if let Some(schema) = realm.schema_mut(&schema_key.0.clone()) {
                schema.objects.push(object);
            }
        }
    }
}

fn drop_object(realm: &mut Realm, key: &schemaplan_core::ObjectKey) {
    match key {
        schemaplan_core::ObjectKey::Realm(name) => {
            realm.objects.retain(|o| o.key.name() != name);
        }
        schemaplan_core::ObjectKey::Schema(schema_key, name) => {
            if let Some(schema) = realm.schema_mut(&schema_key.0.clone()) {
                schema.objects.retain(|o| o.key.name() != name);
            }
        }
    }
}

/// Builds an [`Attributes`] with only `charset` set, for assembling expected-realm fixtures in
/// the normalize test.
pub fn attrs_with_charset(charset: &str) -> Attributes {
    Attributes {
        collation: None,
        charset: Some(charset.to_string()),
    }
}
