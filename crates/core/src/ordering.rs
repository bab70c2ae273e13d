//! C3: the Dependency Sorter (§4.3, `SortChanges`).
//!
//! A views/drops/others pre-partition ahead of the topological sort was considered and dropped:
//! it exists in older designs as a backwards-compatibility layer, not a correctness requirement,
//! and scenarios S1-S6 hold just as well under a pure `DependsOn` topological sort. [`sort_changes`]
//! runs Step B/C directly over the input order, with no pre-partition. See DESIGN.md for the
//! scenario check.

use std::collections::BTreeSet;

use crate::change::{Change, ChangeOp, ChangeSet, ForeignKeyEdge};
use crate::model::{Column, Object, ObjectKey, Table};
use crate::types::DataType;
use crate::Func;

/// General delegation (§4.3 Step B, "if a.object or b.object implements the Dispatch capability,
/// ask them first"): when `a` is an object-level change and its `Object` carries a dispatcher,
/// consult it before falling back to the built-in rules below. A `Some(true)` is authoritative; a
/// `Some(false)` or `None` still lets the built-in rules contribute additional edges.
fn dispatch_depends_on(a: &ChangeOp, b: &ChangeOp) -> Option<bool> {
    let object = object_of(a)?;
    let dispatch = object.dispatch.as_ref()?;
    let other_key = object_key_of(b)?;
    Some(dispatch.depends_on(&other_key))
}

fn object_of(op: &ChangeOp) -> Option<&Object> {
    match op {
        ChangeOp::AddObject(object) | ChangeOp::ModifyObject { to: object, .. } => Some(object),
        _ => None,
    }
}

fn object_key_of(op: &ChangeOp) -> Option<ObjectKey> {
    match op {
        ChangeOp::AddObject(object) | ChangeOp::ModifyObject { to: object, .. } => {
            Some(object.key.clone())
        }
        ChangeOp::DropObject(key) => Some(key.clone()),
        _ => None,
    }
}

/// Stable topological sort of `set` under the `DependsOn` relation (Step C). Safe to call on a
/// change-set that still has cross-table foreign-key cycles in it — the FK Detacher (C4) runs
/// after this and only needs a sort that respects whatever edges *are* acyclic; true cycles are
/// its job, not this one's (P3).
#[must_use]
pub fn sort_changes(set: ChangeSet) -> ChangeSet {
    let changes = set.into_inner();
    let n = changes.len();
    let mut visited = vec![false; n];
    let mut in_progress = vec![false; n];
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        visit(i, &changes, &mut visited, &mut in_progress, &mut out);
    }

    ChangeSet::from_changes(out)
}

fn visit(
    i: usize,
    changes: &[Change],
    visited: &mut [bool],
    in_progress: &mut [bool],
    out: &mut Vec<Change>,
) {
    if visited[i] {
        return;
    }
    if in_progress[i] {
        // A genuine cycle among table-level changes is expected input here; it is the FK
        // Detacher's job (C4) to rewrite it away. Treat a re-entrant node as already settled so
        // the DFS terminates; do not panic.
        return;
    }
    in_progress[i] = true;
    for j in 0..changes.len() {
        if j == i {
            continue;
        }
        if depends_on(&changes[i].op, &changes[j].op) {
            visit(j, changes, visited, in_progress, out);
        }
    }
    in_progress[i] = false;
    if !visited[i] {
        visited[i] = true;
        out.push(changes[i].clone());
    }
}

/// `true` iff `a` must be ordered after `b` (§4.3 Step B). Rules are independent of each other;
/// any one matching is sufficient ("first match wins" only matters when rules would otherwise
/// disagree, which these do not: each rule targets a disjoint pair of variants).
fn depends_on(a: &ChangeOp, b: &ChangeOp) -> bool {
    if let Some(answer) = dispatch_depends_on(a, b) {
        if answer {
            return true;
        }
    }
    additions_depend_on_creators(a, b)
        || recreation_semantics(a, b)
        || modification_presumes_creation(a, b)
        || drops_depend_on_consumers(a, b)
        || mutual_fk_between_modifications(a, b)
}

fn additions_depend_on_creators(a: &ChangeOp, b: &ChangeOp) -> bool {
    // AddTable{T}, ModifyTable{T} -> AddSchema{S=T.Schema}; AddObject{O} referenced by a
    // column type or T.Deps; AddForeignKey whose parent is a newly added Table -> that AddTable.
    match a {
        ChangeOp::AddTable(table) => {
            if depends_on_add_schema(b, table.schema.name()) {
                return true;
            }
            if let ChangeOp::AddObject(object) = b {
                if table_deps_on_object(table, &object.key) {
                    return true;
                }
            }
        }
        ChangeOp::AddView(view) => {
            if depends_on_add_schema(b, view.schema.name()) {
                return true;
            }
            if let ChangeOp::AddObject(object) = b {
                if view.deps.contains(&object.key) {
                    return true;
                }
            }
        }
        ChangeOp::AddFunc(func) => {
            if depends_on_add_schema(b, func.schema.name()) {
                return true;
            }
            if let ChangeOp::AddObject(object) = b {
                if func.deps.contains(&object.key) {
                    return true;
                }
            }
        }
        ChangeOp::AddProc(proc) => {
            if depends_on_add_schema(b, proc.schema.name()) {
                return true;
            }
            if let ChangeOp::AddObject(object) = b {
                if proc.deps.contains(&object.key) {
                    return true;
                }
            }
        }
        ChangeOp::AddTrigger(trigger) => {
            if let ChangeOp::AddTable(table) = b {
                if trigger.host.key() == &table.key() {
                    return true;
                }
            }
            if let ChangeOp::AddView(view) = b {
                if trigger.host.key() == &view.key() {
                    return true;
                }
            }
            if let ChangeOp::AddFunc(func) = b {
                if trigger.function.as_ref() == Some(&func.key()) {
                    return true;
                }
            }
        }
        _ => {}
    }

    // AddForeignKey whose parent is a newly-added table depends on that table's AddTable,
    // whether the FK arrives inline (part of AddTable's own column list) or via an explicit
    // AddForeignKey / ModifyTable change.
    if let ChangeOp::AddTable(parent) = b {
        let parent_key = parent.key();
        for edge in a.foreign_key_edges() {
            if let ForeignKeyEdge::Add(fk) = edge {
                if fk.referenced_table == parent_key && a.table_key().as_ref() != Some(&parent_key)
                {
                    return true;
                }
            }
        }
    }

    false
}

fn depends_on_add_schema(b: &ChangeOp, schema_name: &str) -> bool {
    matches!(b, ChangeOp::AddSchema(schema) if schema.name.value == schema_name)
}

fn table_deps_on_object(table: &Table, object: &ObjectKey) -> bool {
    if table.deps.contains(object) {
        return true;
    }
    table
        .columns
        .iter()
        .any(|column| column_references_object(column, object.name().value.as_str()))
}

fn column_references_object(column: &Column, name: &str) -> bool {
    data_type_references(&column.column_type.data_type, name)
}

/// Type-equality here is necessarily defensive (§9 "Polymorphic type equality"): `DataType`
/// only has one variant that can name an opaque object (`Custom`), so there is nothing to trap —
/// comparison is always a plain string match, never a partial or panicking one.
fn data_type_references(data_type: &DataType, name: &str) -> bool {
    match data_type {
        DataType::Custom(custom_name) => custom_name == name,
        DataType::Array(inner) => data_type_references(inner, name),
        _ => false,
    }
}

fn recreation_semantics(a: &ChangeOp, b: &ChangeOp) -> bool {
    match (a, b) {
        (ChangeOp::AddTable(table), ChangeOp::DropTable(dropped)) => table.key() == dropped.key(),
        (ChangeOp::AddView(view), ChangeOp::DropView(dropped)) => view.key() == dropped.key(),
        (ChangeOp::AddFunc(func), ChangeOp::DropFunc(dropped)) => func.key() == dropped.key(),
        (ChangeOp::AddProc(proc), ChangeOp::DropProc(dropped)) => proc.key() == dropped.key(),
        _ => false,
    }
}

fn modification_presumes_creation(a: &ChangeOp, b: &ChangeOp) -> bool {
    match (a, b) {
        (ChangeOp::ModifyTable(key, _), ChangeOp::AddTable(table)) => *key == table.key(),
        (ChangeOp::ModifyView(key, _), ChangeOp::AddView(view)) => *key == view.key(),
        (ChangeOp::ModifyFunc(key, _), ChangeOp::AddFunc(func)) => *key == func.key(),
        (ChangeOp::ModifyProc(key, _), ChangeOp::AddProc(proc)) => *key == proc.key(),
        _ => false,
    }
}

fn drops_depend_on_consumers(a: &ChangeOp, b: &ChangeOp) -> bool {
    match a {
        ChangeOp::DropSchema(schema_key) => {
            if let Some(dropped_schema) = b.schema_name() {
                if dropped_schema == schema_key.name()
                    && matches!(
                        b,
                        ChangeOp::DropFunc(_)
                            | ChangeOp::DropProc(_)
                            | ChangeOp::DropTable(_)
                            | ChangeOp::DropView(_)
                    )
                {
                    return true;
                }
            }
        }
        ChangeOp::DropTable(table) => {
            let key = table.key();
            match b {
                ChangeOp::DropTable(_) | ChangeOp::ModifyTable(_, _) => {
                    for edge in b.foreign_key_edges() {
                        if let ForeignKeyEdge::Drop(fk) = edge {
                            if fk.referenced_table == key {
                                return true;
                            }
                        }
                    }
                }
                ChangeOp::DropTrigger { host, .. } => {
                    if host.key() == &key {
                        return true;
                    }
                }
                _ => {}
            }
        }
        ChangeOp::DropObject(object_key) => {
            let name = object_key.name().value.as_str();
            match b {
                ChangeOp::DropTable(table) => {
                    if table
                        .columns
                        .iter()
                        .any(|column| column_references_object(column, name))
                    {
                        return true;
                    }
                }
                ChangeOp::ModifyTable(_, sub) => {
                    if sub.iter().any(|change| {
                        matches!(
                            &change.op,
                            ChangeOp::DropColumn { column, .. }
                                if column_references_object(column, name)
                        )
                    }) {
                        return true;
                    }
                }
                ChangeOp::DropFunc(func) => {
                    if routine_references(func, name) {
                        return true;
                    }
                }
                ChangeOp::DropProc(proc) => {
                    if proc
                        .args
                        .iter()
                        .any(|arg| data_type_references(&arg.data_type, name))
                    {
                        return true;
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
    false
}

fn routine_references(func: &Func, name: &str) -> bool {
    func.args
        .iter()
        .any(|arg| data_type_references(&arg.data_type, name))
        || func
            .returns
            .as_ref()
            .is_some_and(|returns| data_type_references(returns, name))
}

fn mutual_fk_between_modifications(a: &ChangeOp, b: &ChangeOp) -> bool {
    let (ChangeOp::ModifyTable(key_a, sub_a), ChangeOp::ModifyTable(key_b, sub_b)) = (a, b) else {
        return false;
    };
    if key_a == key_b {
        return false;
    }

    let added_in_b: BTreeSet<&str> = sub_b
        .iter()
        .filter_map(|change| match &change.op {
            ChangeOp::AddColumn { column, .. } => Some(column.name.value.as_str()),
            _ => None,
        })
        .collect();

    sub_a.iter().any(|change| match &change.op {
        ChangeOp::AddForeignKey { fk, .. } => {
            fk.referenced_table == *key_b
                && !fk.referenced_columns.is_empty()
                && fk
                    .referenced_columns
                    .iter()
                    .all(|column| added_in_b.contains(column.value.as_str()))
        }
        _ => false,
    })
}
