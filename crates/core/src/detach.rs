//! C4: the FK Detacher (§4.4, `DetachCycles`).
//!
//! When two tables mutually reference each other neither can be fully created (or dropped)
//! before the other; this pass rewrites the change-set so the foreign keys causing the cycle are
//! created/dropped out-of-line, in a deferred follow-up change.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::change::{Change, ChangeOp, ChangeSet, Clause};
use crate::model::{ForeignKey, Table, TableKey};

/// Runs §4.4 Steps 1-3 over `set`. Non-table-level changes pass through untouched, emitted
/// before the (possibly rewritten) table-level changes; the Dependency Sorter (C3) is expected to
/// run again afterward to interleave them correctly — this pass only resolves table-to-table
/// cycles, it does not attempt a full sort.
pub fn detach_cycles(set: ChangeSet) -> crate::Result<ChangeSet> {
    let changes = set.into_inner();
    let (table_level, other): (Vec<Change>, Vec<Change>) = changes
        .into_iter()
        .partition(|change| is_table_level(&change.op));

    for change in &table_level {
        validate_foreign_keys(&change.op)?;
    }

    let dropped: BTreeSet<TableKey> = table_level
        .iter()
        .filter_map(|change| match &change.op {
            ChangeOp::DropTable(table) => Some(table.key()),
            _ => None,
        })
        .collect();

    let graph = build_adjacency(&table_level, &dropped);

    let rewritten = if has_cycle(&graph) {
        debug!(
            tables = ?graph.keys().collect::<Vec<_>>(),
            "foreign-key cycle detected, detaching out-of-line"
        );
        rewrite_cycle(table_level)
    } else {
        stable_sort_by_index(table_level, &graph)
    };

    Ok(ChangeSet::from_changes(other.into_iter().chain(rewritten)))
}

fn is_table_level(op: &ChangeOp) -> bool {
    matches!(op, ChangeOp::AddTable(_) | ChangeOp::DropTable(_) | ChangeOp::ModifyTable(_, _))
}

fn validate_foreign_keys(op: &ChangeOp) -> crate::Result<()> {
    match op {
        ChangeOp::AddTable(table) => {
            for fk in &table.foreign_keys {
                fk.validate(&table.key())?;
            }
        }
        ChangeOp::DropTable(table) => {
            for fk in &table.foreign_keys {
                fk.validate(&table.key())?;
            }
        }
        ChangeOp::ModifyTable(key, sub) => {
            for change in sub {
                match &change.op {
                    ChangeOp::AddForeignKey { fk, .. }
                    | ChangeOp::DropForeignKey { fk, .. } => fk.validate(key)?,
                    ChangeOp::ModifyForeignKey { to, .. } => to.validate(key)?,
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Step 1: `deps[name] = [parent-tables]` — the set of tables `name` must be ordered after.
fn build_adjacency(
    table_level: &[Change],
    dropped: &BTreeSet<TableKey>,
) -> BTreeMap<TableKey, Vec<TableKey>> {
    let mut deps: BTreeMap<TableKey, Vec<TableKey>> = BTreeMap::new();
    for change in table_level {
        match &change.op {
            ChangeOp::AddTable(table) => {
                let key = table.key();
                deps.entry(key.clone()).or_default();
                for fk in &table.foreign_keys {
                    if fk.referenced_table != key {
                        deps.entry(key.clone()).or_default().push(fk.referenced_table.clone());
                    }
                }
            }
            ChangeOp::DropTable(table) => {
                let key = table.key();
                deps.entry(key.clone()).or_default();
                for fk in &table.foreign_keys {
                    if fk.referenced_table != key && dropped.contains(&fk.referenced_table) {
                        deps.entry(fk.referenced_table.clone()).or_default().push(key.clone());
                    }
                }
            }
            ChangeOp::ModifyTable(key, sub) => {
                deps.entry(key.clone()).or_default();
                for change in sub {
                    match &change.op {
                        ChangeOp::AddForeignKey { fk, .. } => {
                            if fk.referenced_table != *key {
                                deps.entry(key.clone()).or_default().push(fk.referenced_table.clone());
                            }
                        }
                        ChangeOp::ModifyForeignKey { to, .. } => {
                            if to.referenced_table != *key {
                                deps.entry(key.clone()).or_default().push(to.referenced_table.clone());
                            }
                        }
                        ChangeOp::DropForeignKey { fk, .. } => {
                            if fk.referenced_table != *key && dropped.contains(&fk.referenced_table) {
                                deps.entry(fk.referenced_table.clone()).or_default().push(key.clone());
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    deps
}

/// Step 2: DFS over `deps`; a node re-entered while still "in progress" means a cycle.
fn has_cycle(deps: &BTreeMap<TableKey, Vec<TableKey>>) -> bool {
    let mut visited: BTreeSet<TableKey> = BTreeSet::new();
    let mut in_progress: BTreeSet<TableKey> = BTreeSet::new();

    fn dfs(
        node: &TableKey,
        deps: &BTreeMap<TableKey, Vec<TableKey>>,
        visited: &mut BTreeSet<TableKey>,
        in_progress: &mut BTreeSet<TableKey>,
    ) -> bool {
        if visited.contains(node) {
            return false;
        }
        if in_progress.contains(node) {
            return true;
        }
        in_progress.insert(node.clone());
        let mut cyclic = false;
        if let Some(neighbors) = deps.get(node) {
            for neighbor in neighbors {
                if dfs(neighbor, deps, visited, in_progress) {
                    cyclic = true;
                    break;
                }
            }
        }
        in_progress.remove(node);
        visited.insert(node.clone());
        cyclic
    }

    for node in deps.keys() {
        if dfs(node, deps, &mut visited, &mut in_progress) {
            return true;
        }
    }
    false
}

/// Step 3a: no cycle — assign each table a DFS postorder finish index (dependencies finish
/// before dependents) and stable-sort the table-level changes by it.
fn stable_sort_by_index(
    table_level: Vec<Change>,
    deps: &BTreeMap<TableKey, Vec<TableKey>>,
) -> Vec<Change> {
    let mut index: BTreeMap<TableKey, usize> = BTreeMap::new();
    let mut next = 0usize;

    fn visit(
        node: &TableKey,
        deps: &BTreeMap<TableKey, Vec<TableKey>>,
        index: &mut BTreeMap<TableKey, usize>,
        next: &mut usize,
    ) {
        if index.contains_key(node) {
            return;
        }
        index.insert(node.clone(), usize::MAX);
        if let Some(neighbors) = deps.get(node) {
            for neighbor in neighbors {
                visit(neighbor, deps, index, next);
            }
        }
        index.insert(node.clone(), *next);
        *next += 1;
    }

    for node in deps.keys() {
        visit(node, deps, &mut index, &mut next);
    }

    let mut indexed: Vec<(usize, Change)> = table_level
        .into_iter()
        .map(|change| {
            let key = change.op.table_key().expect("table-level change has a table key");
            let idx = *index.get(&key).unwrap_or(&usize::MAX);
            (idx, change)
        })
        .collect();
    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, change)| change).collect()
}

/// Step 3b: rewrite to break the cycle. Every item contributes to one of two buckets, in
/// original order; the final change-set is `immediate ++ deferred`.
fn rewrite_cycle(table_level: Vec<Change>) -> Vec<Change> {
    let mut immediate = Vec::new();
    let mut deferred = Vec::new();

    for change in table_level {
        let clauses = change.clauses.clone();
        match change.op {
            ChangeOp::AddTable(table) => split_add_table(table, clauses, &mut immediate, &mut deferred),
            ChangeOp::DropTable(table) => {
                split_drop_table(*table, clauses, &mut immediate, &mut deferred);
            }
            ChangeOp::ModifyTable(key, sub) => {
                split_modify_table(key, sub, clauses, &mut immediate, &mut deferred);
            }
            other => immediate.push(Change { op: other, clauses }),
        }
    }

    immediate.into_iter().chain(deferred).collect()
}

fn split_add_table(
    table: Table,
    clauses: Vec<Clause>,
    immediate: &mut Vec<Change>,
    deferred: &mut Vec<Change>,
) {
    let key = table.key();
    let (self_ref, external): (Vec<ForeignKey>, Vec<ForeignKey>) = table
        .foreign_keys
        .into_iter()
        .partition(|fk| fk.referenced_table == key);

    if external.is_empty() {
        immediate.push(Change {
            op: ChangeOp::AddTable(Table {
                foreign_keys: self_ref,
                ..table
            }),
            clauses,
        });
        return;
    }

    immediate.push(Change {
        op: ChangeOp::AddTable(Table {
            foreign_keys: self_ref,
            ..table
        }),
        clauses,
    });
    let sub = external
        .into_iter()
        .map(|fk| Change::new(ChangeOp::AddForeignKey { table: key.clone(), fk }))
        .collect();
    deferred.push(Change::new(ChangeOp::ModifyTable(key, sub)));
}

fn split_drop_table(
    table: Table,
    clauses: Vec<Clause>,
    immediate: &mut Vec<Change>,
    deferred: &mut Vec<Change>,
) {
    let key = table.key();
    let (self_ref, external): (Vec<ForeignKey>, Vec<ForeignKey>) = table
        .foreign_keys
        .into_iter()
        .partition(|fk| fk.referenced_table == key);

    if external.is_empty() {
        deferred.push(Change {
            op: ChangeOp::DropTable(Box::new(Table {
                foreign_keys: self_ref,
                ..table
            })),
            clauses,
        });
        return;
    }

    let sub = external
        .into_iter()
        .map(|fk| Change::new(ChangeOp::DropForeignKey { table: key.clone(), fk }))
        .collect();
    immediate.push(Change::new(ChangeOp::ModifyTable(key, sub)));
    deferred.push(Change {
        op: ChangeOp::DropTable(Box::new(Table {
            foreign_keys: self_ref,
            ..table
        })),
        clauses,
    });
}

fn split_modify_table(
    key: TableKey,
    sub: Vec<Change>,
    clauses: Vec<Clause>,
    immediate: &mut Vec<Change>,
    deferred: &mut Vec<Change>,
) {
    let mut remaining = Vec::new();
    let mut peeled = Vec::new();

    for change in sub {
        match change.op {
            ChangeOp::AddForeignKey { table, fk } if fk.referenced_table != table => {
                peeled.push(Change::new(ChangeOp::AddForeignKey { table, fk }));
            }
            other => remaining.push(Change { op: other, clauses: change.clauses }),
        }
    }

    if !remaining.is_empty() {
        immediate.push(Change {
            op: ChangeOp::ModifyTable(key.clone(), remaining),
            clauses,
        });
    }
    if !peeled.is_empty() {
        deferred.push(Change::new(ChangeOp::ModifyTable(key, peeled)));
    }
}
