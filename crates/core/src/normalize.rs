//! C7: the Dev-DB Normalizer (§4.6, `DevDriver.NormalizeRealm` / `NormalizeSchema`).
//!
//! Canonicalizes a user-authored schema by applying it to a sandbox ("dev") database and reading
//! the result back, so callers get the database's own canonical form (case folding, default
//! expression reformatting, enum value ordering, ...) rather than whatever the author literally
//! wrote.

use tracing::warn;

use crate::change::{Change, ChangeOp, ChangeSet, Clause};
use crate::config::{Mode, PlanOptions};
use crate::driver::{Driver, InspectFilter, RestoreHandle};
use crate::error::NormalizeError;
use crate::model::{Realm, Schema};
use crate::{Ident, NotExistError};

/// §4.6 `NormalizeRealm(R)`.
pub fn normalize_realm(
    driver: &mut dyn Driver,
    realm: &Realm,
    options: &PlanOptions,
) -> crate::Result<Realm> {
    let restore = driver.snapshot()?;

    let outcome = (|| -> crate::Result<Realm> {
        let changes = synthesize_realm_changes(realm);
        let plan = driver.plan_changes(changes, options)?;
        driver.apply_changes(&plan)?;

        let schema_names: Vec<Ident> = realm.schemas.iter().map(|schema| schema.name.clone()).collect();
        driver.introspect(&InspectFilter {
            schemas: schema_names,
            tables_only: false,
        })
    })();

    finish_with_restore(outcome, restore)
}

/// §4.6 `NormalizeSchema(S)`: same pattern restricted to a single schema, plus the re-parenting
/// and attribute-preservation steps (a)-(g). `dev_schema` names the schema inside the sandbox
/// the driver designates to host the normalization (a driver/dialect concern — e.g. `"public"`
/// for PostgreSQL, the connection's default schema for MySQL).
pub fn normalize_schema(
    driver: &mut dyn Driver,
    schema: &Schema,
    dev_schema: &Ident,
    options: &PlanOptions,
) -> crate::Result<Schema> {
    let restore = driver.snapshot()?;
    let filter = InspectFilter {
        schemas: vec![dev_schema.clone()],
        tables_only: false,
    };

    let outcome = (|| -> crate::Result<Schema> {
        // (a) capture the dev schema's natural name/attributes.
        let dev_realm = driver.introspect(&filter)?;
        let dev_natural = dev_realm.schema(dev_schema).cloned().ok_or_else(|| NotExistError {
            schema: dev_schema.value.clone(),
        })?;

        // (b)-(d): re-parent every Table/View/Object/Func/Proc onto the dev schema's key, and
        // prepend an attribute sync if the caller's attrs differ from what the dev schema has.
        // `Realm::relink` does the actual re-parenting (including Object keys and any `deps`
        // entries that pointed at an object that moved along with its owner) so a lone schema is
        // wrapped in a throwaway realm just to reuse it.
        let mut reparented = schema.clone();
        reparented.name = dev_natural.name.clone();
        let mut wrapper = Realm {
            attrs: crate::Attributes::default(),
            schemas: vec![reparented],
            objects: Vec::new(),
        };
        wrapper.relink();
        let reparented = wrapper.schemas.into_iter().next().expect("relink preserves one schema");
        debug_assert!(reparented.assert_children_linked());

        let mut changes = Vec::new();
        if reparented.attrs != dev_natural.attrs {
            changes.push(
                Change::new(ChangeOp::AddSchema(Schema {
                    attrs: reparented.attrs.clone(),
                    ..dev_natural.clone()
                }))
                .with_clause(Clause::IfNotExists),
            );
        }
        changes.extend(schema_body_changes(&reparented));

        // (e) apply with plan-mode = in-place and schema-qualifier = empty.
        let in_place = PlanOptions {
            schema_qualifier: Some(String::new()),
            mode: Mode::InPlace,
            ..options.clone()
        };
        let plan = driver.plan_changes(ChangeSet::from_changes(changes), &in_place)?;
        driver.apply_changes(&plan)?;

        // (f) re-inspect.
        let reinspected = driver.introspect(&filter)?;
        let mut result = reinspected.schema(dev_schema).cloned().ok_or_else(|| NotExistError {
            schema: dev_schema.value.clone(),
        })?;

        // (g) preserve the original schema name; restore the user's attrs by replace-or-append.
        result.name = schema.name.clone();
        merge_attributes(&mut result, schema);

        Ok(result)
    })();

    finish_with_restore(outcome, restore)
}

fn synthesize_realm_changes(realm: &Realm) -> ChangeSet {
    let mut changes = Vec::new();
    for object in &realm.objects {
        changes.push(Change::new(ChangeOp::AddObject(object.clone())).with_clause(Clause::IfNotExists));
    }
    for schema in &realm.schemas {
        changes.push(
            Change::new(ChangeOp::AddSchema(schema.clone())).with_clause(Clause::IfNotExists),
        );
        changes.extend(schema_body_changes(schema));
    }
    ChangeSet::from_changes(changes)
}

/// Tables (with their triggers), views (with their triggers), objects, funcs, and procs of a
/// schema, each as an `Add*` change — shared by realm- and schema-scoped synthesis (§4.6 step 2).
fn schema_body_changes(schema: &Schema) -> Vec<Change> {
    let mut changes = Vec::new();
    for table in &schema.tables {
        changes.push(Change::new(ChangeOp::AddTable(table.clone())));
        for trigger in &table.triggers {
            changes.push(Change::new(ChangeOp::AddTrigger(trigger.clone())));
        }
    }
    for view in &schema.views {
        changes.push(Change::new(ChangeOp::AddView(view.clone())));
        for trigger in &view.triggers {
            changes.push(Change::new(ChangeOp::AddTrigger(trigger.clone())));
        }
    }
    for object in &schema.objects {
        changes.push(Change::new(ChangeOp::AddObject(object.clone())));
    }
    for func in &schema.funcs {
        changes.push(Change::new(ChangeOp::AddFunc(func.clone())));
    }
    for proc in &schema.procs {
        changes.push(Change::new(ChangeOp::AddProc(proc.clone())));
    }
    changes
}

/// §4.6 step (g): "replace-or-append by attribute identity" — the user's original attrs win
/// whenever they were set; anything the dev database introspected that the user never set is
/// preserved as-is.
fn merge_attributes(result: &mut Schema, original: &Schema) {
    if original.attrs.collation.is_some() {
        result.attrs.collation = original.attrs.collation.clone();
    }
    if original.attrs.charset.is_some() {
        result.attrs.charset = original.attrs.charset.clone();
    }
}

/// Step 5/6: restore the dev database on every exit path; combine the apply/restore outcomes
/// under §7's precedence rule (P6).
fn finish_with_restore<T>(outcome: crate::Result<T>, restore: RestoreHandle) -> crate::Result<T> {
    match (outcome, restore.restore()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(restore_err)) => {
            warn!(error = %restore_err, "dev database restore failed");
            Err(NormalizeError::RestoreFailed {
                source: Box::new(restore_err),
            }
            .into())
        }
        (Err(apply_err), Ok(())) => Err(apply_err),
        (Err(apply_err), Err(restore_err)) => {
            warn!(error = %restore_err, "dev database restore failed after apply also failed");
            Err(NormalizeError::ApplyFailed {
                apply: Box::new(apply_err),
                restore: Box::new(restore_err),
            }
            .into())
        }
    }
}
