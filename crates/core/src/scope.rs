//! C5: the Scope Validator (§4.2, `CheckChangesScope`).

use std::collections::BTreeSet;

use crate::change::{ChangeOp, ChangeSet};
use crate::config::{Mode, PlanOptions};
use crate::ValidationError;

/// `true` iff `changes` is compatible with the scope declared in `options` (P1).
pub fn check_changes_scope(options: &PlanOptions, changes: &ChangeSet) -> crate::Result<()> {
    let Some(qualifier) = options.schema_qualifier.as_deref() else {
        // Realm scope: any change allowed.
        return Ok(());
    };

    if qualifier.is_empty() {
        for change in changes {
            if is_schema_level(&change.op) {
                return Err(ValidationError::ScopeViolation {
                    variant: variant_name(&change.op).to_string(),
                }
                .into());
            }
        }

        let mut names: BTreeSet<&str> = BTreeSet::new();
        for change in changes {
            if let Some(name) = change.op.schema_name() {
                if !name.is_empty() {
                    names.insert(name);
                }
            }
            for name in change.op.dep_schema_names() {
                if !name.is_empty() {
                    names.insert(name);
                }
            }
        }
        if names.len() > 1 {
            return Err(ValidationError::MultipleSchemasInScope {
                schemas: names.into_iter().map(str::to_string).collect(),
            }
            .into());
        }
        return Ok(());
    }

    for change in changes {
        match &change.op {
            ChangeOp::AddSchema(schema) if schema.name.value != qualifier => {
                return Err(ValidationError::ScopeViolation {
                    variant: variant_name(&change.op).to_string(),
                }
                .into());
            }
            ChangeOp::DropSchema(key) if key.name() != qualifier => {
                return Err(ValidationError::ScopeViolation {
                    variant: variant_name(&change.op).to_string(),
                }
                .into());
            }
            ChangeOp::ModifySchema(key, _) if key.name() != qualifier => {
                return Err(ValidationError::ScopeViolation {
                    variant: variant_name(&change.op).to_string(),
                }
                .into());
            }
            ChangeOp::ModifySchema(_, _) if options.mode != Mode::InPlace => {
                return Err(ValidationError::ScopeViolation {
                    variant: variant_name(&change.op).to_string(),
                }
                .into());
            }
            other => {
                if let Some(name) = other.schema_name() {
                    if !name.is_empty() && name != qualifier {
                        return Err(ValidationError::ScopeViolation {
                            variant: variant_name(other).to_string(),
                        }
                        .into());
                    }
                }
                for name in other.dep_schema_names() {
                    if !name.is_empty() && name != qualifier {
                        return Err(ValidationError::ScopeViolation {
                            variant: variant_name(other).to_string(),
                        }
                        .into());
                    }
                }
            }
        }
    }

    Ok(())
}

fn is_schema_level(op: &ChangeOp) -> bool {
    matches!(
        op,
        ChangeOp::AddSchema(_) | ChangeOp::DropSchema(_) | ChangeOp::ModifySchema(_, _)
    )
}

/// Names the offending variant the way a reflection-based type name would render it
/// (`*schema.AddSchema`), the literal, asserted error prefix callers match against.
fn variant_name(op: &ChangeOp) -> &'static str {
    match op {
        ChangeOp::AddSchema(_) => "*schema.AddSchema",
        ChangeOp::DropSchema(_) => "*schema.DropSchema",
        ChangeOp::ModifySchema(_, _) => "*schema.ModifySchema",
        ChangeOp::AddTable(_) => "*schema.AddTable",
        ChangeOp::DropTable(_) => "*schema.DropTable",
        ChangeOp::ModifyTable(_, _) => "*schema.ModifyTable",
        ChangeOp::RenameTable { .. } => "*schema.RenameTable",
        ChangeOp::AddColumn { .. } => "*schema.AddColumn",
        ChangeOp::DropColumn { .. } => "*schema.DropColumn",
        ChangeOp::ModifyColumn { .. } => "*schema.ModifyColumn",
        ChangeOp::AddIndex { .. } => "*schema.AddIndex",
        ChangeOp::DropIndex { .. } => "*schema.DropIndex",
        ChangeOp::ModifyIndex { .. } => "*schema.ModifyIndex",
        ChangeOp::AddForeignKey { .. } => "*schema.AddForeignKey",
        ChangeOp::DropForeignKey { .. } => "*schema.DropForeignKey",
        ChangeOp::ModifyForeignKey { .. } => "*schema.ModifyForeignKey",
        ChangeOp::AddCheck { .. } => "*schema.AddCheck",
        ChangeOp::DropCheck { .. } => "*schema.DropCheck",
        ChangeOp::AddView(_) => "*schema.AddView",
        ChangeOp::DropView(_) => "*schema.DropView",
        ChangeOp::ModifyView(_, _) => "*schema.ModifyView",
        ChangeOp::AddFunc(_) => "*schema.AddFunc",
        ChangeOp::DropFunc(_) => "*schema.DropFunc",
        ChangeOp::ModifyFunc(_, _) => "*schema.ModifyFunc",
        ChangeOp::AddProc(_) => "*schema.AddProc",
        ChangeOp::DropProc(_) => "*schema.DropProc",
        ChangeOp::ModifyProc(_, _) => "*schema.ModifyProc",
        ChangeOp::AddTrigger(_) => "*schema.AddTrigger",
        ChangeOp::DropTrigger { .. } => "*schema.DropTrigger",
        ChangeOp::ModifyTrigger(_) => "*schema.ModifyTrigger",
        ChangeOp::AddObject(_) => "*schema.AddObject",
        ChangeOp::DropObject(_) => "*schema.DropObject",
        ChangeOp::ModifyObject { .. } => "*schema.ModifyObject",
    }
}
