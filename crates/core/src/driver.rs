//! C8: the Driver Contract (§4.7). Every dialect driver implements [`Driver`]; the kernel never
//! depends on a concrete implementation, only this trait and the types around it. §4.8's
//! in-memory reference driver (used only by tests) lives under `tests/support/memory_driver.rs`.

use crate::change::ChangeSet;
use crate::config::PlanOptions;
use crate::model::Realm;
use crate::Ident;

/// Filter passed to [`Driver::introspect`]: which schemas to read, and whether to restrict to
/// tables (skipping views/funcs/procs/objects, a cheaper introspection mode some callers want).
#[derive(Debug, Clone, Default)]
pub struct InspectFilter {
    pub schemas: Vec<Ident>,
    pub tables_only: bool,
}

/// One executable unit of a [`Plan`] (§6 "Plan object").
#[derive(Debug, Clone)]
pub struct Statement {
    pub cmd: String,
    pub args: Vec<crate::types::Value>,
    pub comment: Option<String>,
    /// Best-effort textual inverse(s) of `cmd`; empty when the driver couldn't produce one.
    pub reverse: Vec<String>,
    /// The [`crate::change::Change`] this statement was emitted from (§6 "Source"). Reference
    /// drivers and tests use this to recover structured intent from a textual plan; real dialects
    /// are free to leave it `None` once they no longer need it past emission.
    pub source: Option<crate::change::Change>,
}

impl Statement {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args: Vec::new(),
            comment: None,
            reverse: Vec::new(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse.push(reverse.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: crate::change::Change) -> Self {
        self.source = Some(source);
        self
    }
}

/// A driver-emitted migration plan (§6 "Plan object").
#[derive(Debug, Clone)]
pub struct Plan {
    pub name: String,
    pub transactional: bool,
    pub reversible: bool,
    pub statements: Vec<Statement>,
}

impl Plan {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        let reversible = Self::compute_reversible(&statements);
        Self {
            name: name.into(),
            transactional: true,
            reversible,
            statements,
        }
    }

    /// §4.5 "Reversibility": a plan is reversible iff every statement produced at least one
    /// non-empty reverse fragment (P7).
    pub fn compute_reversible(statements: &[Statement]) -> bool {
        statements.iter().all(|statement| !statement.reverse.is_empty())
    }

    /// Recomputes `self.reversible` after the statement list was mutated in place.
    pub fn refresh_reversible(&mut self) {
        self.reversible = Self::compute_reversible(&self.statements);
    }
}

/// §4.5's second driver capability: executing one statement against the live connection.
pub trait StatementExecutor {
    fn execute(&mut self, statement: &Statement) -> Result<(), crate::error::BoxedError>;
}

/// A restore closure from [`Driver::snapshot`] (§4.6 step 1 / §6 "Snapshot restore closure").
/// Idempotent; must succeed against an already-restored sandbox.
pub struct RestoreHandle {
    restore: Box<dyn FnOnce() -> crate::Result<()> + Send>,
}

impl RestoreHandle {
    pub fn new(restore: impl FnOnce() -> crate::Result<()> + Send + 'static) -> Self {
        Self {
            restore: Box::new(restore),
        }
    }

    pub fn restore(self) -> crate::Result<()> {
        (self.restore)()
    }
}

impl std::fmt::Debug for RestoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RestoreHandle(..)")
    }
}

/// The polymorphic surface every dialect implements (§4.7). The kernel (C1-C7) never depends on
/// a concrete implementation of this trait, only on it.
pub trait Driver: StatementExecutor {
    fn introspect(&self, filter: &InspectFilter) -> crate::Result<Realm>;

    fn diff(&self, current: &Realm, desired: &Realm) -> crate::Result<ChangeSet>;

    fn plan_changes(&self, changes: ChangeSet, options: &PlanOptions) -> crate::Result<Plan>;

    /// Default implementation delegates to the Apply Pipeline (C6); dialects should not need to
    /// override this, only [`StatementExecutor::execute`]. Callable through `&mut dyn Driver`
    /// (no `Self: Sized` bound) since `normalize.rs` drives normalization behind the trait object.
    fn apply_changes(&mut self, plan: &Plan) -> crate::Result<()> {
        crate::apply::apply_changes(self, plan)
    }

    fn snapshot(&mut self) -> crate::Result<RestoreHandle>;

    fn check_clean(&self) -> crate::Result<()>;
}
