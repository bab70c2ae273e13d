//! Dialect-independent schema model, diff ordering, and apply contracts.
//!
//! This crate is the planning kernel described in the module table below; it never depends on a
//! concrete database driver. A dialect plugs in by implementing [`driver::Driver`] and handing the
//! kernel a [`change::ChangeSet`] to validate (`scope`), order (`ordering`), detach cycles from
//! (`detach`), and execute (`apply`), plus the sandbox round-trip in `normalize`.
//!
//! | Module      | Responsibility                                                          |
//! |-------------|--------------------------------------------------------------------------|
//! | [`model`]   | Realms, schemas, tables, views, columns, indexes, FKs, routines, objects |
//! | [`change`]  | The Change Algebra: tagged change variants plus structural clauses       |
//! | [`ordering`]| Dependency-aware topological sort of a change-set                        |
//! | [`detach`]  | Foreign-key cycle detection and out-of-line detachment                   |
//! | [`scope`]   | Migration-scope validation                                               |
//! | [`apply`]   | Linear statement execution with partial-failure accounting               |
//! | [`normalize`] | Dev-database round-trip canonicalization                               |
//! | [`driver`]  | The polymorphic per-dialect contract                                     |

pub mod apply;
pub mod change;
pub mod config;
pub mod detach;
pub mod driver;
pub mod error;
mod expr;
mod ident;
pub mod model;
pub mod normalize;
pub mod ordering;
pub mod scope;
pub mod types;

pub use change::{Change, ChangeOp, ChangeSet, Clause, ForeignKeyEdge};
pub use config::{ConnectionConfig, Mode, PlanOptions, SchemaFunc, Version};
pub use detach::detach_cycles;
pub use driver::{Driver, InspectFilter, Plan, RestoreHandle, Statement, StatementExecutor};
pub use error::{
    ApplyError, BoxedError, DriverError, Error, NormalizeError, NotCleanError, NotExistError,
    Result, ValidationError,
};
pub use expr::{BinaryOperator, Expr, Literal, UnaryOperator};
pub use ident::{Ident, QualifiedName};
pub use model::{
    Argument, Attributes, Check, Column, ColumnKey, ColumnType, Depender, Func, ForeignKey,
    ForeignKeyAction, ForeignKeyKey, Index, IndexKey, IndexPart, IndexPartTarget, Object,
    ObjectKey, PrimaryKey, Proc, Realm, Schema, SchemaKey, SortDirection, Table, TableKey,
    Trigger, TriggerHost, View,
};
pub use normalize::{normalize_realm, normalize_schema};
pub use ordering::sort_changes;
pub use scope::check_changes_scope;
pub use types::{DataType, Value, float_total_cmp, value_total_eq};
