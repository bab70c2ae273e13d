#![allow(dead_code)]

use std::{error::Error as StdError, fmt};

use crate::{Ident, QualifiedName};

pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// §7 "Validation errors": malformed foreign keys (§4.4 `checkFK`) and scope violations (§4.2).
/// Surfaced as a single message; planning aborts before any statement executes.
#[derive(Debug)]
pub enum ValidationError {
    MalformedForeignKey {
        symbol: Ident,
        table: QualifiedName,
        missing: Vec<String>,
    },
    DuplicateColumn {
        table: QualifiedName,
        column: Ident,
    },
    ScopeViolation {
        variant: String,
    },
    MultipleSchemasInScope {
        schemas: Vec<String>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedForeignKey {
                symbol,
                table,
                missing,
            } => write!(
                f,
                "foreign key `{}` on table `{}` is malformed: missing {}",
                symbol.value,
                table.name.value,
                missing.join(", ")
            ),
            Self::DuplicateColumn { table, column } => write!(
                f,
                "column `{}` already exists on table `{}`",
                column.value, table.name.value
            ),
            Self::ScopeViolation { variant } => write!(
                f,
                "{variant} is not allowed when migration plan is scoped to one schema"
            ),
            Self::MultipleSchemasInScope { schemas } => {
                write!(f, "found {} schemas when migration plan is scoped to one: [", schemas.len())?;
                for (i, schema) in schemas.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{schema:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl StdError for ValidationError {}

/// §7 "Driver/introspection errors": wrapped with a per-dialect prefix.
#[derive(Debug)]
pub struct DriverError {
    pub dialect: String,
    pub source: BoxedError,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dialect, self.source)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// §4.5 / §6: `applied` names the last statement index that completed successfully
/// (`0` when the very first statement failed).
#[derive(Debug)]
pub struct ApplyError {
    pub applied: usize,
    pub statement_comment: Option<String>,
    pub source: BoxedError,
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statement_comment {
            Some(comment) => write!(
                f,
                "apply failed after {} statements ({comment}): {}",
                self.applied, self.source
            ),
            None => write!(f, "apply failed after {} statements: {}", self.applied, self.source),
        }
    }
}

impl StdError for ApplyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// §7 "Normalize restore errors": if restore fails and apply succeeded, the restore error is
/// caller-visible; if both fail, the apply error wraps the restore error.
#[derive(Debug)]
pub enum NormalizeError {
    RestoreFailed { source: BoxedError },
    ApplyFailed { apply: BoxedError, restore: BoxedError },
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestoreFailed { source } => write!(f, "dev database restore failed: {source}"),
            Self::ApplyFailed { apply, restore } => write!(
                f,
                "dev database apply failed: {apply} (restore also failed: {restore})"
            ),
        }
    }
}

impl StdError for NormalizeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::RestoreFailed { source } => Some(source.as_ref()),
            Self::ApplyFailed { apply, .. } => Some(apply.as_ref()),
        }
    }
}

/// §7 "NotClean": a snapshot target contains unexpected resources.
#[derive(Debug)]
pub struct NotCleanError {
    pub reason: String,
}

impl fmt::Display for NotCleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "database is not clean: {}", self.reason)
    }
}

impl StdError for NotCleanError {}

/// §7 "NotExist": asked to inspect a missing schema.
#[derive(Debug)]
pub struct NotExistError {
    pub schema: String,
}

impl fmt::Display for NotExistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema `{}` does not exist", self.schema)
    }
}

impl StdError for NotExistError {}

#[derive(Debug)]
pub enum Error {
    Validation(ValidationError),
    Driver(DriverError),
    Apply(ApplyError),
    Normalize(NormalizeError),
    NotClean(NotCleanError),
    NotExist(NotExistError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(error) => write!(f, "validation error: {error}"),
            Self::Driver(error) => write!(f, "driver error: {error}"),
            Self::Apply(error) => write!(f, "apply error: {error}"),
            Self::Normalize(error) => write!(f, "normalize error: {error}"),
            Self::NotClean(error) => write!(f, "{error}"),
            Self::NotExist(error) => write!(f, "{error}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Driver(error) => Some(error),
            Self::Apply(error) => Some(error),
            Self::Normalize(error) => Some(error),
            Self::NotClean(error) => Some(error),
            Self::NotExist(error) => Some(error),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DriverError> for Error {
    fn from(value: DriverError) -> Self {
        Self::Driver(value)
    }
}

impl From<ApplyError> for Error {
    fn from(value: ApplyError) -> Self {
        Self::Apply(value)
    }
}

impl From<NormalizeError> for Error {
    fn from(value: NormalizeError) -> Self {
        Self::Normalize(value)
    }
}

impl From<NotCleanError> for Error {
    fn from(value: NotCleanError) -> Self {
        Self::NotClean(value)
    }
}

impl From<NotExistError> for Error {
    fn from(value: NotExistError) -> Self {
        Self::NotExist(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
