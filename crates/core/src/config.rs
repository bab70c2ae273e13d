//! §10.4: connection/version configuration plus the planning-side configuration required by
//! §4.2/§4.7 (`PlanOptions`, `Mode`, the schema qualifier, and the per-statement formatter hook).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub socket: Option<String>,
    pub extra: BTreeMap<String, String>,
}

/// §4.7: `Mode ∈ {Deferred, InPlace}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Deferred,
    InPlace,
}

/// Per-statement formatter hook (§4.7 `SchemaFunc`): given a statement's naked SQL fragment,
/// returns the final text (e.g. with a schema qualifier substituted in).
pub type SchemaFunc = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// §4.7 plan options. `schema_qualifier` encodes the three scopes from §4.2 directly:
/// `None` = realm scope (any change allowed), `Some("")` = schema scope with no qualifier
/// (≤ 1 distinct non-empty schema name across the change-set), `Some(q)` = schema scope
/// qualified to `q`.
#[derive(Clone)]
pub struct PlanOptions {
    pub schema_qualifier: Option<String>,
    pub mode: Mode,
    pub indent: String,
    pub schema_func: Option<SchemaFunc>,
}

impl fmt::Debug for PlanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanOptions")
            .field("schema_qualifier", &self.schema_qualifier)
            .field("mode", &self.mode)
            .field("indent", &self.indent)
            .field("schema_func", &self.schema_func.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            schema_qualifier: None,
            mode: Mode::Deferred,
            indent: String::from("  "),
            schema_func: None,
        }
    }
}

impl PlanOptions {
    pub fn realm() -> Self {
        Self::default()
    }

    pub fn schema_scope(qualifier: impl Into<String>) -> Self {
        Self {
            schema_qualifier: Some(qualifier.into()),
            ..Self::default()
        }
    }
}
