use std::fmt;
use std::sync::Arc;

use crate::model::key::ObjectKey;

/// A dialect-opaque item (enum type, domain, sequence, user type, ...). The kernel never
/// interprets `definition`; dialects attach whatever payload they need there. `Object`s may be
/// shared across schemas via `Deps` (§3 "Lifecycle"): ownership belongs to the first `Schema`
/// that declares them, every other reference is a non-owning `ObjectKey` lookup.
///
/// `dispatch` is the optional extension point described below; it is excluded from equality and
/// `Debug` only prints whether one is present, since dynamic dispatchers rarely have a meaningful
/// structural identity of their own.
#[derive(Debug, Clone)]
pub struct Object {
    pub key: ObjectKey,
    pub definition: String,
    pub dispatch: Option<Arc<dyn Depender>>,
}

impl Object {
    pub fn new(key: ObjectKey, definition: impl Into<String>) -> Self {
        Self {
            key,
            definition: definition.into(),
            dispatch: None,
        }
    }

    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Arc<dyn Depender>) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.definition == other.definition
    }
}

/// Extension point for §4.3's general-delegation rule ("if a.object or b.object implements the
/// Dispatch capability, ask them first"). Dialect-specific `Object`s (PostgreSQL sequences,
/// domains, ...) implement this to participate in dependency ordering beyond the built-in rules.
pub trait Depender: fmt::Debug + Send + Sync {
    /// `true` iff `self` must be ordered after `other` (mirrors the `DependsOn(a, b)` relation).
    fn depends_on(&self, other: &ObjectKey) -> bool;

    /// `true` iff `other` must be ordered after `self`.
    fn dependency_of(&self, other: &ObjectKey) -> bool {
        let _ = other;
        false
    }
}
