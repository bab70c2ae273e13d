use crate::{
    Ident,
    model::{
        key::{ObjectKey, SchemaKey},
        object::Object,
        schema::Attributes,
        schema::Schema,
    },
};

/// A `Realm` owns an ordered set of `Schema`s plus realm-wide attributes and realm-scoped
/// `Object`s (§3 "Realm"). Entities never outlive the `Realm` that owns them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Realm {
    pub attrs: Attributes,
    pub schemas: Vec<Schema>,
    pub objects: Vec<Object>,
}

impl Realm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self, name: &Ident) -> Option<&Schema> {
        self.schemas.iter().find(|s| &s.name == name)
    }

    pub fn schema_mut(&mut self, name: &Ident) -> Option<&mut Schema> {
        self.schemas.iter_mut().find(|s| &s.name == name)
    }

    pub fn schema_keys(&self) -> Vec<SchemaKey> {
        self.schemas.iter().map(Schema::key).collect()
    }

    /// Restricts the realm to the named schemas, preserving declaration order. Used by
    /// introspection filters and by the Dev-DB Normalizer (§4.6 step 4).
    pub fn filtered_to(&self, names: &[Ident]) -> Self {
        Self {
            attrs: self.attrs.clone(),
            schemas: self
                .schemas
                .iter()
                .filter(|schema| names.contains(&schema.name))
                .cloned()
                .collect(),
            objects: self.objects.clone(),
        }
    }

    /// I4 fix-up: re-links every child's `schema` back-reference to match the `Schema` that
    /// actually contains it, after a structural rewrite (e.g. re-parenting in §4.6 step (c)/(d)).
    /// Also re-keys each owned `Object` onto the same schema and remaps any `ObjectKey::Schema`
    /// entry in a `deps` list that pointed at an object's stale schema key, so a table/view/func/
    /// proc that moved schemas together with the enum type it depends on keeps pointing at it.
    /// Returns the number of entities that were stale and got corrected.
    pub fn relink(&mut self) -> usize {
        let mut fixed = 0;
        for schema in &mut self.schemas {
            let key = schema.key();
            let mut remap: Vec<(SchemaKey, SchemaKey)> = Vec::new();

            for table in &mut schema.tables {
                if table.schema != key {
                    remap.push((table.schema.clone(), key.clone()));
                    table.schema = key.clone();
                    fixed += 1;
                }
            }
            for view in &mut schema.views {
                if view.schema != key {
                    remap.push((view.schema.clone(), key.clone()));
                    view.schema = key.clone();
                    fixed += 1;
                }
            }
            for func in &mut schema.funcs {
                if func.schema != key {
                    remap.push((func.schema.clone(), key.clone()));
                    func.schema = key.clone();
                    fixed += 1;
                }
            }
            for proc in &mut schema.procs {
                if proc.schema != key {
                    remap.push((proc.schema.clone(), key.clone()));
                    proc.schema = key.clone();
                    fixed += 1;
                }
            }
            for object in &mut schema.objects {
                if let ObjectKey::Schema(owner, name) = &object.key {
                    if *owner != key {
                        remap.push((owner.clone(), key.clone()));
                        object.key = ObjectKey::Schema(key.clone(), name.clone());
                        fixed += 1;
                    }
                }
            }

            if remap.is_empty() {
                continue;
            }
            let retarget = |dep: &mut ObjectKey| {
                if let ObjectKey::Schema(owner, _) = dep {
                    if let Some((_, new_owner)) = remap.iter().find(|(old, _)| old == owner) {
                        *owner = new_owner.clone();
                    }
                }
            };
            for table in &mut schema.tables {
                table.deps.iter_mut().for_each(retarget);
            }
            for view in &mut schema.views {
                view.deps.iter_mut().for_each(retarget);
            }
            for func in &mut schema.funcs {
                func.deps.iter_mut().for_each(retarget);
            }
            for proc in &mut schema.procs {
                proc.deps.iter_mut().for_each(retarget);
            }
        }
        fixed
    }
}
