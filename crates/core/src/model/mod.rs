pub mod key;
mod object;
mod realm;
mod routine;
mod schema;
mod table;
mod view;

pub use key::{ColumnKey, ForeignKeyKey, IndexKey, ObjectKey, SchemaKey, TableKey};
pub use object::{Depender, Object};
pub use realm::Realm;
pub use routine::{Argument, Func, Proc, Trigger, TriggerHost};
pub use schema::{Attributes, Schema};
pub use table::{
    Check, Column, ColumnType, ForeignKey, ForeignKeyAction, Index, IndexPart, IndexPartTarget,
    PrimaryKey, SortDirection, Table,
};
pub use view::View;
