//! Table definitions recovered from DDL

mod table;

pub use table::{ColumnDef, ConstraintDef, ConstraintKind, QualifiedName, TableDefinition};
