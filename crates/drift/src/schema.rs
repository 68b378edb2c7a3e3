//! Schema model types: columns, tables, and full schema snapshots.
//!
//! A [`Schema`] is one structural snapshot of a database - either the last
//! known deployed state (loaded from a persisted snapshot) or the desired
//! state (built by a domain-mapping scanner). Both sides of a diff use the
//! same types.
//!
//! Column names are unique within a table, case-insensitively: the column
//! map is keyed by the case-folded name while each [`Column`] keeps its
//! original spelling. Registration is idempotent - re-adding a column that
//! already exists returns the existing one untouched, so repeated mapping
//! scans can declare the same schema over and over.

use indexmap::{IndexMap, IndexSet};

use crate::change::Change;

/// A single column definition.
///
/// The type is an engine-agnostic logical type string (e.g. `"varchar(20)"`),
/// compared verbatim during a diff; mapping to dialect types happens
/// downstream.
///
/// A set `foreign_key_name` implies a set `references` - a foreign key always
/// points at a table. This is a convention, not a runtime check: intermediate
/// construction states are legal while a mapping scan is still filling in
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within the owning table (case-insensitive).
    pub name: String,
    /// Logical column type.
    pub col_type: String,
    /// NOT NULL.
    pub notnull: bool,
    /// Unique constraint name, if the column carries one.
    pub unique: Option<String>,
    /// CHECK constraint expression, if any.
    pub check_constraint: Option<String>,
    /// Referenced table, when this column is a foreign key.
    pub references: Option<String>,
    /// Foreign key constraint name.
    pub foreign_key_name: Option<String>,
    /// Index backing the foreign key.
    pub foreign_key_index: Option<String>,
}

impl Column {
    /// Create a column with the given name and logical type; all optional
    /// attributes start unset.
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
            notnull: false,
            unique: None,
            check_constraint: None,
            references: None,
            foreign_key_name: None,
            foreign_key_index: None,
        }
    }
}

/// A table definition: ordered columns plus history bookkeeping.
///
/// The name may carry a `schema.table` qualifier; [`Table::schema`] splits it
/// off. When `with_history` is set, dropped columns are remembered in
/// `pending_drop_columns` so the history/audit view can keep referencing
/// columns no longer physically present in the live table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name, optionally `schema.table` qualified.
    pub name: String,
    /// Columns keyed by case-folded name, in insertion order.
    columns: IndexMap<String, Column>,
    /// Whether historical versioning is enabled for this table.
    pub with_history: bool,
    /// Columns removed from the live table but retained for history views,
    /// in registration order.
    pending_drop_columns: IndexSet<String>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            with_history: false,
            pending_drop_columns: IndexSet::new(),
        }
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Schema qualifier: the part of the name before the first `.`, if any.
    pub fn schema(&self) -> Option<&str> {
        self.name.split_once('.').map(|(schema, _)| schema)
    }

    /// Register a column.
    ///
    /// If a column with the same name already exists, the existing column is
    /// returned unchanged and `column` is discarded - registration is
    /// idempotent.
    pub fn add_column(&mut self, column: Column) -> &mut Column {
        self.columns.entry(Self::key(&column.name)).or_insert(column)
    }

    /// Get-or-create a scalar column with the given name and type.
    pub fn add_column_scalar(&mut self, name: &str, col_type: &str) -> &mut Column {
        self.columns
            .entry(Self::key(name))
            .or_insert_with(|| Column::new(name, col_type))
    }

    /// Look up a column by name (case-insensitive).
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(&Self::key(name))
    }

    pub(crate) fn get_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(&Self::key(name))
    }

    /// Remove a column, preserving the order of the remaining columns.
    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(&Self::key(name))
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.values_mut()
    }

    /// Number of columns currently on the table.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Mark a column name as pending drop for history purposes.
    ///
    /// The column object itself does not need to exist in the table anymore -
    /// only the name is retained.
    pub fn register_pending_drop_column(&mut self, name: impl Into<String>) {
        self.pending_drop_columns.insert(name.into());
    }

    /// Column names pending drop, in registration order.
    pub fn pending_drop_columns(&self) -> impl Iterator<Item = &str> {
        self.pending_drop_columns.iter().map(|name| name.as_str())
    }

    /// Column names that define the shape of this table's history table:
    /// current columns in insertion order, then (if `include_dropped`)
    /// pending-drop names in registration order.
    pub fn all_history_columns(&self, include_dropped: bool) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.values().map(|c| c.name.as_str()).collect();
        if include_dropped {
            names.extend(self.pending_drop_columns());
        }
        names
    }

    /// The descriptor that removes this table.
    pub fn drop_table(&self) -> Change {
        Change::DropTable {
            table: self.name.clone(),
        }
    }
}

/// A full schema snapshot: tables keyed by name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Tables in the schema, indexed by name.
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table. Like [`Table::add_column`], this is idempotent: a
    /// table that is already present is returned unchanged.
    pub fn add_table(&mut self, table: Table) -> &mut Table {
        self.tables.entry(table.name.clone()).or_insert(table)
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Iterate over all tables.
    pub fn iter_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}
