//! Change descriptors - the atomic schema modifications a diff emits.
//!
//! Descriptors are plain data. The diff engine emits them and never mutates
//! one afterwards; turning them into dialect DDL is a downstream concern.
//! The `Display` impls render a one-line `+`/`-`/`~` summary for review and
//! debug output, not SQL.

use std::fmt;

use crate::schema::{Column, Table};

/// A single schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a whole table, columns included.
    AddTable(Table),
    /// Remove a whole table.
    DropTable { table: String },
    /// Add one column to an existing table.
    AddColumn { table: String, column: Column },
    /// Remove one column from an existing table.
    DropColumn { table: String, column: String },
    /// Alter attributes of an existing column.
    AlterColumn(AlterColumn),
    /// Alter a foreign key constraint.
    AlterForeignKey(AlterForeignKey),
    /// Enable history tracking for a table.
    AddHistoryTable { table: String },
    /// Disable history tracking for a table.
    DropHistoryTable { table: String },
}

impl Change {
    /// Name of the table this change targets.
    pub fn table_name(&self) -> &str {
        match self {
            Change::AddTable(table) => &table.name,
            Change::DropTable { table }
            | Change::AddColumn { table, .. }
            | Change::DropColumn { table, .. }
            | Change::AddHistoryTable { table }
            | Change::DropHistoryTable { table } => table,
            Change::AlterColumn(alter) => &alter.table,
            Change::AlterForeignKey(fk) => &fk.table,
        }
    }

    /// Short tag for this change, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Change::AddTable(_) => "add table",
            Change::DropTable { .. } => "drop table",
            Change::AddColumn { .. } => "add column",
            Change::DropColumn { .. } => "drop column",
            Change::AlterColumn(_) => "alter column",
            Change::AlterForeignKey(_) => "alter foreign key",
            Change::AddHistoryTable { .. } => "add history table",
            Change::DropHistoryTable { .. } => "drop history table",
        }
    }
}

/// Sparse column patch: `None` fields are left unchanged.
///
/// For the attributes that are themselves optional, the outer `Option` tags
/// whether the attribute changed at all and `Some(None)` clears it -
/// "unspecified" and "cleared" never share a value.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterColumn {
    pub table: String,
    pub column: String,
    /// New logical type.
    pub col_type: Option<String>,
    /// New NOT NULL state.
    pub notnull: Option<bool>,
    /// New unique constraint name; `Some(None)` removes the constraint.
    pub unique: Option<Option<String>>,
    /// New check constraint; `Some(None)` removes it.
    pub check_constraint: Option<Option<String>>,
    /// New referenced table; `Some(None)` removes the reference.
    pub references: Option<Option<String>>,
}

impl AlterColumn {
    /// An empty patch for the given column.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            col_type: None,
            notnull: None,
            unique: None,
            check_constraint: None,
            references: None,
        }
    }

    /// True when no attribute actually changes.
    pub fn is_noop(&self) -> bool {
        self.col_type.is_none()
            && self.notnull.is_none()
            && self.unique.is_none()
            && self.check_constraint.is_none()
            && self.references.is_none()
    }
}

/// Foreign key alteration.
///
/// `columns: None` is the drop marker: a dropped constraint is identified by
/// name alone and does not restate which columns it covered.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterForeignKey {
    pub table: String,
    /// Constraint name.
    pub name: String,
    /// Covered columns; `None` drops the constraint.
    pub columns: Option<Vec<String>>,
}

impl AlterForeignKey {
    /// The drop form of the descriptor.
    pub fn drop(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns: None,
        }
    }

    /// True when this alteration drops the constraint.
    pub fn is_drop(&self) -> bool {
        self.columns.is_none()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::AddTable(table) => write!(f, "+ table {}", table.name),
            Change::DropTable { table } => write!(f, "- table {}", table),
            Change::AddColumn { table, column } => {
                let notnull = if column.notnull { " not null" } else { "" };
                write!(f, "+ {}.{}: {}{}", table, column.name, column.col_type, notnull)
            }
            Change::DropColumn { table, column } => write!(f, "- {}.{}", table, column),
            Change::AlterColumn(alter) => write!(f, "{alter}"),
            Change::AlterForeignKey(fk) => write!(f, "{fk}"),
            Change::AddHistoryTable { table } => write!(f, "+ history {}", table),
            Change::DropHistoryTable { table } => write!(f, "- history {}", table),
        }
    }
}

impl fmt::Display for AlterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(col_type) = &self.col_type {
            parts.push(format!("type {col_type}"));
        }
        if let Some(notnull) = self.notnull {
            parts.push(if notnull { "not null" } else { "nullable" }.to_string());
        }
        if let Some(unique) = &self.unique {
            parts.push(match unique {
                Some(name) => format!("unique {name}"),
                None => "drop unique".to_string(),
            });
        }
        if let Some(check) = &self.check_constraint {
            parts.push(match check {
                Some(expr) => format!("check ({expr})"),
                None => "drop check".to_string(),
            });
        }
        if let Some(references) = &self.references {
            parts.push(match references {
                Some(table) => format!("references {table}"),
                None => "drop references".to_string(),
            });
        }
        write!(f, "~ {}.{}: {}", self.table, self.column, parts.join(", "))
    }
}

impl fmt::Display for AlterForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.columns {
            None => write!(f, "- FOREIGN KEY {} on {}", self.name, self.table),
            Some(columns) => write!(
                f,
                "~ FOREIGN KEY {} on {} ({})",
                self.name,
                self.table,
                columns.join(", ")
            ),
        }
    }
}
