//! Schema diffing - compare two schema snapshots and produce ordered change
//! sets.
//!
//! A diff separates changes into two lists:
//!
//! - **apply changes** (create/add/alter) are safe to run before any data
//!   migration step;
//! - **drop changes** are destructive and run after it. Within one table's
//!   drop sequence a foreign key drop always precedes the drop of the column
//!   carrying it, so a renderer processing the list in order never drops a
//!   column while a constraint still references it.
//!
//! Comparison is total over its inputs - absence, presence, and equality are
//! always well-defined - so diffing never fails. Renames are not detected:
//! a renamed table or column comes out as a drop plus an add, unless the
//! caller supplies explicit hints upstream.

use std::fmt;

use crate::change::{AlterColumn, AlterForeignKey, Change};
use crate::schema::{Column, Schema, Table};

/// Accumulated changes from comparing two schemas (or two tables).
///
/// One accumulator instance is threaded through every table pair of a
/// schema-level diff; append order is discovery order. Cross-table ordering
/// is simply the order tables are iterated in - no topological sorting is
/// attempted, and cross-table foreign-key cycles are the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    /// Non-destructive changes, in discovery order.
    pub apply_changes: Vec<Change>,
    /// Destructive changes, in discovery order.
    pub drop_changes: Vec<Change>,
}

impl SchemaDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.apply_changes.is_empty() && self.drop_changes.is_empty()
    }

    /// Total number of changes across both lists.
    pub fn change_count(&self) -> usize {
        self.apply_changes.len() + self.drop_changes.len()
    }

    /// Compare two versions of a table, appending into this diff.
    pub fn compare_tables(&mut self, current: &Table, desired: &Table) {
        current.compare(self, desired);
    }

    /// Compare two snapshots, appending into this diff.
    ///
    /// Walks the union of table names: tables only in `desired` become
    /// `AddTable`, tables only in `current` become `DropTable`, tables in
    /// both are compared column by column.
    pub fn compare(&mut self, current: &Schema, desired: &Schema) {
        for table in desired.iter_tables() {
            match current.get_table(&table.name) {
                Some(before) => before.compare(self, table),
                None => self.apply_changes.push(Change::AddTable(table.clone())),
            }
        }
        for table in current.iter_tables() {
            if desired.get_table(&table.name).is_none() {
                self.drop_changes.push(table.drop_table());
            }
        }
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no changes");
        }
        if !self.apply_changes.is_empty() {
            writeln!(f, "apply:")?;
            for change in &self.apply_changes {
                writeln!(f, "  {change}")?;
            }
        }
        if !self.drop_changes.is_empty() {
            writeln!(f, "drop:")?;
            for change in &self.drop_changes {
                writeln!(f, "  {change}")?;
            }
        }
        Ok(())
    }
}

impl Schema {
    /// Diff this snapshot (current state) against `desired`.
    pub fn diff(&self, desired: &Schema) -> SchemaDiff {
        let mut diff = SchemaDiff::new();
        diff.compare(self, desired);
        tracing::debug!(
            apply_changes = diff.apply_changes.len(),
            drop_changes = diff.drop_changes.len(),
            "schema diff complete"
        );
        diff
    }
}

impl Table {
    /// Compare `self` (current state) against `desired`, appending every
    /// difference into `diff`.
    ///
    /// Emission order: added columns (in `desired` column order) into the
    /// apply list; dropped columns (in `self` column order, each foreign key
    /// drop directly before its column drop) into the drop list; then one
    /// sparse [`AlterColumn`] per modified column; then the history toggle.
    pub fn compare(&self, diff: &mut SchemaDiff, desired: &Table) {
        for column in desired.columns() {
            if self.get_column(&column.name).is_none() {
                diff.apply_changes.push(Change::AddColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }

        for column in self.columns() {
            if desired.get_column(&column.name).is_none() {
                if let Some(fk_name) = &column.foreign_key_name {
                    diff.drop_changes.push(Change::AlterForeignKey(AlterForeignKey::drop(
                        self.name.clone(),
                        fk_name.clone(),
                    )));
                }
                diff.drop_changes.push(Change::DropColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        for desired_col in desired.columns() {
            if let Some(current_col) = self.get_column(&desired_col.name) {
                if let Some(alter) = alter_column(&self.name, current_col, desired_col) {
                    diff.apply_changes.push(Change::AlterColumn(alter));
                }
            }
        }

        if !self.with_history && desired.with_history {
            diff.apply_changes.push(Change::AddHistoryTable {
                table: self.name.clone(),
            });
        } else if self.with_history && !desired.with_history {
            diff.drop_changes.push(Change::DropHistoryTable {
                table: self.name.clone(),
            });
        }
    }
}

/// Build the sparse patch between two versions of a column, or `None` when
/// every compared attribute matches.
///
/// Type strings compare verbatim (case-sensitive) - logical types are
/// expected to be normalized upstream.
fn alter_column(table: &str, current: &Column, desired: &Column) -> Option<AlterColumn> {
    let mut alter = AlterColumn::new(table, desired.name.as_str());
    if current.col_type != desired.col_type {
        alter.col_type = Some(desired.col_type.clone());
    }
    if current.notnull != desired.notnull {
        alter.notnull = Some(desired.notnull);
    }
    if current.unique != desired.unique {
        alter.unique = Some(desired.unique.clone());
    }
    if current.check_constraint != desired.check_constraint {
        alter.check_constraint = Some(desired.check_constraint.clone());
    }
    if current.references != desired.references {
        alter.references = Some(desired.references.clone());
    }
    (!alter.is_noop()).then_some(alter)
}
