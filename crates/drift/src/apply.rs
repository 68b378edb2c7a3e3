//! Applying change descriptors to an in-memory model.
//!
//! A tracked model doubles as the "last known" snapshot and the live
//! mutation target: applying a generated diff to it rolls it forward to
//! match what the executed migration will do to the database. Mutation is
//! in place, one descriptor at a time, by a single owner.
//!
//! Descriptors that reference a column or table the model does not have
//! indicate drift between the tracked model and reality. They fail hard
//! rather than being skipped - continuing would silently corrupt the
//! tracked state.

use crate::change::{AlterColumn, Change};
use crate::diff::SchemaDiff;
use crate::error::Error;
use crate::schema::{Schema, Table};
use crate::Result;

impl Table {
    /// Apply one descriptor to this table, mutating it in place.
    ///
    /// `AddColumn` is idempotent like [`Table::add_column`]; `DropColumn`
    /// and `AlterColumn` fail with [`Error::ColumnNotFound`] when the column
    /// is missing. Table-level descriptors (`AddTable`, `DropTable`) belong
    /// to [`Schema::apply`] and are rejected here.
    pub fn apply(&mut self, change: &Change) -> Result<()> {
        tracing::trace!(table = %self.name, change = change.kind(), "applying change");
        match change {
            Change::AddColumn { column, .. } => {
                self.add_column(column.clone());
                Ok(())
            }
            Change::DropColumn { column, .. } => self.apply_drop_column(column),
            Change::AlterColumn(alter) => self.apply_alter_column(alter),
            Change::AlterForeignKey(fk) => {
                // Only the drop marker mutates the model; a re-added
                // constraint arrives through the column definitions
                // themselves. No error when nothing carries the name: the
                // covered column may already be gone.
                if fk.is_drop() {
                    for column in self.columns_mut() {
                        if column.foreign_key_name.as_deref() == Some(fk.name.as_str()) {
                            column.foreign_key_name = None;
                            column.foreign_key_index = None;
                        }
                    }
                }
                Ok(())
            }
            Change::AddHistoryTable { .. } => {
                self.with_history = true;
                Ok(())
            }
            Change::DropHistoryTable { .. } => {
                self.with_history = false;
                Ok(())
            }
            Change::AddTable(_) | Change::DropTable { .. } => Err(Error::UnsupportedChange {
                table: self.name.clone(),
                change: change.kind(),
            }),
        }
    }

    fn apply_drop_column(&mut self, column: &str) -> Result<()> {
        let removed = self
            .remove_column(column)
            .ok_or_else(|| Error::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })?;
        if self.with_history {
            self.register_pending_drop_column(removed.name);
        }
        Ok(())
    }

    fn apply_alter_column(&mut self, alter: &AlterColumn) -> Result<()> {
        let table = self.name.clone();
        let column = self
            .get_column_mut(&alter.column)
            .ok_or_else(|| Error::ColumnNotFound {
                table,
                column: alter.column.clone(),
            })?;
        if let Some(col_type) = &alter.col_type {
            column.col_type = col_type.clone();
        }
        if let Some(notnull) = alter.notnull {
            column.notnull = notnull;
        }
        if let Some(unique) = &alter.unique {
            column.unique = unique.clone();
        }
        if let Some(check) = &alter.check_constraint {
            column.check_constraint = check.clone();
        }
        if let Some(references) = &alter.references {
            column.references = references.clone();
        }
        Ok(())
    }
}

impl Schema {
    /// Apply one descriptor, routing column-level changes to the named table.
    pub fn apply(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::AddTable(table) => {
                if self.tables.contains_key(&table.name) {
                    return Err(Error::TableExists {
                        table: table.name.clone(),
                    });
                }
                self.add_table(table.clone());
                Ok(())
            }
            Change::DropTable { table } => {
                self.tables
                    .shift_remove(table)
                    .ok_or_else(|| Error::TableNotFound {
                        table: table.clone(),
                    })?;
                Ok(())
            }
            _ => {
                let name = change.table_name();
                let table =
                    self.tables
                        .get_mut(name)
                        .ok_or_else(|| Error::TableNotFound {
                            table: name.to_string(),
                        })?;
                table.apply(change)
            }
        }
    }

    /// Apply an entire diff: the apply list first, then the drop list - the
    /// same order an executed migration uses around its data-migration step.
    pub fn apply_diff(&mut self, diff: &SchemaDiff) -> Result<()> {
        for change in diff.apply_changes.iter().chain(&diff.drop_changes) {
            self.apply(change)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::change::{AlterColumn, AlterForeignKey, Change};
    use crate::error::Error;
    use crate::schema::{Column, Table};

    fn base() -> Table {
        let mut table = Table::new("tab");
        table.add_column_scalar("id", "bigint");
        table.add_column_scalar("name", "varchar(20)");
        table.add_column_scalar("status", "varchar(3)");
        table
    }

    #[test]
    fn apply_drop_column() {
        let mut table = base();
        table
            .apply(&Change::DropColumn {
                table: "tab".to_string(),
                column: "name".to_string(),
            })
            .unwrap();
        assert!(table.get_column("name").is_none());
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn apply_drop_column_does_not_exist() {
        let mut table = base();
        let err = table
            .apply(&Change::DropColumn {
                table: "tab".to_string(),
                column: "DoesNotExist".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { column, .. } if column == "DoesNotExist"));
    }

    #[test]
    fn apply_drop_column_with_history_registers_pending() {
        let mut table = base();
        table.with_history = true;
        table
            .apply(&Change::DropColumn {
                table: "tab".to_string(),
                column: "status".to_string(),
            })
            .unwrap();
        assert!(table.get_column("status").is_none());
        assert_eq!(table.pending_drop_columns().collect::<Vec<_>>(), ["status"]);
        assert_eq!(table.all_history_columns(true), ["id", "name", "status"]);
    }

    #[test]
    fn apply_alter_column_type() {
        let mut table = base();
        let mut alter = AlterColumn::new("tab", "id");
        alter.col_type = Some("uuid".to_string());
        table.apply(&Change::AlterColumn(alter)).unwrap();
        assert_eq!(table.get_column("id").unwrap().col_type, "uuid");
    }

    #[test]
    fn apply_alter_column_does_not_exist() {
        let mut table = base();
        let mut alter = AlterColumn::new("tab", "DoesNotExist");
        alter.col_type = Some("integer".to_string());
        let err = table.apply(&Change::AlterColumn(alter)).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn apply_alter_column_merges_only_set_fields() {
        let mut table = base();
        {
            let name = table.get_column_mut("name").unwrap();
            name.notnull = true;
            name.unique = Some("uq_tab_name".to_string());
        }

        let mut alter = AlterColumn::new("tab", "name");
        alter.col_type = Some("varchar(30)".to_string());
        table.apply(&Change::AlterColumn(alter)).unwrap();

        let name = table.get_column("name").unwrap();
        assert_eq!(name.col_type, "varchar(30)");
        // Untouched fields survive the patch.
        assert!(name.notnull);
        assert_eq!(name.unique.as_deref(), Some("uq_tab_name"));

        // A tagged clear removes the constraint.
        let mut alter = AlterColumn::new("tab", "name");
        alter.unique = Some(None);
        table.apply(&Change::AlterColumn(alter)).unwrap();
        assert_eq!(table.get_column("name").unwrap().unique, None);
    }

    #[test]
    fn apply_add_column_is_idempotent() {
        let mut table = base();
        let change = Change::AddColumn {
            table: "tab".to_string(),
            column: Column::new("status", "varchar(99)"),
        };
        table.apply(&change).unwrap();
        // Existing column wins; the count is unchanged.
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.get_column("status").unwrap().col_type, "varchar(3)");
    }

    #[test]
    fn apply_foreign_key_drop_clears_fk_fields() {
        let mut table = base();
        {
            let column = table.add_column_scalar("customer_id", "bigint");
            column.references = Some("customer".to_string());
            column.foreign_key_name = Some("fk_tab_customer".to_string());
            column.foreign_key_index = Some("ix_tab_customer".to_string());
        }

        table
            .apply(&Change::AlterForeignKey(AlterForeignKey::drop(
                "tab",
                "fk_tab_customer",
            )))
            .unwrap();

        let column = table.get_column("customer_id").unwrap();
        assert_eq!(column.foreign_key_name, None);
        assert_eq!(column.foreign_key_index, None);

        // Unknown constraint name: nothing to clear, not an error.
        table
            .apply(&Change::AlterForeignKey(AlterForeignKey::drop(
                "tab",
                "fk_gone",
            )))
            .unwrap();
    }

    #[test]
    fn apply_history_toggles() {
        let mut table = base();
        table
            .apply(&Change::AddHistoryTable {
                table: "tab".to_string(),
            })
            .unwrap();
        assert!(table.with_history);
        table
            .apply(&Change::DropHistoryTable {
                table: "tab".to_string(),
            })
            .unwrap();
        assert!(!table.with_history);
    }

    #[test]
    fn apply_table_level_change_is_rejected() {
        let mut table = base();
        let err = table
            .apply(&Change::DropTable {
                table: "tab".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedChange { change, .. } if change == "drop table"));
    }
}
