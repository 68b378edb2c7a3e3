//! Schema model and migration diff engine.
//!
//! Given a "before" snapshot (the last known deployed schema) and an "after"
//! snapshot (derived from current domain mappings), this crate computes the
//! ordered set of change descriptors needed to transform one into the other:
//!
//! - **apply changes** (create/add/alter) run before any data-migration
//!   step;
//! - **drop changes** (destructive) run after it, with foreign keys dropped
//!   before the columns that carry them.
//!
//! Rendering descriptors into dialect-specific DDL, writing migration files,
//! and executing them against a live database are downstream concerns - this
//! crate stops at descriptors.
//!
//! # Example
//!
//! ```
//! use drift::{Change, Schema, Table};
//!
//! let mut before = Schema::new();
//! let mut tab = Table::new("tab");
//! tab.add_column_scalar("id", "bigint");
//! tab.add_column_scalar("status", "varchar(3)");
//! before.add_table(tab);
//!
//! let mut after = Schema::new();
//! let mut tab = Table::new("tab");
//! tab.add_column_scalar("id", "bigint");
//! tab.add_column_scalar("comment", "varchar(1000)");
//! after.add_table(tab);
//!
//! let diff = before.diff(&after);
//! assert!(matches!(&diff.apply_changes[..], [Change::AddColumn { column, .. }] if column.name == "comment"));
//! assert!(matches!(&diff.drop_changes[..], [Change::DropColumn { column, .. }] if column == "status"));
//! ```

mod apply;
mod change;
mod diff;
mod error;
mod schema;

pub use change::{AlterColumn, AlterForeignKey, Change};
pub use diff::SchemaDiff;
pub use error::Error;
pub use schema::{Column, Schema, Table};

/// Result type for drift operations.
pub type Result<T> = std::result::Result<T, Error>;
