//! Schema comparison engine.
//!
//! Compares two schema snapshots and produces an ordered sequence of
//! table-level differences. Each difference renders to zero or one DDL
//! statement under a set of [`StatementModifiers`]; an empty rendering means
//! no action is needed.

use crate::schema::{quote_ident, ColumnSnapshot, IndexSnapshot, SchemaSnapshot, TableSnapshot};

/// Policy for emitting auto-increment counter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextAutoInc {
    /// Never emit counter adjustments.
    Never,
    /// Emit only when the declared value is greater than the live value.
    /// Decreases and no-ops are suppressed to avoid destructive or noisy
    /// resets.
    #[default]
    IfIncreased,
    /// Emit whenever the values differ.
    Always,
}

/// Modifiers controlling how ambiguous differences render into DDL.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementModifiers {
    /// Auto-increment counter policy.
    pub next_auto_inc: NextAutoInc,
}

/// One clause of an ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterClause {
    /// Add a column.
    AddColumn(ColumnSnapshot),
    /// Drop a column by name.
    DropColumn(String),
    /// Redefine an existing column.
    ModifyColumn(ColumnSnapshot),
    /// Add a secondary index.
    AddIndex(IndexSnapshot),
    /// Drop a secondary index by name.
    DropIndex(String),
    /// Add a primary key over the given columns.
    AddPrimaryKey(Vec<String>),
    /// Drop the primary key.
    DropPrimaryKey,
    /// Adjust the auto-increment counter.
    AutoIncrement {
        /// Live counter value, when the table had one.
        from: Option<u64>,
        /// Declared counter value.
        to: u64,
    },
}

impl AlterClause {
    /// Renders this clause, or `None` when the modifiers suppress it.
    #[must_use]
    pub fn render(&self, mods: &StatementModifiers) -> Option<String> {
        match self {
            Self::AddColumn(column) => Some(format!("ADD COLUMN {}", column.definition())),
            Self::DropColumn(name) => Some(format!("DROP COLUMN {}", quote_ident(name))),
            Self::ModifyColumn(column) => Some(format!("MODIFY COLUMN {}", column.definition())),
            Self::AddIndex(index) => Some(format!("ADD {}", index.definition())),
            Self::DropIndex(name) => Some(format!("DROP KEY {}", quote_ident(name))),
            Self::AddPrimaryKey(columns) => {
                let quoted: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                Some(format!("ADD PRIMARY KEY ({})", quoted.join(", ")))
            }
            Self::DropPrimaryKey => Some("DROP PRIMARY KEY".to_string()),
            Self::AutoIncrement { from, to } => match mods.next_auto_inc {
                NextAutoInc::Never => None,
                NextAutoInc::IfIncreased => {
                    if from.map_or(true, |f| *to > f) {
                        Some(format!("AUTO_INCREMENT = {}", to))
                    } else {
                        None
                    }
                }
                NextAutoInc::Always => Some(format!("AUTO_INCREMENT = {}", to)),
            },
        }
    }
}

/// A single table-level difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDiff {
    /// The table exists only in the declared schema.
    Create {
        /// Declared table to create.
        table: TableSnapshot,
    },
    /// The table exists in both but differs.
    Alter {
        /// Table name.
        table_name: String,
        /// Clauses to apply, in detection order.
        clauses: Vec<AlterClause>,
    },
    /// The table exists only in the live schema.
    Drop {
        /// Live table to drop.
        table_name: String,
    },
}

impl TableDiff {
    /// Renders this difference as a DDL statement without a trailing
    /// terminator. Returns an empty string when every clause is suppressed
    /// under the given modifiers, meaning no action is needed.
    #[must_use]
    pub fn statement(&self, mods: &StatementModifiers) -> String {
        match self {
            Self::Create { table } => table.create_statement(),
            Self::Drop { table_name } => format!("DROP TABLE {}", quote_ident(table_name)),
            Self::Alter {
                table_name,
                clauses,
            } => {
                let rendered: Vec<String> =
                    clauses.iter().filter_map(|c| c.render(mods)).collect();
                if rendered.is_empty() {
                    String::new()
                } else {
                    format!(
                        "ALTER TABLE {} {}",
                        quote_ident(table_name),
                        rendered.join(", ")
                    )
                }
            }
        }
    }
}

/// The ordered set of differences between two schema snapshots.
///
/// An absent `from` snapshot means the live schema does not exist yet; it is
/// treated as an empty schema, so every declared table becomes a create.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    /// Table differences: creates and alters in declared-table order, then
    /// drops in live-table order.
    pub table_diffs: Vec<TableDiff>,
}

impl SchemaDiff {
    /// Compares a live snapshot (`from`) against a declared snapshot (`to`).
    #[must_use]
    pub fn new(from: Option<&SchemaSnapshot>, to: &SchemaSnapshot) -> Self {
        let mut table_diffs = Vec::new();

        for table in &to.tables {
            match from.and_then(|f| f.get_table(&table.name)) {
                None => table_diffs.push(TableDiff::Create {
                    table: table.clone(),
                }),
                Some(live) => {
                    let clauses = diff_table(live, table);
                    if !clauses.is_empty() {
                        table_diffs.push(TableDiff::Alter {
                            table_name: table.name.clone(),
                            clauses,
                        });
                    }
                }
            }
        }

        if let Some(from) = from {
            for table in &from.tables {
                if to.get_table(&table.name).is_none() {
                    table_diffs.push(TableDiff::Drop {
                        table_name: table.name.clone(),
                    });
                }
            }
        }

        Self { table_diffs }
    }
}

/// Compares two versions of the same table into ALTER clauses.
fn diff_table(from: &TableSnapshot, to: &TableSnapshot) -> Vec<AlterClause> {
    let mut clauses = Vec::new();

    // Columns: adds and redefinitions in declared order, drops in live order
    for column in &to.columns {
        match from.get_column(&column.name) {
            None => clauses.push(AlterClause::AddColumn(column.clone())),
            Some(live) => {
                if live.definition() != column.definition() {
                    clauses.push(AlterClause::ModifyColumn(column.clone()));
                }
            }
        }
    }
    for column in &from.columns {
        if to.get_column(&column.name).is_none() {
            clauses.push(AlterClause::DropColumn(column.name.clone()));
        }
    }

    // Primary key
    if from.primary_key != to.primary_key {
        if !from.primary_key.is_empty() {
            clauses.push(AlterClause::DropPrimaryKey);
        }
        if !to.primary_key.is_empty() {
            clauses.push(AlterClause::AddPrimaryKey(to.primary_key.clone()));
        }
    }

    // Secondary indexes, compared by name; a changed index is drop + add
    for index in &to.indexes {
        match from.get_index(&index.name) {
            None => clauses.push(AlterClause::AddIndex(index.clone())),
            Some(live) => {
                if live != index {
                    clauses.push(AlterClause::DropIndex(index.name.clone()));
                    clauses.push(AlterClause::AddIndex(index.clone()));
                }
            }
        }
    }
    for index in &from.indexes {
        if to.get_index(&index.name).is_none() {
            clauses.push(AlterClause::DropIndex(index.name.clone()));
        }
    }

    // Auto-increment counter; rendering policy decides whether it's emitted
    if let Some(to_next) = to.next_auto_increment {
        if from.next_auto_increment != Some(to_next) {
            clauses.push(AlterClause::AutoIncrement {
                from: from.next_auto_increment,
                to: to_next,
            });
        }
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSnapshot;

    fn users_table() -> TableSnapshot {
        TableSnapshot::new("users")
            .column(
                ColumnSnapshot::new("id", "bigint unsigned")
                    .not_null()
                    .auto_increment(),
            )
            .column(ColumnSnapshot::new("email", "varchar(255)").not_null())
            .primary_key(vec!["id".to_string()])
    }

    fn mods() -> StatementModifiers {
        StatementModifiers::default()
    }

    #[test]
    fn test_missing_from_creates_everything() {
        let to = SchemaSnapshot::new("app_db").table(users_table());
        let diff = SchemaDiff::new(None, &to);

        assert_eq!(diff.table_diffs.len(), 1);
        let stmt = diff.table_diffs[0].statement(&mods());
        assert!(stmt.starts_with("CREATE TABLE `users`"));
    }

    #[test]
    fn test_dropped_table() {
        let from = SchemaSnapshot::new("app_db").table(users_table());
        let to = SchemaSnapshot::new("app_db");
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(diff.table_diffs.len(), 1);
        assert_eq!(diff.table_diffs[0].statement(&mods()), "DROP TABLE `users`");
    }

    #[test]
    fn test_added_column() {
        let from = SchemaSnapshot::new("app_db").table(users_table());
        let to = SchemaSnapshot::new("app_db").table(
            users_table().column(ColumnSnapshot::new("name", "varchar(100)")),
        );
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(diff.table_diffs.len(), 1);
        assert_eq!(
            diff.table_diffs[0].statement(&mods()),
            "ALTER TABLE `users` ADD COLUMN `name` varchar(100)"
        );
    }

    #[test]
    fn test_modified_column() {
        let from = SchemaSnapshot::new("app_db").table(users_table());
        let mut changed = users_table();
        changed.columns[1] = ColumnSnapshot::new("email", "varchar(320)").not_null();
        let to = SchemaSnapshot::new("app_db").table(changed);
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(
            diff.table_diffs[0].statement(&mods()),
            "ALTER TABLE `users` MODIFY COLUMN `email` varchar(320) NOT NULL"
        );
    }

    #[test]
    fn test_index_change_is_drop_and_add() {
        let idx_v1 = IndexSnapshot::new("idx_email", vec!["email".to_string()], false);
        let idx_v2 = IndexSnapshot::new("idx_email", vec!["email".to_string()], true);
        let from = SchemaSnapshot::new("app_db").table(users_table().index(idx_v1));
        let to = SchemaSnapshot::new("app_db").table(users_table().index(idx_v2));
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(
            diff.table_diffs[0].statement(&mods()),
            "ALTER TABLE `users` DROP KEY `idx_email`, ADD UNIQUE KEY `idx_email` (`email`)"
        );
    }

    #[test]
    fn test_auto_increment_increase_is_emitted() {
        let from = SchemaSnapshot::new("app_db").table(users_table().next_auto_increment(3));
        let to = SchemaSnapshot::new("app_db").table(users_table().next_auto_increment(5));
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(diff.table_diffs.len(), 1);
        assert_eq!(
            diff.table_diffs[0].statement(&mods()),
            "ALTER TABLE `users` AUTO_INCREMENT = 5"
        );
    }

    #[test]
    fn test_auto_increment_decrease_is_suppressed() {
        let from = SchemaSnapshot::new("app_db").table(users_table().next_auto_increment(5));
        let to = SchemaSnapshot::new("app_db").table(users_table().next_auto_increment(3));
        let diff = SchemaDiff::new(Some(&from), &to);

        // The difference is detected but renders to nothing under IfIncreased
        assert_eq!(diff.table_diffs.len(), 1);
        assert_eq!(diff.table_diffs[0].statement(&mods()), "");
    }

    #[test]
    fn test_auto_increment_policies() {
        let clause = AlterClause::AutoIncrement {
            from: Some(5),
            to: 3,
        };
        let never = StatementModifiers {
            next_auto_inc: NextAutoInc::Never,
        };
        let always = StatementModifiers {
            next_auto_inc: NextAutoInc::Always,
        };
        assert_eq!(clause.render(&never), None);
        assert_eq!(clause.render(&mods()), None);
        assert_eq!(clause.render(&always), Some("AUTO_INCREMENT = 3".to_string()));
    }

    #[test]
    fn test_no_changes() {
        let schema = SchemaSnapshot::new("app_db").table(users_table());
        let diff = SchemaDiff::new(Some(&schema), &schema.clone());
        assert!(diff.table_diffs.is_empty());
    }

    #[test]
    fn test_deterministic_ordering() {
        let from = SchemaSnapshot::new("app_db")
            .table(TableSnapshot::new("gone_a"))
            .table(TableSnapshot::new("gone_b"));
        let to = SchemaSnapshot::new("app_db")
            .table(TableSnapshot::new("new_z"))
            .table(TableSnapshot::new("new_a"));
        let diff = SchemaDiff::new(Some(&from), &to);

        // Creates in declared order, then drops in live order
        let names: Vec<String> = diff
            .table_diffs
            .iter()
            .map(|d| match d {
                TableDiff::Create { table } => table.name.clone(),
                TableDiff::Drop { table_name } => table_name.clone(),
                TableDiff::Alter { table_name, .. } => table_name.clone(),
            })
            .collect();
        assert_eq!(names, vec!["new_z", "new_a", "gone_a", "gone_b"]);
    }

    #[test]
    fn test_primary_key_change() {
        let from = SchemaSnapshot::new("app_db").table(users_table());
        let mut changed = users_table();
        changed.primary_key = vec!["email".to_string()];
        let to = SchemaSnapshot::new("app_db").table(changed);
        let diff = SchemaDiff::new(Some(&from), &to);

        assert_eq!(
            diff.table_diffs[0].statement(&mods()),
            "ALTER TABLE `users` DROP PRIMARY KEY, ADD PRIMARY KEY (`email`)"
        );
    }
}
