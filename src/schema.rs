//! Schema snapshot types.
//!
//! A snapshot is an in-memory representation of a schema's structure at a
//! point in time: its tables, their columns, keys, and storage options. The
//! same types describe both sides of a comparison, whether the snapshot was
//! obtained by live introspection or by materializing filesystem SQL into a
//! temporary schema.

/// Quotes an identifier with MySQL backticks.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Snapshot of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSnapshot {
    /// Column name.
    pub name: String,
    /// Raw MySQL column type, e.g. `bigint unsigned` or `varchar(255)`.
    pub type_name: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Default value, already rendered as a SQL literal or expression.
    pub default: Option<String>,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
}

impl ColumnSnapshot {
    /// Creates a new column snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            default: None,
            auto_increment: false,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value as an already-rendered SQL literal.
    #[must_use]
    pub fn default_literal(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Renders the column definition clause used in CREATE and ALTER TABLE.
    #[must_use]
    pub fn definition(&self) -> String {
        let mut parts = vec![quote_ident(&self.name), self.type_name.clone()];
        if !self.nullable {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", default));
        }
        if self.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }
        parts.join(" ")
    }
}

/// Snapshot of a secondary index. The primary key is tracked separately on
/// [`TableSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    /// Index name.
    pub name: String,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    pub unique: bool,
}

impl IndexSnapshot {
    /// Creates a new index snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            unique,
        }
    }

    /// Renders the index definition clause used in CREATE and ALTER TABLE.
    #[must_use]
    pub fn definition(&self) -> String {
        let quoted: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let kind = if self.unique { "UNIQUE KEY" } else { "KEY" };
        format!("{} {} ({})", kind, quote_ident(&self.name), quoted.join(", "))
    }
}

/// Snapshot of a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,
    /// Column definitions, in ordinal order.
    pub columns: Vec<ColumnSnapshot>,
    /// Primary key column(s), empty when the table has none.
    pub primary_key: Vec<String>,
    /// Secondary indexes.
    pub indexes: Vec<IndexSnapshot>,
    /// Storage engine, when known.
    pub engine: Option<String>,
    /// Next auto-increment counter value, when the table has one.
    pub next_auto_increment: Option<u64>,
}

impl TableSnapshot {
    /// Creates a new empty table snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            engine: None,
            next_auto_increment: None,
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSnapshot) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key columns.
    #[must_use]
    pub fn primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = columns;
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, index: IndexSnapshot) -> Self {
        self.indexes.push(index);
        self
    }

    /// Sets the storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the next auto-increment counter value.
    #[must_use]
    pub fn next_auto_increment(mut self, value: u64) -> Self {
        self.next_auto_increment = Some(value);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSnapshot> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Gets a secondary index by name.
    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&IndexSnapshot> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Renders the full CREATE TABLE statement for this table, without a
    /// trailing terminator.
    #[must_use]
    pub fn create_statement(&self) -> String {
        let mut clauses: Vec<String> = self.columns.iter().map(ColumnSnapshot::definition).collect();

        if !self.primary_key.is_empty() {
            let quoted: Vec<String> = self.primary_key.iter().map(|c| quote_ident(c)).collect();
            clauses.push(format!("PRIMARY KEY ({})", quoted.join(", ")));
        }

        for index in &self.indexes {
            clauses.push(index.definition());
        }

        let mut sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            quote_ident(&self.name),
            clauses.join(",\n  ")
        );

        if let Some(engine) = &self.engine {
            sql.push_str(&format!(" ENGINE={}", engine));
        }
        if let Some(next) = self.next_auto_increment {
            if next > 1 {
                sql.push_str(&format!(" AUTO_INCREMENT={}", next));
            }
        }

        sql
    }
}

/// Snapshot of a whole schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    /// Schema name.
    pub name: String,
    /// All tables in the schema.
    pub tables: Vec<TableSnapshot>,
}

impl SchemaSnapshot {
    /// Creates a new empty schema snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: TableSnapshot) -> Self {
        self.tables.push(table);
        self
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Renders the CREATE DATABASE statement for this schema, without a
    /// trailing terminator.
    #[must_use]
    pub fn create_statement(&self) -> String {
        format!("CREATE DATABASE {}", quote_ident(&self.name))
    }
}
