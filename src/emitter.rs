//! DDL output rendering.
//!
//! The emitter turns one (instance, schema) comparison into a block of text
//! on the output stream: a header comment, the reconciling DDL statements
//! each terminated by `;`, and a trailing blank line delimiting the block.
//! This exact shape is a contract for operators piping output into a SQL
//! client. Statement order is whatever the comparison engine produced; the
//! emitter never reorders or deduplicates. The header is a separate call so
//! the walker can write it before fetching either side of the comparison.

use std::io::Write;

use crate::differ::{SchemaDiff, StatementModifiers};
use crate::dir::SchemaDir;
use crate::error::Result;
use crate::schema::SchemaSnapshot;

/// Renders schema diffs onto an output sink.
#[derive(Debug)]
pub struct DiffEmitter<W: Write> {
    out: W,
    modifiers: StatementModifiers,
}

impl<W: Write> DiffEmitter<W> {
    /// Creates an emitter writing to `out` under the given modifiers.
    pub fn new(out: W, modifiers: StatementModifiers) -> Self {
        Self { out, modifiers }
    }

    /// Emits the header comment for one (instance, schema name) pair.
    ///
    /// Written before either side is fetched, so a failed introspection still
    /// leaves the header on the stream identifying which comparison broke.
    pub fn emit_header(&mut self, instance: &str, schema_name: &str, dir: &SchemaDir) -> Result<()> {
        writeln!(self.out, "-- Diff of {} {} vs {}/*.sql", instance, schema_name, dir)?;
        Ok(())
    }

    /// Emits the statements and trailing blank line for one comparison.
    ///
    /// When the live schema (`from`) does not exist, a schema-creation
    /// statement is synthesized from `schema_name` alone — never from the
    /// temporary schema's internal name.
    pub fn emit_diff(
        &mut self,
        schema_name: &str,
        from: Option<&SchemaSnapshot>,
        to: &SchemaSnapshot,
    ) -> Result<()> {
        let diff = SchemaDiff::new(from, to);

        if from.is_none() {
            let declared = SchemaSnapshot::new(schema_name);
            writeln!(self.out, "{};", declared.create_statement())?;
        }

        for table_diff in &diff.table_diffs {
            let statement = table_diff.statement(&self.modifiers);
            if !statement.is_empty() {
                writeln!(self.out, "{};", statement)?;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }

    /// Consumes the emitter, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
