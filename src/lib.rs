//! Declarative schema management for MySQL.
//!
//! `schemadrift` compares the schemas on database instance(s) to a
//! filesystem representation of them: a hierarchy of directories whose leaf
//! nodes each map to one or more schemas defined by `*.sql` files. The output
//! is a series of DDL statements that, if run on the instances, would cause
//! their schemas to match the ones in the filesystem.
//!
//! # Architecture
//!
//! The comparison pipeline consists of several components:
//!
//! - **Walker** - Recursively descends the directory hierarchy, dispatching
//!   leaf directories and deduplicating nodes reachable via multiple paths
//! - **Shadow** - Materializes filesystem SQL into a temporary schema on the
//!   target instance and guarantees its removal afterwards
//! - **Differ** - Compares two schema snapshots into table-level differences
//! - **Emitter** - Renders differences as DDL on an output stream
//! - **Instance** - Connectivity and `information_schema` introspection
//!
//! # CLI Usage
//!
//! ```bash
//! # Diff the schema hierarchy rooted at the current directory
//! schemadrift diff
//!
//! # Diff a specific hierarchy against an explicit host
//! schemadrift --host db1.example.com:3306 diff --dir ./schemas
//! ```

pub mod config;
pub mod differ;
pub mod dir;
pub mod emitter;
pub mod error;
pub mod hostaddr;
pub mod instance;
pub mod schema;
pub mod shadow;
pub mod walker;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{Config, Options, TargetSpec};
    pub use crate::differ::{NextAutoInc, SchemaDiff, StatementModifiers, TableDiff};
    pub use crate::dir::SchemaDir;
    pub use crate::emitter::DiffEmitter;
    pub use crate::error::{DriftError, Result};
    pub use crate::instance::{Connector, Instance, MySqlConnector, MySqlInstance};
    pub use crate::schema::{ColumnSnapshot, IndexSnapshot, SchemaSnapshot, TableSnapshot};
    pub use crate::shadow::{ShadowSchema, SHADOW_SCHEMA};
    pub use crate::walker::DiffRunner;
}
