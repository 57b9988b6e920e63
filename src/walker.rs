//! Hierarchy walker: the comparison orchestrator.
//!
//! Recursively descends the schema definition hierarchy. Internal nodes are
//! marked visited before their children are processed, so a directory
//! reachable through two different parent links (symlink cycles or aliasing)
//! is processed exactly once. Each leaf node is diffed against every resolved
//! target, with the temporary schema created and torn down around the
//! comparison on every exit path.
//!
//! Traversal is strictly sequential: no targets, schemas, or subdirectories
//! are processed in parallel. Any error aborts the remainder of the walk and
//! propagates unchanged.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::config::{Config, TargetSpec};
use crate::differ::StatementModifiers;
use crate::dir::SchemaDir;
use crate::emitter::DiffEmitter;
use crate::error::{DriftError, Result};
use crate::instance::{Connector, Instance};
use crate::shadow::ShadowSchema;

/// Drives a full diff run over a schema definition hierarchy.
pub struct DiffRunner<C: Connector, W: Write> {
    connector: C,
    emitter: DiffEmitter<W>,
    visited: HashSet<PathBuf>,
}

impl<C: Connector, W: Write> DiffRunner<C, W> {
    /// Creates a runner writing DDL to `out` under the given modifiers.
    pub fn new(connector: C, out: W, modifiers: StatementModifiers) -> Self {
        Self {
            connector,
            emitter: DiffEmitter::new(out, modifiers),
            visited: HashSet::new(),
        }
    }

    /// Walks the hierarchy rooted at `dir`, diffing every leaf node.
    pub async fn run(&mut self, dir: &SchemaDir, config: &Config) -> Result<()> {
        self.walk(dir.clone(), config.clone()).await
    }

    /// Consumes the runner, returning the output sink.
    pub fn into_inner(self) -> W {
        self.emitter.into_inner()
    }

    fn walk(&mut self, dir: SchemaDir, config: Config) -> LocalBoxFuture<'_, Result<()>> {
        async move {
            // Mark this physical node visited before descending into it, so
            // aliased paths are processed at most once
            let canonical = dir.canonical_path()?;
            if !self.visited.insert(canonical) {
                debug!(dir = %dir, "already visited, skipping");
                return Ok(());
            }

            if dir.is_leaf()? {
                return self.process_leaf(&dir, &config).await;
            }

            for subdir in dir.subdirs()? {
                let child = config.child(&subdir)?;
                self.walk(subdir, child).await?;
            }
            Ok(())
        }
        .boxed_local()
    }

    /// Diffs one leaf directory against each of its resolved targets.
    async fn process_leaf(&mut self, dir: &SchemaDir, config: &Config) -> Result<()> {
        let targets = config.targets(dir)?;
        let statements = dir.sql_statements()?;
        debug!(dir = %dir, targets = targets.len(), statements = statements.len(), "processing leaf");

        for spec in &targets {
            let instance = self.connector.instance(spec)?;
            if let Err(err) = instance.can_connect().await {
                return Err(DriftError::Connectivity {
                    instance: spec.to_string(),
                    source: Box::new(err),
                });
            }

            let shadow = ShadowSchema::create(&instance, &statements).await?;
            let outcome = self.emit_target(dir, spec, &instance, &shadow).await;
            let teardown = shadow.finish().await;
            // The comparison error is the deeper diagnostic; surface it
            // before any teardown error
            outcome?;
            teardown?;
        }

        Ok(())
    }

    /// Emits the diff for every schema name on one target, in resolver order.
    async fn emit_target(
        &mut self,
        dir: &SchemaDir,
        spec: &TargetSpec,
        instance: &C::Instance,
        shadow: &ShadowSchema<'_, C::Instance>,
    ) -> Result<()> {
        for schema_name in &spec.schema_names {
            // Header first: a failed introspection still leaves a marker on
            // the stream identifying which comparison broke
            self.emitter
                .emit_header(&instance.to_string(), schema_name, dir)?;
            let from = instance.schema(schema_name).await?;
            let to = shadow.snapshot().await?;
            self.emitter.emit_diff(schema_name, from.as_ref(), &to)?;
        }
        Ok(())
    }
}
