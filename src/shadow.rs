//! Temporary schema lifecycle.
//!
//! Filesystem SQL is materialized into a scratch schema on the target
//! instance so that both sides of a comparison are real, introspectable
//! schemas. The scratch schema is scoped to one leaf-node diff: created
//! before comparison, unconditionally dropped after, even when population or
//! comparison fails partway.

use tracing::{debug, warn};

use crate::error::{DriftError, Result};
use crate::instance::Instance;
use crate::schema::SchemaSnapshot;

/// Name of the scratch schema. Never leaks into emitted DDL.
pub const SHADOW_SCHEMA: &str = "_schemadrift_tmp";

/// Guard over a populated scratch schema.
///
/// Obtain one with [`ShadowSchema::create`] and release it with
/// [`ShadowSchema::finish`], which drops the schema exactly once.
#[derive(Debug)]
pub struct ShadowSchema<'a, I: Instance> {
    instance: &'a I,
    dropped: bool,
}

impl<'a, I: Instance> ShadowSchema<'a, I> {
    /// Creates the scratch schema on `instance` and applies the given
    /// statements inside it.
    ///
    /// Any stale scratch schema left by a crashed prior run is dropped first.
    /// If population fails, the scratch schema is torn down before the
    /// population error is returned.
    pub async fn create(instance: &'a I, statements: &[String]) -> Result<ShadowSchema<'a, I>> {
        instance.drop_schema(SHADOW_SCHEMA).await?;
        instance.create_schema(SHADOW_SCHEMA).await?;
        let shadow = Self {
            instance,
            dropped: false,
        };

        if let Err(err) = instance.apply_in_schema(SHADOW_SCHEMA, statements).await {
            // The population error is the diagnostic that matters; a teardown
            // failure on this path is only logged.
            if let Err(drop_err) = shadow.finish().await {
                warn!(error = %drop_err, "failed to drop temporary schema after population error");
            }
            return Err(DriftError::Population {
                schema: SHADOW_SCHEMA.to_string(),
                source: Box::new(err),
            });
        }

        debug!(schema = SHADOW_SCHEMA, statements = statements.len(), "populated temporary schema");
        Ok(shadow)
    }

    /// Introspects the scratch schema into a snapshot (the declared side of
    /// the comparison).
    pub async fn snapshot(&self) -> Result<SchemaSnapshot> {
        self.instance
            .schema(SHADOW_SCHEMA)
            .await?
            .ok_or_else(|| DriftError::MissingShadowSchema(SHADOW_SCHEMA.to_string()))
    }

    /// Drops the scratch schema, consuming the guard.
    pub async fn finish(mut self) -> Result<()> {
        self.dropped = true;
        self.instance.drop_schema(SHADOW_SCHEMA).await
    }
}

impl<I: Instance> Drop for ShadowSchema<'_, I> {
    fn drop(&mut self) {
        if !self.dropped {
            warn!(
                schema = SHADOW_SCHEMA,
                "temporary schema guard dropped without teardown; schema may be leaked"
            );
        }
    }
}
