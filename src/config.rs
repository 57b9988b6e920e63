//! Configuration hierarchy and target resolution.
//!
//! Every directory in the schema hierarchy may carry a `.schemadrift.toml`
//! file. A child directory inherits its parent's options and overrides
//! individual keys with its own file; CLI flags override the root. A leaf
//! node's merged options determine which (instance, schema names) pairs it is
//! diffed against.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dir::SchemaDir;
use crate::error::{DriftError, Result};
use crate::hostaddr::split_host_optional_port_and_schema;

/// Name of the per-directory config file.
pub const CONFIG_FILE: &str = ".schemadrift.toml";

/// Default MySQL port when neither the host token nor the options name one.
pub const DEFAULT_PORT: u16 = 3306;

/// Connection and schema options, as declared in a config file or on the
/// command line. All fields are optional so that partial files can override
/// individual keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Comma-separated host tokens, each `host`, `host:port`, or
    /// `host:port|schema`.
    pub host: Option<String>,
    /// Default port for host tokens that don't name one.
    pub port: Option<u16>,
    /// Connection user.
    pub user: Option<String>,
    /// Connection password.
    pub password: Option<String>,
    /// Comma-separated schema names to diff on each target.
    pub schema: Option<String>,
}

impl Options {
    /// Loads the options file from a directory, if one exists.
    pub fn load(dir: &Path) -> Result<Option<Options>> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let options = toml::from_str(&contents).map_err(|err| DriftError::Config {
            path,
            message: err.to_string(),
        })?;
        Ok(Some(options))
    }

    /// Overlays `other` on top of `self`: any key set in `other` wins.
    #[must_use]
    pub fn overlaid_with(mut self, other: Options) -> Options {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        self
    }
}

/// A resolved (instance address, schema names) pairing for one leaf node.
/// Resolution is pure; connecting happens later in the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Hostname, IPv4, or bracket-wrapped IPv6 address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Connection user.
    pub user: String,
    /// Connection password, when configured.
    pub password: Option<String>,
    /// Schema names to diff on this instance, in declaration order.
    pub schema_names: Vec<String>,
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Merged configuration for one node of the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Config {
    options: Options,
}

impl Config {
    /// Builds the root configuration: the root directory's config file (if
    /// any) overlaid with command-line overrides.
    pub fn root(dir: &SchemaDir, overrides: Options) -> Result<Self> {
        let base = Options::load(dir.path())?.unwrap_or_default();
        Ok(Self {
            options: base.overlaid_with(overrides),
        })
    }

    /// Builds the configuration for a child directory: this node's options
    /// overlaid with the child's config file, if any.
    pub fn child(&self, dir: &SchemaDir) -> Result<Self> {
        let options = match Options::load(dir.path())? {
            Some(child) => self.options.clone().overlaid_with(child),
            None => self.options.clone(),
        };
        Ok(Self { options })
    }

    /// Returns the merged options for this node.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolves the ordered list of targets for a leaf directory.
    ///
    /// One target per comma-separated host token. Schema names come from the
    /// token's `|schema` part when present, else from the `schema` option,
    /// else the leaf directory's own name.
    pub fn targets(&self, leaf: &SchemaDir) -> Result<Vec<TargetSpec>> {
        let host_option = self.options.host.as_deref().ok_or_else(|| DriftError::NoHost {
            dir: leaf.to_string(),
        })?;

        let user = self.options.user.clone().unwrap_or_else(|| "root".to_string());
        let mut targets = Vec::new();

        for token in host_option.split(',').map(str::trim) {
            let (host, port, schema) = split_host_optional_port_and_schema(token)?;
            let port = if port == 0 {
                self.options.port.unwrap_or(DEFAULT_PORT)
            } else {
                port
            };

            let schema_names: Vec<String> = if !schema.is_empty() {
                vec![schema]
            } else if let Some(option) = &self.options.schema {
                option.split(',').map(|s| s.trim().to_string()).collect()
            } else {
                vec![leaf.name()]
            };

            targets.push(TargetSpec {
                host,
                port,
                user: user.clone(),
                password: self.options.password.clone(),
                schema_names,
            });
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_with(options: Options) -> Config {
        Config { options }
    }

    #[test]
    fn test_overlay_precedence() {
        let parent = Options {
            host: Some("db1".to_string()),
            port: Some(3307),
            user: Some("deploy".to_string()),
            password: None,
            schema: None,
        };
        let child = Options {
            host: Some("db2".to_string()),
            ..Options::default()
        };

        let merged = parent.overlaid_with(child);
        assert_eq!(merged.host.as_deref(), Some("db2"));
        assert_eq!(merged.port, Some(3307));
        assert_eq!(merged.user.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_child_inherits_parent_options() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE),
            "host = \"db1\"\nuser = \"deploy\"\n",
        )
        .unwrap();
        let sub = root.path().join("app_db");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join(CONFIG_FILE), "schema = \"app_db_shard0\"\n").unwrap();

        let root_dir = SchemaDir::new(root.path());
        let config = Config::root(&root_dir, Options::default()).unwrap();
        let child = config.child(&SchemaDir::new(&sub)).unwrap();

        assert_eq!(child.options().host.as_deref(), Some("db1"));
        assert_eq!(child.options().user.as_deref(), Some("deploy"));
        assert_eq!(child.options().schema.as_deref(), Some("app_db_shard0"));
    }

    #[test]
    fn test_invalid_config_file() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join(CONFIG_FILE), "host = [not toml").unwrap();

        let err = Config::root(&SchemaDir::new(root.path()), Options::default());
        assert!(matches!(err, Err(DriftError::Config { .. })));
    }

    #[test]
    fn test_targets_default_schema_is_leaf_name() {
        let config = config_with(Options {
            host: Some("db1".to_string()),
            ..Options::default()
        });
        let leaf = SchemaDir::new("/schemas/app_db");

        let targets = config.targets(&leaf).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].host, "db1");
        assert_eq!(targets[0].port, DEFAULT_PORT);
        assert_eq!(targets[0].schema_names, vec!["app_db"]);
        assert_eq!(targets[0].to_string(), "db1:3306");
    }

    #[test]
    fn test_targets_schema_from_host_token() {
        let config = config_with(Options {
            host: Some("db1:3307|orders".to_string()),
            schema: Some("ignored".to_string()),
            ..Options::default()
        });
        let leaf = SchemaDir::new("/schemas/app_db");

        let targets = config.targets(&leaf).unwrap();
        assert_eq!(targets[0].port, 3307);
        assert_eq!(targets[0].schema_names, vec!["orders"]);
    }

    #[test]
    fn test_targets_schema_option_list() {
        let config = config_with(Options {
            host: Some("db1".to_string()),
            schema: Some("app_db, app_db_audit".to_string()),
            ..Options::default()
        });
        let leaf = SchemaDir::new("/schemas/app_db");

        let targets = config.targets(&leaf).unwrap();
        assert_eq!(targets[0].schema_names, vec!["app_db", "app_db_audit"]);
    }

    #[test]
    fn test_targets_multiple_hosts_keep_order() {
        let config = config_with(Options {
            host: Some("db2, db1:3307".to_string()),
            ..Options::default()
        });
        let leaf = SchemaDir::new("/schemas/app_db");

        let targets = config.targets(&leaf).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].to_string(), "db2:3306");
        assert_eq!(targets[1].to_string(), "db1:3307");
    }

    #[test]
    fn test_targets_without_host_fails() {
        let config = config_with(Options::default());
        let leaf = SchemaDir::new("/schemas/app_db");
        assert!(matches!(
            config.targets(&leaf),
            Err(DriftError::NoHost { .. })
        ));
    }
}
