//! schemadrift CLI
//!
//! Command-line tool for diffing filesystem schema definitions against live
//! MySQL instances.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use schemadrift::prelude::*;

/// Declarative schema management for MySQL.
#[derive(Parser)]
#[command(name = "schemadrift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host(s) to compare against, overriding config files.
    /// Each comma-separated token is host[:port][|schema].
    #[arg(long, env = "SCHEMADRIFT_HOST")]
    host: Option<String>,

    /// Default port for hosts that don't name one.
    #[arg(long)]
    port: Option<u16>,

    /// Connection user.
    #[arg(short, long)]
    user: Option<String>,

    /// Connection password.
    #[arg(short, long, env = "SCHEMADRIFT_PASSWORD")]
    password: Option<String>,

    /// Schema name(s) to diff, comma-separated.
    #[arg(short, long)]
    schema: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a DB instance's schemas and tables to the filesystem.
    ///
    /// The output is a series of DDL commands that, if run on the
    /// instance(s), would cause their schemas to match the ones in the
    /// filesystem.
    Diff {
        /// Root of the schema definition hierarchy.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; DDL goes to stdout, diagnostics to stderr
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let overrides = Options {
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli.password,
        schema: cli.schema,
    };

    match cli.command {
        Commands::Diff { dir } => {
            let root = SchemaDir::new(dir);
            let config = Config::root(&root, overrides)?;
            debug!(dir = %root, "starting diff");

            let modifiers = StatementModifiers {
                next_auto_inc: NextAutoInc::IfIncreased,
            };
            let mut runner = DiffRunner::new(MySqlConnector::new(), io::stdout().lock(), modifiers);
            runner.run(&root, &config).await?;
        }
    }

    Ok(())
}
