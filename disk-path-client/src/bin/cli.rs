// SPDX-License-Identifier: GPL-3.0-only

//! CLI wrapper around disk-path-client for manual operations on local datastores

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use disk_path_client::adapters::LocalDatacenter;
use disk_path_client::{
    ClientConfig, DatastoreBrowser, DatastorePath, DiskPath, PathOperation, wait_for_path,
};
use serde_json::json;

/// Disk path management for datastores
#[derive(Parser)]
#[command(name = "disk-path-cli")]
#[command(about = "CLI tool for disk path operations", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, short, default_value = "disk-path.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a disk path without touching any datastore
    Validate {
        /// Candidate disk path
        path: String,
    },
    /// Create a disk path under a datastore root
    Create {
        /// Datastore name (defaults to the configured default)
        #[arg(long)]
        datastore: Option<String>,
        /// Poll until the path is visible
        #[arg(long)]
        wait: bool,
        /// Disk path to create
        path: String,
    },
    /// Delete a disk path from a datastore root
    Delete {
        /// Datastore name (defaults to the configured default)
        #[arg(long)]
        datastore: Option<String>,
        /// Poll until the path is gone
        #[arg(long)]
        wait: bool,
        /// Disk path to delete
        path: String,
    },
    /// Report whether a disk path exists
    Exists {
        /// Datastore name (defaults to the configured default)
        #[arg(long)]
        datastore: Option<String>,
        /// Disk path to look up
        path: String,
    },
}

async fn run_structural(
    config_path: &Path,
    operation: PathOperation,
    datastore: Option<String>,
    wait: bool,
    path: String,
) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    let datastore = config.resolve_datastore(datastore.as_deref())?;
    let datacenter = LocalDatacenter::from_config(&config);

    let mut operator = config.operator(Arc::new(datacenter.clone()))?;
    operator.start_session().await?;
    let outcome = operator.execute(operation, &datastore, &path).await?;

    let target = DatastorePath::new(datastore, path);
    if wait {
        let expected = operation == PathOperation::Create;
        wait_for_path(&datacenter, &target, expected, config.wait)
            .await
            .with_context(|| format!("waiting for {target} to settle"))?;
    }

    println!(
        "{}",
        json!({
            "success": true,
            "operation": operation.name(),
            "outcome": outcome.name(),
            "target": target.to_string(),
        })
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => match DiskPath::parse(&path) {
            Ok(path) => println!("{}", json!({ "valid": true, "path": path.as_str() })),
            Err(reason) => {
                println!("{}", json!({ "valid": false, "reason": reason.to_string() }));
                std::process::exit(1);
            }
        },
        Commands::Create {
            datastore,
            wait,
            path,
        } => run_structural(&cli.config, PathOperation::Create, datastore, wait, path).await?,
        Commands::Delete {
            datastore,
            wait,
            path,
        } => run_structural(&cli.config, PathOperation::Delete, datastore, wait, path).await?,
        Commands::Exists { datastore, path } => {
            let config = ClientConfig::load(&cli.config)?;
            let datastore = config.resolve_datastore(datastore.as_deref())?;
            let target = DatastorePath::new(datastore, DiskPath::parse(&path)?.into_inner());
            let exists = LocalDatacenter::from_config(&config)
                .path_exists(&target)
                .await?;
            println!(
                "{}",
                json!({ "exists": exists, "target": target.to_string() })
            );
        }
    }

    Ok(())
}
