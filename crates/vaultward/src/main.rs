// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vaultward - upgrades a legacy plaintext vault to its encrypted form.
//!
//! This is the binary entry point for the migration CLI.

mod migrate;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vaultward_config::model::VaultwardConfig;

/// Vaultward - migrate a plaintext vault to encrypted storage.
#[derive(Parser, Debug)]
#[command(name = "vaultward", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this TOML file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Report which domains still hold plaintext.
    Assess {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the per-domain security status of the vault.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Back up and migrate every domain that still holds plaintext.
    Migrate {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Where to write the backup record (default: <backup_dir>/last-migration.json).
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Restore every domain named in a backup record.
    Rollback {
        /// Backup record to restore from.
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Delete the backups named in a backup record.
    DiscardBackups {
        /// Backup record whose backups to delete.
        #[arg(long)]
        record: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vaultward_config::load_and_validate_path(path),
        None => vaultward_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vaultward_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    tracing::debug!(root = %config.vault.root, "configuration loaded");

    let outcome = match cli.command {
        Some(Commands::Assess { json }) => status::run_assess(&config, json),
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain),
        Some(Commands::Migrate { json, record }) => {
            migrate::run_migrate(&config, json, record.as_deref()).await
        }
        Some(Commands::Rollback { record }) => migrate::run_rollback(&config, record.as_deref()),
        Some(Commands::DiscardBackups { record }) => {
            migrate::run_discard(&config, record.as_deref())
        }
        None => {
            println!("vaultward: use --help for available commands");
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("vaultward: {e}");
            std::process::exit(1);
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vaultward={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the backup record path, defaulting to the vault's backup directory.
fn record_path(config: &VaultwardConfig, explicit: Option<&std::path::Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => config
            .resolve(&config.layout.backup_dir)
            .join(migrate::RECORD_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["vaultward", "status", "--plain", "--config", "v.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("v.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: false,
                plain: true
            })
        ));
    }

    #[test]
    fn discard_backups_is_kebab_case() {
        let cli = Cli::try_parse_from(["vaultward", "discard-backups", "--record", "r.json"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::DiscardBackups { record: Some(_) })));
    }

    #[test]
    fn record_path_defaults_under_backup_dir() {
        let mut config = VaultwardConfig::default();
        config.vault.root = "/srv/vault".to_string();
        let path = record_path(&config, None);
        assert!(path.starts_with("/srv/vault"));
        assert!(path.ends_with(migrate::RECORD_FILE_NAME));

        let explicit = record_path(&config, Some(std::path::Path::new("/tmp/r.json")));
        assert_eq!(explicit, PathBuf::from("/tmp/r.json"));
    }
}
