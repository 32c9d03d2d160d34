//! chanauth-admin: manage accounts in a chanauth SQLite store.
//!
//! The first `admin` can only be granted out of band; this is that band.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chanauth_core::{Account, PasswordHasher};
use chanauth_store::{AccountFilter, InsertResult, SqliteStore, Store, StoreExt, UpsertResult};

#[derive(Debug, Parser)]
#[command(name = "chanauth-admin", about = "Manage chanauth accounts and permissions")]
struct Cli {
    /// Path to the SQLite account database.
    #[arg(long, env = "CHANAUTH_DB", default_value = "chanauth.db")]
    db: PathBuf,

    /// Password salt. Must match the bot's.
    #[arg(long, env = "CHANAUTH_SALT", default_value = "", hide_env_values = true)]
    salt: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register { name: String, password: String },

    /// Add a permission to an account.
    Grant { name: String, perm: String },

    /// Remove a permission from an account.
    Revoke { name: String, perm: String },

    /// Show one account.
    Show {
        name: String,
        /// Print the account as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List all accounts.
    List,

    /// Set an account's password, creating the account if needed.
    Passwd { name: String, password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("opening {}", cli.db.display()))?;

    for line in run(&store, &PasswordHasher::new(cli.salt.clone()), cli.command).await? {
        println!("{line}");
    }
    Ok(())
}

/// Execute one command, returning the lines to print.
async fn run<S: Store>(store: &S, hasher: &PasswordHasher, command: Command) -> Result<Vec<String>> {
    match command {
        Command::Register { name, password } => {
            match store.insert(&name, &hasher.hash(&password)).await? {
                InsertResult::Inserted(id) => {
                    info!(account = %name, %id, "account registered");
                    Ok(vec![format!("registered '{name}' ({id})")])
                }
                InsertResult::AlreadyExists => bail!("account '{name}' already exists"),
            }
        }

        Command::Grant { name, perm } => {
            let Some(account) = store.find_by_name(&name).await? else {
                bail!("account '{name}' does not exist");
            };
            if account.has_perm(&perm) {
                return Ok(vec![format!("'{name}' already has '{perm}'")]);
            }
            store
                .push_permission(&AccountFilter::by_name(&name), &perm)
                .await?;
            info!(account = %name, perm = %perm, "permission granted");
            Ok(vec![format!("granted '{perm}' to '{name}'")])
        }

        Command::Revoke { name, perm } => {
            let result = store
                .pull_permission(&AccountFilter::by_name(&name), &perm)
                .await?;
            if !result.matched_any() {
                bail!("account '{name}' does not exist");
            }
            info!(account = %name, perm = %perm, "permission revoked");
            Ok(vec![format!("revoked '{perm}' from '{name}'")])
        }

        Command::Show { name, json } => {
            let Some(account) = store.find_by_name(&name).await? else {
                bail!("account '{name}' does not exist");
            };
            if json {
                Ok(vec![serde_json::to_string_pretty(&account)?])
            } else {
                Ok(vec![describe(&account)])
            }
        }

        Command::List => Ok(store.list().await?.iter().map(describe).collect()),

        Command::Passwd { name, password } => {
            match store.upsert_password(&name, &hasher.hash(&password)).await? {
                UpsertResult::Updated => Ok(vec![format!("password changed for '{name}'")]),
                UpsertResult::Inserted(id) => Ok(vec![format!("registered '{name}' ({id})")]),
            }
        }
    }
}

fn describe(account: &Account) -> String {
    format!("{} {}: {}", account.id, account.name, account.perms_display())
}
