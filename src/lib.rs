//! karmabot: keeps score of `name++` / `name--` in chat.
//!
//! The bot watches chat text for karma tokens, keeps per-name positive and
//! negative counters, and answers stats and leaderboard queries.
//!
//! # Architecture
//!
//! - [`core::command`] turns raw text into one [`core::command::Command`]
//!   through an ordered rule table.
//! - [`core::interpreter`] applies the freshness and self-karma guards,
//!   dispatches commands against a [`core::store::KarmaStore`] and formats
//!   replies. The store and config are injected; there is no global state.
//! - [`plugins::karma`] stores counters in SQLite behind the
//!   [`core::broker::DbBroker`], which serializes all access. Karma updates
//!   are a single upsert statement, so concurrent `++` on one name never lose
//!   an update.
//! - [`core::transport`] is a JSON-lines stand-in for a chat network.
//!
//! # Examples
//!
//! ```bash
//! karmabot init
//! karmabot say --sender carol "bob++"
//! karmabot leaders --by positive
//! echo '{"chat_id":1,"sender":"carol","text":"bob++"}' | karmabot serve
//! ```

pub mod core;
pub mod plugins;

mod cli;

use crate::core::command::Command as BotCommand;
use crate::core::config::{self, Config};
use crate::core::error::KarmaError;
use crate::core::interpreter::{IncomingMessage, Interpreter};
use crate::core::store::KarmaStore;
use crate::core::{broker::DbBroker, time, transport};
use crate::plugins::{karma, memory::MemoryKarmaStore};
use clap::Parser;
use cli::{Cli, Command};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve the effective configuration: file, then `KARMABOT_DB`, then `--db`.
pub fn resolve_config(config_path: &Path, db_override: Option<&Path>) -> Result<Config, KarmaError> {
    let mut config = config::load_config(config_path)?;
    config.apply_env();
    if let Some(db) = db_override {
        config.store.path = db.to_path_buf();
    }
    Ok(config)
}

/// Open the configured store, or an in-memory one when `ephemeral`.
pub fn open_store(config: &Config, ephemeral: bool) -> Result<Box<dyn KarmaStore>, KarmaError> {
    if ephemeral {
        tracing::info!("using in-memory karma store");
        return Ok(Box::new(MemoryKarmaStore::new()));
    }
    let mut broker = DbBroker::new(&config.store.path);
    if config.store.audit_log {
        broker = broker.with_audit_log();
    }
    tracing::info!(db = %config.store.path.display(), "opening karma store");
    Ok(Box::new(karma::SqliteKarmaStore::from_broker(broker)?))
}

pub fn run() -> Result<(), KarmaError> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE_NAME));
    let config = resolve_config(&config_path, cli.db.as_deref())?;

    match cli.command {
        Command::Init { force } => init(&config_path, &config, force),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&karma::schema())?);
            Ok(())
        }
        Command::Serve => {
            let store = open_store(&config, cli.ephemeral)?;
            let interpreter = Interpreter::new(store, config.bot);
            let sink = transport::JsonLinesSink::new(io::stdout());
            transport::serve(io::stdin().lock(), &interpreter, &sink, time::now_epoch_secs)?;
            Ok(())
        }
        Command::Say { chat, sender, text } => {
            let store = open_store(&config, cli.ephemeral)?;
            let interpreter = Interpreter::new(store, config.bot);
            let message = IncomingMessage::new(chat, sender.as_deref(), &text.join(" "));
            if let Some(reply) = interpreter.handle(&message)? {
                println!("{}", reply);
            }
            Ok(())
        }
        Command::Stats { name } => {
            let store = open_store(&config, cli.ephemeral)?;
            let interpreter = Interpreter::new(store, config.bot);
            let target = name.strip_prefix('@').unwrap_or(&name).to_string();
            if target.is_empty() {
                return Err(KarmaError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            if let Some(reply) = interpreter.dispatch(BotCommand::Stats { target }, None)? {
                println!("{}", reply);
            }
            Ok(())
        }
        Command::Leaders { by } => {
            let store = open_store(&config, cli.ephemeral)?;
            let interpreter = Interpreter::new(store, config.bot);
            println!("{}", interpreter.leaderboard(by)?);
            Ok(())
        }
    }
}

fn init(config_path: &Path, config: &Config, force: bool) -> Result<(), KarmaError> {
    if config_path.exists() && !force {
        return Err(KarmaError::ValidationError(format!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        )));
    }
    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, config.to_toml()?)?;
    println!("Config written to {}", config_path.display());

    open_store(config, false)?;
    println!(
        "Karma database initialized at {}",
        config.store.path.display()
    );
    Ok(())
}
