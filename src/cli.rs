//! CLI struct definitions for the karmabot command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use crate::core::store::Ranking;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "karmabot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keeps score of name++ and name-- in chat and answers karma queries."
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./karmabot.toml; a missing file means defaults).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Karma database path (overrides config and KARMABOT_DB).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,
    /// Keep karma in memory only; nothing is written to disk.
    #[clap(long, global = true)]
    pub ephemeral: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Read JSON messages from stdin, one per line, and write JSON replies to stdout.
    Serve,
    /// Handle a single message and print the reply, if any.
    Say {
        /// Chat the message belongs to.
        #[clap(long, default_value_t = 0)]
        chat: i64,
        /// Author of the message (used by the self-karma guard).
        #[clap(long)]
        sender: Option<String>,
        /// Message text.
        #[clap(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print karma stats for a name.
    Stats {
        name: String,
    },
    /// Print a leaderboard.
    Leaders {
        /// Ranking key.
        #[clap(long, value_enum, default_value_t = Ranking::Net)]
        by: Ranking,
    },
    /// Write a default config file and create the karma database.
    Init {
        /// Overwrite an existing config file.
        #[clap(long)]
        force: bool,
    },
    /// Print a JSON description of the bot's commands and storage.
    Schema,
}
