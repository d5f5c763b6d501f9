//! Message handling: guards, command dispatch and reply formatting.
//!
//! The interpreter owns its store and configuration; nothing here is global.
//! `handle_at` is a pure function of (message, store state, clock) to an
//! optional reply plus store mutations.

use crate::core::command::{self, Command};
use crate::core::config::BotConfig;
use crate::core::error::KarmaError;
use crate::core::output;
use crate::core::store::{KarmaRecord, KarmaStore, Ranking};
use crate::core::time;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const GREETING_REPLY: &str = "Hello";

pub const HELP_TEXT: &str = "I am a simple KarmaBot inspired by gal.

The commands that I know are:

[name]++    (add karma to [name])
[name]--    (subtract karma from [name])
!karma [name]    (get karma stats for [name])
!karmaleaders    (top karma totals)
!karmaplus    (most positive karma)
!karmaminus    (most negative karma)
!help    (get help)";

/// A chat message as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub chat_id: i64,
    /// Username or display name of the author.
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Unix-epoch seconds.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl IncomingMessage {
    pub fn new(chat_id: i64, sender: Option<&str>, text: &str) -> Self {
        Self {
            chat_id,
            sender: sender.map(|s| s.to_string()),
            text: Some(text.to_string()),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

pub struct Interpreter<S> {
    store: S,
    config: BotConfig,
    self_karma_pool: Vec<String>,
    rng: Mutex<StdRng>,
}

impl<S: KarmaStore> Interpreter<S> {
    pub fn new(store: S, config: BotConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            self_karma_pool: config.self_karma_pool(),
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn self_karma_pool(&self) -> &[String] {
        &self.self_karma_pool
    }

    /// Handle a message against the wall clock.
    pub fn handle(&self, message: &IncomingMessage) -> Result<Option<String>, KarmaError> {
        self.handle_at(message, time::now_epoch_secs())
    }

    /// Handle a message as if the current time were `now` (unix seconds).
    pub fn handle_at(
        &self,
        message: &IncomingMessage,
        now: u64,
    ) -> Result<Option<String>, KarmaError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(None);
        };

        if let Some(sent_at) = message.timestamp
            && time::is_stale(sent_at, now, self.config.freshness_threshold_seconds)
        {
            info!(
                chat_id = message.chat_id,
                age_secs = now.saturating_sub(sent_at),
                "dropping stale message"
            );
            return Ok(None);
        }

        debug!(
            chat_id = message.chat_id,
            sender = message.sender.as_deref().unwrap_or("-"),
            text = %output::compact_line(text, 80),
            "checking command"
        );
        let command = command::classify(text);
        debug!(command = command.kind(), "classified");

        self.dispatch(command, message.sender.as_deref())
    }

    /// Run a classified command.
    pub fn dispatch(
        &self,
        command: Command,
        sender: Option<&str>,
    ) -> Result<Option<String>, KarmaError> {
        let reply = match command {
            Command::Karma { target, delta } => {
                if target.is_empty() {
                    debug!("karma token without a name, nothing to update");
                    return Ok(None);
                }
                if is_self_karma(&target, sender) {
                    info!(name = %target, "self-karma attempt deflected");
                    return Ok(Some(self.pick_self_karma_reply()));
                }
                let record = self.store.bump(&target, delta)?;
                info!(
                    name = %record.name,
                    delta = delta.as_i64(),
                    net = record.net(),
                    "karma updated"
                );
                karma_reply(&target, &record)
            }
            Command::Stats { target } => match self.store.get(&target)? {
                Some(record) => stats_reply(&target, &record),
                None => format!("{} has not received karma yet.", target),
            },
            Command::Leaders => self.leaderboard(Ranking::Net)?,
            Command::TopPositive => self.leaderboard(Ranking::Positive)?,
            Command::TopNegative => self.leaderboard(Ranking::Negative)?,
            Command::Greeting => GREETING_REPLY.to_string(),
            Command::Help => HELP_TEXT.to_string(),
            Command::Malformed { usage } => usage.to_string(),
            Command::None => return Ok(None),
        };
        Ok(Some(reply))
    }

    /// Header plus the configured number of top entries for `by`.
    pub fn leaderboard(&self, by: Ranking) -> Result<String, KarmaError> {
        let ranked = self.store.rank(by)?;
        Ok(output::ranked_list(
            leaderboard_header(by),
            &ranked,
            self.config.leaderboard_size,
        ))
    }

    fn pick_self_karma_reply(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.self_karma_pool.choose(&mut *rng) {
            Some(reply) => reply.clone(),
            None => {
                warn!("self-karma pool is empty");
                String::new()
            }
        }
    }
}

pub fn leaderboard_header(by: Ranking) -> &'static str {
    match by {
        Ranking::Net => "Karma leaders:",
        Ranking::Positive => "Most positive karma:",
        Ranking::Negative => "Most negative karma:",
    }
}

fn is_self_karma(target: &str, sender: Option<&str>) -> bool {
    match sender {
        Some(sender) => {
            let sender = sender.trim().trim_start_matches('@').to_lowercase();
            !sender.is_empty() && sender == target.to_lowercase()
        }
        None => false,
    }
}

/// Possessive form: `chris'` but `sam's`.
pub fn possessive(name: &str) -> String {
    if name.to_lowercase().ends_with('s') {
        format!("{}'", name)
    } else {
        format!("{}'s", name)
    }
}

pub fn karma_reply(display_name: &str, record: &KarmaRecord) -> String {
    format!("{} karma is now {}", possessive(display_name), record.net())
}

pub fn stats_reply(display_name: &str, record: &KarmaRecord) -> String {
    format!(
        "{} has received karma {} times.\n{} positive karma and {} negative karma.\nFor a total karma of {}.",
        display_name,
        record.interactions(),
        record.positive_count,
        record.negative_count,
        record.net()
    )
}
