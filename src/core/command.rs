//! Command recognition for incoming chat text.
//!
//! `classify` turns free-form text into exactly one `Command` by walking an
//! ordered rule table. The first rule that matches wins; a karma token beats
//! every `!`-prefixed command, so `!karma++` is karma, not a stats query.

use crate::core::store::Delta;
use regex::Regex;
use std::sync::LazyLock;

/// Trailing markers that turn a token into a karma operation.
const PLUS_MARKER: &str = "++";
const MINUS_MARKER: &str = "--";
const EM_DASH_MARKER: &str = "\u{2014}";

static KARMA_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+(\+\+|--|\x{2014})$").expect("karma token pattern is valid")
});

pub const STATS_USAGE: &str = "Usage: !karma [name]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `name++` / `name--` / `name—`; target is normalized (lowercase, markers and `@` removed)
    /// and may be empty for tokens like `@++`.
    Karma { target: String, delta: Delta },
    /// `!karma name`; target keeps its casing, minus a leading `@`.
    Stats { target: String },
    Leaders,
    TopPositive,
    TopNegative,
    Greeting,
    Help,
    /// A recognized command missing its argument.
    Malformed { usage: &'static str },
    None,
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Karma { .. } => "karma",
            Command::Stats { .. } => "stats",
            Command::Leaders => "leaders",
            Command::TopPositive => "top_positive",
            Command::TopNegative => "top_negative",
            Command::Greeting => "greeting",
            Command::Help => "help",
            Command::Malformed { .. } => "malformed",
            Command::None => "none",
        }
    }
}

type Rule = fn(&str, &[&str]) -> Option<Command>;

/// Rule table, in priority order.
const RULES: &[(&str, Rule)] = &[
    ("karma", karma_rule),
    ("stats", stats_rule),
    ("help", help_rule),
    ("greeting", greeting_rule),
    ("leaders", leaders_rule),
    ("top_positive", top_positive_rule),
    ("top_negative", top_negative_rule),
];

pub fn classify(text: &str) -> Command {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Command::None;
    }
    for (name, rule) in RULES {
        if let Some(command) = rule(text, &tokens) {
            tracing::trace!(rule = name, "command rule matched");
            return command;
        }
    }
    Command::None
}

/// Suffix-based delta of a token that passes the karma detection predicate.
pub fn karma_delta(token: &str) -> Option<Delta> {
    let caps = KARMA_TOKEN_RE.captures(token)?;
    match caps.get(1)?.as_str() {
        PLUS_MARKER => Some(Delta::Plus),
        _ => Some(Delta::Minus),
    }
}

/// Strip every karma marker and `@` from a token, then lowercase it.
pub fn normalize_target(token: &str) -> String {
    token
        .replace(PLUS_MARKER, "")
        .replace(MINUS_MARKER, "")
        .replace(EM_DASH_MARKER, "")
        .replace('@', "")
        .to_lowercase()
}

fn contains_marker(token: &str) -> bool {
    token.contains(PLUS_MARKER) || token.contains(MINUS_MARKER) || token.contains(EM_DASH_MARKER)
}

fn karma_rule(_text: &str, tokens: &[&str]) -> Option<Command> {
    let delta = tokens.iter().find_map(|token| karma_delta(token))?;

    // Target lookup is looser than detection: any token carrying a marker anywhere.
    let raw_target = if tokens.len() > 1 {
        tokens.iter().copied().find(|t| contains_marker(t))?
    } else {
        tokens[0]
    };

    Some(Command::Karma {
        target: normalize_target(raw_target),
        delta,
    })
}

fn stats_rule(_text: &str, tokens: &[&str]) -> Option<Command> {
    if tokens[0] != "!karma" {
        return None;
    }
    let target = tokens
        .get(1)
        .copied()
        .map(|t| t.strip_prefix('@').unwrap_or(t))
        .filter(|t| !t.is_empty());
    Some(match target {
        Some(target) => Command::Stats {
            target: target.to_string(),
        },
        None => Command::Malformed { usage: STATS_USAGE },
    })
}

fn help_rule(_text: &str, tokens: &[&str]) -> Option<Command> {
    (tokens[0].to_lowercase() == "!help").then_some(Command::Help)
}

/// Matches any text starting with "hi", including words like "high".
fn greeting_rule(text: &str, _tokens: &[&str]) -> Option<Command> {
    text.to_lowercase().starts_with("hi").then_some(Command::Greeting)
}

fn prefix_rule(text: &str, prefix: &str, command: Command) -> Option<Command> {
    text.to_lowercase().starts_with(prefix).then_some(command)
}

fn leaders_rule(text: &str, _tokens: &[&str]) -> Option<Command> {
    prefix_rule(text, "!karmaleaders", Command::Leaders)
}

fn top_positive_rule(text: &str, _tokens: &[&str]) -> Option<Command> {
    prefix_rule(text, "!karmaplus", Command::TopPositive)
}

fn top_negative_rule(text: &str, _tokens: &[&str]) -> Option<Command> {
    prefix_rule(text, "!karmaminus", Command::TopNegative)
}
