use karmabot::core::command::{Command, classify};
use karmabot::core::config::{BotConfig, Config};
use karmabot::core::error::KarmaError;
use karmabot::core::interpreter::{GREETING_REPLY, HELP_TEXT, IncomingMessage, Interpreter};
use karmabot::core::store::{Delta, KarmaRecord, KarmaStore, Ranking};
use karmabot::core::transport::{RecordingSink, ServeSummary, serve};
use karmabot::plugins::memory::MemoryKarmaStore;
use karmabot::resolve_config;
use std::fs;
use tempfile::tempdir;

const NOW: u64 = 1_700_000_000;

fn bot() -> Interpreter<MemoryKarmaStore> {
    let config = BotConfig {
        self_karma_replies: vec!["Nope.".to_string(), "Not today.".to_string()],
        rng_seed: Some(1),
        ..BotConfig::default()
    };
    Interpreter::new(MemoryKarmaStore::new(), config)
}

fn msg(sender: &str, text: &str) -> IncomingMessage {
    IncomingMessage::new(42, Some(sender), text).at(NOW)
}

#[test]
fn karma_tokens_always_win() {
    let texts = [
        "!karma bob++",
        "!karmaleaders alice--",
        "!help x\u{2014}",
        "hi there bob++",
        "!karmaplus !karmaminus z++",
    ];
    for text in texts {
        assert!(
            matches!(classify(text), Command::Karma { .. }),
            "{} should classify as karma",
            text
        );
    }
}

#[test]
fn first_karma_message_creates_record() {
    let bot = bot();
    let reply = bot.handle_at(&msg("carol", "bob++"), NOW).unwrap();
    assert_eq!(reply.as_deref(), Some("bob's karma is now 1"));
    assert_eq!(
        bot.store().get("bob").unwrap(),
        Some(KarmaRecord {
            name: "bob".to_string(),
            positive_count: 1,
            negative_count: 0,
        })
    );
}

#[test]
fn possessive_suffix_follows_trailing_s() {
    let bot = bot();
    assert_eq!(
        bot.handle_at(&msg("carol", "Chris++"), NOW).unwrap().as_deref(),
        Some("chris' karma is now 1")
    );
    assert_eq!(
        bot.handle_at(&msg("carol", "sam--"), NOW).unwrap().as_deref(),
        Some("sam's karma is now -1")
    );
}

#[test]
fn stats_after_plus_and_minus() {
    let bot = bot();
    bot.handle_at(&msg("carol", "bob++"), NOW).unwrap();
    bot.handle_at(&msg("carol", "bob--"), NOW).unwrap();
    let reply = bot
        .handle_at(&msg("carol", "!karma bob"), NOW)
        .unwrap()
        .unwrap();
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "bob has received karma 2 times.");
    assert_eq!(lines[1], "1 positive karma and 1 negative karma.");
    assert_eq!(lines[2], "For a total karma of 0.");
}

#[test]
fn stats_lookup_is_case_insensitive_and_keeps_display_casing() {
    let bot = bot();
    bot.handle_at(&msg("carol", "dave++"), NOW).unwrap();
    let reply = bot
        .handle_at(&msg("carol", "!karma @Dave"), NOW)
        .unwrap()
        .unwrap();
    assert!(reply.starts_with("Dave has received karma 1 times."));
}

#[test]
fn stats_for_unknown_name() {
    let bot = bot();
    assert_eq!(
        bot.handle_at(&msg("carol", "!karma Zed"), NOW).unwrap().as_deref(),
        Some("Zed has not received karma yet.")
    );
    assert!(bot.store().is_empty());
}

#[test]
fn stats_without_name_is_usage_reply() {
    let bot = bot();
    assert_eq!(
        bot.handle_at(&msg("carol", "!karma"), NOW).unwrap().as_deref(),
        Some("Usage: !karma [name]")
    );
}

#[test]
fn self_karma_is_deflected_from_pool() {
    let bot = bot();
    for text in ["alice++", "@Alice--", "thanks alice++"] {
        let reply = bot.handle_at(&msg("Alice", text), NOW).unwrap().unwrap();
        assert!(
            bot.self_karma_pool().contains(&reply),
            "unexpected reply {:?}",
            reply
        );
        assert!(!reply.contains("karma is now"));
    }
    assert!(bot.store().get("alice").unwrap().is_none());
}

#[test]
fn anonymous_sender_can_give_karma() {
    let bot = bot();
    let reply = bot
        .handle_at(&IncomingMessage::new(1, None, "alice++"), NOW)
        .unwrap();
    assert_eq!(reply.as_deref(), Some("alice's karma is now 1"));
}

#[test]
fn stale_messages_are_dropped() {
    let bot = bot();
    let old = IncomingMessage::new(1, Some("carol"), "bob++").at(NOW - 31);
    assert_eq!(bot.handle_at(&old, NOW).unwrap(), None);
    assert!(bot.store().is_empty());

    let edge = IncomingMessage::new(1, Some("carol"), "bob++").at(NOW - 30);
    assert!(bot.handle_at(&edge, NOW).unwrap().is_some());

    let undated = IncomingMessage::new(1, Some("carol"), "bob++");
    assert!(bot.handle_at(&undated, NOW).unwrap().is_some());
}

#[test]
fn freshness_threshold_is_configurable() {
    let config = BotConfig {
        freshness_threshold_seconds: 0,
        ..BotConfig::default()
    };
    let bot = Interpreter::new(MemoryKarmaStore::new(), config);
    let ancient = IncomingMessage::new(1, Some("carol"), "hi").at(0);
    assert_eq!(
        bot.handle_at(&ancient, NOW).unwrap().as_deref(),
        Some(GREETING_REPLY)
    );
}

#[test]
fn greeting_help_and_silence() {
    let bot = bot();
    assert_eq!(
        bot.handle_at(&msg("carol", "Highway to hell"), NOW)
            .unwrap()
            .as_deref(),
        Some("Hello")
    );
    let help = bot.handle_at(&msg("carol", "!HELP"), NOW).unwrap().unwrap();
    assert_eq!(help, HELP_TEXT);
    for shape in ["[name]++", "[name]--", "!karma [name]", "!karmaleaders", "!karmaplus", "!karmaminus", "!help"] {
        assert!(help.contains(shape), "help is missing {}", shape);
    }
    assert_eq!(bot.handle_at(&msg("carol", "lunch?"), NOW).unwrap(), None);
}

struct BrokenStore;

impl KarmaStore for BrokenStore {
    fn ensure(&self, _name: &str) -> Result<(), KarmaError> {
        Err(KarmaError::StoreUnavailable("down".to_string()))
    }
    fn increment(&self, _name: &str, _delta: Delta) -> Result<KarmaRecord, KarmaError> {
        Err(KarmaError::StoreUnavailable("down".to_string()))
    }
    fn bump(&self, _name: &str, _delta: Delta) -> Result<KarmaRecord, KarmaError> {
        Err(KarmaError::StoreUnavailable("down".to_string()))
    }
    fn get(&self, _name: &str) -> Result<Option<KarmaRecord>, KarmaError> {
        Err(KarmaError::StoreUnavailable("down".to_string()))
    }
    fn rank(&self, _by: Ranking) -> Result<Vec<(String, i64)>, KarmaError> {
        Err(KarmaError::StoreUnavailable("down".to_string()))
    }
}

#[test]
fn store_failures_surface_and_serve_keeps_going() {
    let bot = Interpreter::new(BrokenStore, BotConfig::default());
    let err = bot
        .handle_at(&IncomingMessage::new(1, Some("carol"), "bob++"), NOW)
        .unwrap_err();
    assert!(matches!(err, KarmaError::StoreUnavailable(_)));

    let sink = RecordingSink::new();
    let input = concat!(
        "{\"chat_id\": 1, \"sender\": \"carol\", \"text\": \"bob++\"}\n",
        "{\"chat_id\": 1, \"text\": \"!karmaleaders\"}\n",
        "{\"chat_id\": 1, \"text\": \"hi bot\"}\n",
    );
    let summary = serve(input.as_bytes(), &bot, &sink, || NOW).unwrap();
    assert_eq!(
        summary,
        ServeSummary {
            received: 3,
            replied: 1,
            ignored: 0,
            failed: 2
        }
    );
    assert_eq!(sink.replies()[0].text, "Hello");
}

#[test]
fn serve_applies_freshness_with_clock() {
    let bot = bot();
    let sink = RecordingSink::new();
    let input = format!(
        "{{\"chat_id\": 3, \"sender\": \"carol\", \"text\": \"bob++\", \"timestamp\": {}}}\n\
         {{\"chat_id\": 3, \"sender\": \"carol\", \"text\": \"bob++\", \"timestamp\": {}}}\n",
        NOW - 600,
        NOW - 5
    );
    let summary = serve(input.as_bytes(), &bot, &sink, || NOW).unwrap();
    assert_eq!(summary.replied, 1);
    assert_eq!(summary.ignored, 1);
    assert_eq!(sink.replies()[0].chat_id, 3);
    assert_eq!(sink.replies()[0].text, "bob's karma is now 1");
}

#[test]
fn config_resolution_prefers_cli_db() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("karmabot.toml");
    fs::write(
        &path,
        "[bot]\nleaderboard_size = 3\n\n[store]\npath = \"from_file.sqlite\"\n",
    )
    .unwrap();

    let config = resolve_config(&path, Some(&tmp.path().join("cli.sqlite"))).unwrap();
    assert_eq!(config.bot.leaderboard_size, 3);
    assert_eq!(config.store.path, tmp.path().join("cli.sqlite"));

    let missing = resolve_config(&tmp.path().join("absent.toml"), Some(&path)).unwrap();
    assert_eq!(missing.bot, Config::default().bot);
}
