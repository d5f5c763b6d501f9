use karmabot::core::config::BotConfig;
use karmabot::core::interpreter::{IncomingMessage, Interpreter};
use karmabot::core::store::{Delta, KarmaStore};
use karmabot::plugins::memory::MemoryKarmaStore;

fn leaderboard_store() -> MemoryKarmaStore {
    MemoryKarmaStore::with_records(vec![
        ("a".to_string(), 5, 0),
        ("b".to_string(), 4, 1),
        ("c".to_string(), 3, 0),
        ("d".to_string(), 0, 1),
    ])
}

#[test]
fn test_leaders_ranks_by_net_with_insertion_tie_break() {
    let bot = Interpreter::new(leaderboard_store(), BotConfig::default());
    let reply = bot
        .handle_at(&IncomingMessage::new(1, None, "!karmaleaders"), 0)
        .unwrap()
        .unwrap();
    assert_eq!(
        reply,
        "Karma leaders:\n1. a: 5\n2. b: 3\n3. c: 3\n4. d: -1"
    );
}

#[test]
fn test_leaderboards_truncate_to_configured_size() {
    let store = MemoryKarmaStore::new();
    for i in 0..8 {
        for _ in 0..=i {
            store.bump(&format!("n{}", i), Delta::Plus).unwrap();
        }
    }
    let bot = Interpreter::new(store, BotConfig::default());
    let reply = bot
        .handle_at(&IncomingMessage::new(1, None, "!karmaplus"), 0)
        .unwrap()
        .unwrap();
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Most positive karma:");
    assert_eq!(lines[1], "1. n7: 8");
    assert_eq!(lines[5], "5. n3: 4");

    let config = BotConfig {
        leaderboard_size: 2,
        ..BotConfig::default()
    };
    let small = Interpreter::new(leaderboard_store(), config);
    let reply = small
        .handle_at(&IncomingMessage::new(1, None, "!karmaleaders"), 0)
        .unwrap()
        .unwrap();
    assert_eq!(reply.lines().count(), 3);
}

#[test]
fn test_top_negative() {
    let bot = Interpreter::new(leaderboard_store(), BotConfig::default());
    let reply = bot
        .handle_at(&IncomingMessage::new(1, None, "!karmaminus"), 0)
        .unwrap()
        .unwrap();
    assert!(reply.starts_with("Most negative karma:\n1. b: 1\n2. d: 1\n"));
}

#[test]
fn test_empty_leaderboard() {
    let bot = Interpreter::new(MemoryKarmaStore::new(), BotConfig::default());
    let reply = bot
        .handle_at(&IncomingMessage::new(1, None, "!karmaleaders"), 0)
        .unwrap()
        .unwrap();
    assert_eq!(reply, "Karma leaders:\nNobody has received karma yet.");
}

#[test]
fn test_mixed_sequence_is_order_independent_across_names() {
    let store = MemoryKarmaStore::new();
    let ops = [
        ("x", Delta::Plus),
        ("y", Delta::Minus),
        ("x", Delta::Minus),
        ("y", Delta::Plus),
        ("x", Delta::Plus),
    ];
    for (name, delta) in ops {
        store.bump(name, delta).unwrap();
    }
    assert_eq!(store.get("x").unwrap().unwrap().net(), 1);
    assert_eq!(store.get("y").unwrap().unwrap().net(), 0);
}
