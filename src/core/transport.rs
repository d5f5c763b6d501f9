//! Line-oriented JSON transport.
//!
//! Each input line is one `IncomingMessage`; each reply is written as one
//! `{"chat_id": .., "text": ..}` line. Messages are processed one at a time,
//! so mutations land in receipt order.

use crate::core::error::KarmaError;
use crate::core::interpreter::{IncomingMessage, Interpreter};
use crate::core::store::KarmaStore;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingReply {
    pub chat_id: i64,
    pub text: String,
}

/// Fire-and-forget reply channel. Delivery failures are the sink's problem.
pub trait ReplySink {
    fn send_reply(&self, chat_id: i64, text: &str);
}

/// Writes one JSON object per reply to any writer.
pub struct JsonLinesSink<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write> ReplySink for JsonLinesSink<W> {
    fn send_reply(&self, chat_id: i64, text: &str) {
        let reply = OutgoingReply {
            chat_id,
            text: text.to_string(),
        };
        let line = match serde_json::to_string(&reply) {
            Ok(line) => line,
            Err(e) => {
                warn!(chat_id, error = %e, "failed to encode reply");
                return;
            }
        };
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!(chat_id, error = %e, "failed to send reply");
        }
    }
}

/// Collects replies in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<OutgoingReply>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<OutgoingReply> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ReplySink for RecordingSink {
    fn send_reply(&self, chat_id: i64, text: &str) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(OutgoingReply {
                chat_id,
                text: text.to_string(),
            });
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServeSummary {
    pub received: usize,
    pub replied: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// Process a single message and forward any reply to `sink`.
pub fn deliver<S: KarmaStore, K: ReplySink + ?Sized>(
    interpreter: &Interpreter<S>,
    sink: &K,
    message: &IncomingMessage,
    now: u64,
) -> Result<bool, KarmaError> {
    match interpreter.handle_at(message, now)? {
        Some(reply) => {
            sink.send_reply(message.chat_id, &reply);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Read messages from `input` until EOF. A failure on one message is logged
/// and counted; the loop keeps going. Only a read error on `input` stops it.
pub fn serve<R, S, K, C>(
    input: R,
    interpreter: &Interpreter<S>,
    sink: &K,
    mut clock: C,
) -> Result<ServeSummary, KarmaError>
where
    R: BufRead,
    S: KarmaStore,
    K: ReplySink + ?Sized,
    C: FnMut() -> u64,
{
    let mut summary = ServeSummary::default();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        summary.received += 1;

        let message: IncomingMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "skipping unparseable message");
                summary.failed += 1;
                continue;
            }
        };

        match deliver(interpreter, sink, &message, clock()) {
            Ok(true) => summary.replied += 1,
            Ok(false) => summary.ignored += 1,
            Err(e) => {
                warn!(chat_id = message.chat_id, error = %e, "message handling failed");
                summary.failed += 1;
            }
        }
    }
    info!(
        received = summary.received,
        replied = summary.replied,
        ignored = summary.ignored,
        failed = summary.failed,
        "input closed"
    );
    Ok(summary)
}
