//! Battle log export to CSV (and back) for offline inspection.
//!
//! Columns: `turn`, `type`, `timestamp`, `text`. One row per message in log order.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::combat::log::{BattleMessage, MessageType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CsvRow {
    turn: u32,
    #[serde(rename = "type")]
    message_type: MessageType,
    timestamp: i64,
    text: String,
}

impl From<&BattleMessage> for CsvRow {
    fn from(message: &BattleMessage) -> Self {
        Self {
            turn: message.turn,
            message_type: message.message_type,
            timestamp: message.timestamp,
            text: message.text.clone(),
        }
    }
}

impl From<CsvRow> for BattleMessage {
    fn from(row: CsvRow) -> Self {
        Self {
            text: row.text,
            message_type: row.message_type,
            timestamp: row.timestamp,
            turn: row.turn,
        }
    }
}

pub fn write_battle_csv<W: Write>(messages: &[BattleMessage], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for message in messages {
        out.serialize(CsvRow::from(message))?;
    }
    out.flush()?;
    Ok(())
}

pub fn battle_log_to_csv(messages: &[BattleMessage]) -> Result<String, String> {
    let mut buffer = Vec::new();
    write_battle_csv(messages, &mut buffer).map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

/// Reads a log written by [write_battle_csv].
pub fn parse_battle_csv(raw: &str) -> Result<Vec<BattleMessage>, String> {
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(BattleMessage::from).map_err(|e| e.to_string()))
        .collect()
}
