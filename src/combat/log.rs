use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    Damage,
    Critical,
    Heal,
    Status,
    Miss,
    Start,
    End,
    Normal,
}

impl MessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Critical => "critical",
            Self::Heal => "heal",
            Self::Status => "status",
            Self::Miss => "miss",
            Self::Start => "start",
            Self::End => "end",
            Self::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleMessage {
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Host clock, milliseconds.
    pub timestamp: i64,
    pub turn: u32,
}

/// Append-only message log of one battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    messages: Vec<BattleMessage>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        message_type: MessageType,
        text: impl Into<String>,
        timestamp: i64,
        turn: u32,
    ) {
        self.messages.push(BattleMessage {
            text: text.into(),
            message_type,
            timestamp,
            turn,
        });
    }

    pub fn messages(&self) -> &[BattleMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count(&self, message_type: MessageType) -> usize {
        self.messages
            .iter()
            .filter(|m| m.message_type == message_type)
            .count()
    }
}
