use serde::{Deserialize, Serialize};

/// A question frame. Both fields are required and must not be blank; they
/// are optional here so a missing one can be answered with an error frame.
#[derive(Debug, Default, Deserialize)]
pub struct WsIncomingMessage {
    pub message: Option<String>,
    pub index_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WsOutgoingMessage {
    Answer { reply: String },
    Error { message: String },
}

impl WsOutgoingMessage {
    pub fn error(message: impl Into<String>) -> Self {
        WsOutgoingMessage::Error {
            message: message.into(),
        }
    }
}
