//! JSON wire format for actions and state.
//!
//! Actions travel as `{"type": "<kind>", "payload": {...}}` envelopes:
//!
//! ```json
//! {"type": "add-todo", "payload": {"name": "buy milk"}}
//! {"type": "toggle-todo", "payload": {"id": 3}}
//! {"type": "delete-todo", "payload": {"id": 3}}
//! ```
//!
//! Any other `type`, or a known `type` missing the field it needs, decodes to
//! [`TodoAction::Unknown`] so the reducer treats it as the identity. Only text
//! that is not a JSON envelope at all is an error.

use crate::types::{TodoAction, TodoId, TodoList};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from encoding or decoding wire messages
#[derive(Error, Debug)]
pub enum WireError {
    /// The message is not a valid JSON action envelope
    #[error("Invalid action message: {0}")]
    Json(#[from] serde_json::Error),
}

/// An action as it appears on the wire
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Action kind tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Fields the action kind needs
    #[serde(default)]
    pub payload: Option<Payload>,
}

/// Union of the fields any action kind carries
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Item name, for `add-todo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Item id, for `toggle-todo` and `delete-todo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
}

impl From<&TodoAction> for ActionEnvelope {
    fn from(action: &TodoAction) -> Self {
        let (kind, payload) = match action {
            TodoAction::Add { name } => (
                action.kind().to_string(),
                Payload {
                    name: Some(name.clone()),
                    id: None,
                },
            ),
            TodoAction::Toggle { id } | TodoAction::Delete { id } => (
                action.kind().to_string(),
                Payload {
                    name: None,
                    id: Some(*id),
                },
            ),
            TodoAction::Unknown { kind } => (kind.clone(), Payload::default()),
        };

        Self {
            kind,
            payload: Some(payload),
        }
    }
}

impl From<ActionEnvelope> for TodoAction {
    fn from(envelope: ActionEnvelope) -> Self {
        let ActionEnvelope { kind, payload } = envelope;
        let payload = payload.unwrap_or_default();

        let action = match kind.as_str() {
            "add-todo" => payload.name.map(|name| Self::Add { name }),
            "toggle-todo" => payload.id.map(|id| Self::Toggle { id }),
            "delete-todo" => payload.id.map(|id| Self::Delete { id }),
            _ => return Self::Unknown { kind },
        };

        action.unwrap_or_else(|| {
            tracing::warn!(kind = %kind, "Action payload is missing a required field");
            Self::Unknown { kind }
        })
    }
}

/// Decode one action message
///
/// # Errors
///
/// Returns [`WireError::Json`] if `message` is not a JSON object with a
/// string `type` field.
pub fn decode_action(message: &str) -> Result<TodoAction, WireError> {
    let envelope: ActionEnvelope = serde_json::from_str(message)?;
    Ok(envelope.into())
}

/// Encode one action as a single-line message
///
/// # Errors
///
/// Returns [`WireError::Json`] if serialization fails.
pub fn encode_action(action: &TodoAction) -> Result<String, WireError> {
    Ok(serde_json::to_string(&ActionEnvelope::from(action))?)
}

/// Encode the list as a single-line JSON array of items
///
/// # Errors
///
/// Returns [`WireError::Json`] if serialization fails.
pub fn encode_list(list: &TodoList) -> Result<String, WireError> {
    Ok(serde_json::to_string(list)?)
}
