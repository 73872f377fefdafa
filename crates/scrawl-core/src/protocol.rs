//! Wire protocol shared with the relay.
//!
//! One canonical event shape covers the whole stroke lifecycle plus the
//! payload-less history controls. Messages are JSON with a `type` tag:
//!
//! ```json
//! { "type": "begin", "author_id": "…", "x": 0.0, "y": 0.0,
//!   "color": "#ff0000", "size": 5.0, "brush": "normal" }
//! { "type": "extend", "author_id": "…", "x": 10.0, "y": 0.0 }
//! { "type": "end", "author_id": "…", "x": 10.0, "y": 0.0 }
//! { "type": "undo" }
//! { "type": "welcome", "peer_id": "…" }
//! ```
//!
//! `color`, `size` and `brush` travel only on `begin`; they are fixed for the
//! stroke's lifetime. The relay forwards everything verbatim and never echoes
//! an event back to its sender.

use crate::stroke::{BrushKind, Rgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Everything that crosses the relay, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    /// Sent by the relay once on connect with the identity it assigned us.
    Welcome { peer_id: String },
    /// An author put the pointer down. Style is fixed from here on.
    Begin {
        author_id: String,
        x: f64,
        y: f64,
        color: Rgb,
        size: f64,
        brush: BrushKind,
    },
    /// An author moved the pointer with the button held.
    Extend { author_id: String, x: f64, y: f64 },
    /// An author lifted the pointer.
    End { author_id: String, x: f64, y: f64 },
    /// Pop the most recent completed stroke, whoever drew it.
    Undo,
    /// Push the most recently undone stroke back.
    Redo,
}

impl WireEvent {
    pub fn decode(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The authoring peer, for events that carry one.
    pub fn author_id(&self) -> Option<&str> {
        match self {
            WireEvent::Begin { author_id, .. }
            | WireEvent::Extend { author_id, .. }
            | WireEvent::End { author_id, .. } => Some(author_id),
            _ => None,
        }
    }
}
