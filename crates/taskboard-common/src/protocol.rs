use serde::{Deserialize, Serialize};

use crate::model::Board;

pub const BOARD_UPDATE_EVENT: &str = "board-update";
pub const UPDATE_BOARD_EVENT: &str = "update-board";

// ── Realtime message types ───────────────────────────────────────────

/// One frame on the realtime channel: `{"event": ..., "data": <Board>}`.
///
/// Both directions carry the whole board. There is no per-operation
/// message; the receiver cannot tell what edit produced the state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum SyncMessage {
    /// Server → client.
    #[serde(rename = "board-update")]
    BoardUpdate(Board),
    /// Client → server: replace the canonical board.
    #[serde(rename = "update-board")]
    UpdateBoard(Board),
}

impl SyncMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::BoardUpdate(_) => BOARD_UPDATE_EVENT,
            Self::UpdateBoard(_) => UPDATE_BOARD_EVENT,
        }
    }

    pub fn board(&self) -> &Board {
        match self {
            Self::BoardUpdate(board) | Self::UpdateBoard(board) => board,
        }
    }

    pub fn into_board(self) -> Board {
        match self {
            Self::BoardUpdate(board) | Self::UpdateBoard(board) => board,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_update_serialization() {
        let msg = SyncMessage::BoardUpdate(Board::seeded());
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"event\":\"board-update\""));
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"title\":\"Research competitors\""));
    }

    #[test]
    fn test_update_board_envelope_shape() {
        let msg = SyncMessage::UpdateBoard(Board::empty());
        let parsed: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed["event"], UPDATE_BOARD_EVENT);
        assert!(parsed["data"]["tasks"].is_object());
        assert_eq!(parsed["data"]["columns"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_client_update_board_frame() {
        let frame = serde_json::json!({
            "event": "update-board",
            "data": {
                "tasks": {
                    "abc": {
                        "id": "abc",
                        "title": "From the browser",
                        "columnId": "done",
                        "createdAt": "2024-05-01T10:00:00.000Z",
                        "updatedAt": "2024-05-01T10:00:00.000Z"
                    }
                },
                "columns": [
                    {"id": "todo", "title": "To Do", "taskIds": []},
                    {"id": "done", "title": "Done", "taskIds": ["abc"]}
                ]
            }
        })
        .to_string();

        let msg = SyncMessage::from_json(&frame).unwrap();
        assert_eq!(msg.event_name(), UPDATE_BOARD_EVENT);
        let board = msg.into_board();
        assert_eq!(board.tasks["abc"].title, "From the browser");
        assert_eq!(board.columns.len(), 2);
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let frame = r#"{"event":"delete-everything","data":{}}"#;
        assert!(SyncMessage::from_json(frame).is_err());
    }

    #[test]
    fn test_board_accessor() {
        let msg = SyncMessage::BoardUpdate(Board::seeded());
        assert_eq!(msg.board().task_count(), 3);
        assert_eq!(msg.event_name(), BOARD_UPDATE_EVENT);
    }
}
