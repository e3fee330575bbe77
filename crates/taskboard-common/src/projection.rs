//! Client-side mirror of the board.
//!
//! Local edits are applied optimistically through the same mutation API the
//! server uses, and each one yields the whole resulting board as an
//! `update-board` message for the caller to send. Remote `board-update`
//! messages replace the mirror wholesale; nothing is merged against
//! in-flight local edits, so a remote update that lands mid-drag is lost
//! once the drag result is sent.

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::model::{Board, Task};
use crate::protocol::SyncMessage;
use crate::store::{BoardStore, MoveTask, NewTask, TaskPatch};

/// Result of a local edit plus the message to publish, if any.
pub type LocalEdit<T> = (T, Option<SyncMessage>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropLocation {
    pub column_id: String,
    pub index: usize,
}

/// What the drag-and-drop layer reports when a card is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragResult {
    pub task_id: String,
    pub source: DropLocation,
    /// `None` when the card was dropped outside every column.
    pub destination: Option<DropLocation>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientProjection {
    store: BoardStore,
    connected: bool,
}

impl ClientProjection {
    /// Empty default columns, not yet connected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// While disconnected, local edits still apply but produce no outbound
    /// message.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Adopt the board returned by the bootstrap fetch.
    pub fn apply_bootstrap(&mut self, board: Board) {
        self.store.replace(board);
    }

    /// Fold in a server push. Returns `false` for messages that are not
    /// `board-update`.
    pub fn apply_remote(&mut self, msg: SyncMessage) -> bool {
        match msg {
            SyncMessage::BoardUpdate(board) => {
                self.store.replace(board);
                true
            }
            SyncMessage::UpdateBoard(_) => {
                tracing::debug!("ignoring update-board frame received from server");
                false
            }
        }
    }

    pub fn add_task(&mut self, input: NewTask) -> Result<LocalEdit<Task>, BoardError> {
        let task = self.store.create_task(input)?;
        Ok((task, self.outbound()))
    }

    pub fn update_task(
        &mut self,
        id: &str,
        patch: TaskPatch,
    ) -> Result<LocalEdit<Task>, BoardError> {
        let task = self.store.update_task(id, patch)?;
        Ok((task, self.outbound()))
    }

    pub fn delete_task(&mut self, id: &str) -> Result<LocalEdit<Task>, BoardError> {
        let task = self.store.delete_task(id)?;
        Ok((task, self.outbound()))
    }

    /// Apply a completed drag against the current column sequences.
    ///
    /// Drops outside a column and drops back onto the starting slot are
    /// no-ops and publish nothing.
    pub fn drag_end(&mut self, drag: &DragResult) -> Result<Option<SyncMessage>, BoardError> {
        let Some(destination) = &drag.destination else {
            return Ok(None);
        };
        if *destination == drag.source {
            return Ok(None);
        }

        let moved = self.store.move_task(&MoveTask {
            task_id: drag.task_id.clone(),
            from_column_id: drag.source.column_id.clone(),
            from_index: drag.source.index,
            to_column_id: destination.column_id.clone(),
            to_index: destination.index,
        })?;
        Ok(if moved { self.outbound() } else { None })
    }

    fn outbound(&self) -> Option<SyncMessage> {
        self.connected
            .then(|| SyncMessage::UpdateBoard(self.store.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn connected_projection() -> ClientProjection {
        let mut projection = ClientProjection::new();
        projection.apply_bootstrap(Board::seeded());
        projection.set_connected(true);
        projection
    }

    fn drop_at(column_id: &str, index: usize) -> DropLocation {
        DropLocation {
            column_id: column_id.to_string(),
            index,
        }
    }

    #[test]
    fn test_new_projection_is_empty_and_disconnected() {
        let projection = ClientProjection::new();
        assert_eq!(projection.board(), &Board::empty());
        assert!(!projection.is_connected());
    }

    #[test]
    fn test_add_task_applies_locally_and_emits_whole_board() {
        let mut projection = connected_projection();
        let (task, outbound) = projection
            .add_task(NewTask {
                title: "Plan sprint".into(),
                priority: Some(Priority::Medium),
                ..Default::default()
            })
            .unwrap();

        assert!(projection.board().tasks.contains_key(&task.id));
        let msg = outbound.expect("connected projection should emit");
        assert!(matches!(msg, SyncMessage::UpdateBoard(_)));
        assert_eq!(msg.board(), projection.board());
    }

    #[test]
    fn test_disconnected_edits_stay_local() {
        let mut projection = ClientProjection::new();
        projection.apply_bootstrap(Board::seeded());

        let (_, outbound) = projection.delete_task("task-1").unwrap();
        assert!(outbound.is_none());
        assert!(!projection.board().tasks.contains_key("task-1"));
    }

    #[test]
    fn test_update_task_column_change_emits() {
        let mut projection = connected_projection();
        let (task, outbound) = projection
            .update_task(
                "task-1",
                TaskPatch {
                    column_id: Some("done".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(task.column_id, "done");
        let board = outbound.unwrap().into_board();
        assert_eq!(board.column("done").unwrap().task_ids, vec!["task-3", "task-1"]);
        assert!(board.column("todo").unwrap().task_ids.is_empty());
    }

    #[test]
    fn test_remote_update_replaces_mirror_wholesale() {
        let mut projection = connected_projection();
        projection
            .add_task(NewTask {
                title: "local only".into(),
                ..Default::default()
            })
            .unwrap();

        let remote = Board::empty();
        assert!(projection.apply_remote(SyncMessage::BoardUpdate(remote.clone())));
        assert_eq!(projection.board(), &remote);
    }

    #[test]
    fn test_update_board_from_server_is_ignored() {
        let mut projection = connected_projection();
        assert!(!projection.apply_remote(SyncMessage::UpdateBoard(Board::empty())));
        assert_eq!(projection.board().task_count(), 3);
    }

    #[test]
    fn test_drag_across_columns() {
        let mut projection = connected_projection();
        let outbound = projection
            .drag_end(&DragResult {
                task_id: "task-1".into(),
                source: drop_at("todo", 0),
                destination: Some(drop_at("in-progress", 1)),
            })
            .unwrap()
            .unwrap();

        let board = outbound.board();
        assert!(board.column("todo").unwrap().task_ids.is_empty());
        assert_eq!(
            board.column("in-progress").unwrap().task_ids,
            vec!["task-2", "task-1"]
        );
        assert_eq!(board.tasks["task-1"].column_id, "in-progress");
    }

    #[test]
    fn test_drag_without_destination_is_noop() {
        let mut projection = connected_projection();
        let before = projection.board().clone();
        let outbound = projection
            .drag_end(&DragResult {
                task_id: "task-1".into(),
                source: drop_at("todo", 0),
                destination: None,
            })
            .unwrap();
        assert!(outbound.is_none());
        assert_eq!(projection.board(), &before);
    }

    #[test]
    fn test_drag_to_same_slot_is_noop() {
        let mut projection = connected_projection();
        let before = projection.board().clone();
        let outbound = projection
            .drag_end(&DragResult {
                task_id: "task-2".into(),
                source: drop_at("in-progress", 0),
                destination: Some(drop_at("in-progress", 0)),
            })
            .unwrap();
        assert!(outbound.is_none());
        assert_eq!(projection.board(), &before);
    }

    #[test]
    fn test_drag_uses_current_sequences_after_remote_update() {
        let mut projection = connected_projection();

        // A remote client emptied the todo column while our drag was in flight.
        let mut remote = Board::seeded();
        remote.tasks.remove("task-1");
        remote.column_mut("todo").unwrap().task_ids.clear();
        projection.apply_remote(SyncMessage::BoardUpdate(remote.clone()));

        let err = projection
            .drag_end(&DragResult {
                task_id: "task-1".into(),
                source: drop_at("todo", 0),
                destination: Some(drop_at("done", 0)),
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(projection.board(), &remote);
    }

    #[test]
    fn test_local_edit_after_remote_update_carries_remote_state() {
        let mut projection = connected_projection();
        let mut remote = Board::seeded();
        remote.tasks.get_mut("task-2").unwrap().title = "Renamed remotely".into();
        projection.apply_remote(SyncMessage::BoardUpdate(remote));

        let outbound = projection
            .drag_end(&DragResult {
                task_id: "task-3".into(),
                source: drop_at("done", 0),
                destination: Some(drop_at("todo", 0)),
            })
            .unwrap()
            .unwrap();
        assert_eq!(outbound.board().tasks["task-2"].title, "Renamed remotely");
        assert_eq!(
            outbound.board().column("todo").unwrap().task_ids,
            vec!["task-3", "task-1"]
        );
    }
}
