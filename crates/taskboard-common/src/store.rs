//! Board Store and the mutation API.
//!
//! [`BoardStore`] owns a single [`Board`] and exposes the only operations
//! that change it. Each operation validates everything it needs before it
//! touches the board, so a failed call leaves the board exactly as it was.
//! Nothing here performs I/O; the caller decides whether and how to publish
//! the resulting state.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BoardError;
use crate::model::{Board, Column, DefaultColumn, Priority, Task};

/// Input for [`BoardStore::create_task`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Target column; the `todo` column when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
}

/// Partial update for [`BoardStore::update_task`]. `None` keeps the
/// existing value. For `description` and `priority` an explicit JSON `null`
/// (`Some(None)`) clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub priority: Option<Option<Priority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
}

/// A reorder request: take the id at `from_index` of the source column and
/// insert it at `to_index` of the destination column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub task_id: String,
    pub from_column_id: String,
    pub from_index: usize,
    pub to_column_id: String,
    pub to_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    board: Board,
}

impl BoardStore {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Adopt `board` verbatim and hand back the one it replaced.
    ///
    /// No validation and no merge: whatever arrives last wins.
    pub fn replace(&mut self, board: Board) -> Board {
        std::mem::replace(&mut self.board, board)
    }

    /// Create a task at the end of its column. The title is not
    /// re-validated here.
    pub fn create_task(&mut self, input: NewTask) -> Result<Task, BoardError> {
        let column_id = input
            .column_id
            .unwrap_or_else(|| DefaultColumn::default().as_str().to_string());
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            column_id: column_id.clone(),
            priority: input.priority,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        };

        self.column_mut(&column_id)?.task_ids.push(task.id.clone());
        self.board.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Merge `patch` over an existing task.
    ///
    /// A column change drops the id from its old sequence and appends it to
    /// the end of the new one; the old position is not preserved.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, BoardError> {
        let mut task = self
            .board
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| task_not_found(id))?;

        let column_changed = patch
            .column_id
            .as_deref()
            .is_some_and(|target| target != task.column_id);
        if let Some(target) = patch.column_id.as_deref().filter(|_| column_changed) {
            self.column(target)?;
        }

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(column_id) = patch.column_id {
            task.column_id = column_id;
        }
        task.updated_at = Utc::now();

        if column_changed {
            self.unlist(id);
            self.column_mut(&task.column_id)?.task_ids.push(id.to_string());
        }
        self.board.tasks.insert(id.to_string(), task.clone());
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, BoardError> {
        let task = self
            .board
            .tasks
            .remove(id)
            .ok_or_else(|| task_not_found(id))?;
        self.unlist(id);
        Ok(task)
    }

    /// Reorder a task within or across columns.
    ///
    /// Returns `Ok(false)` without touching the board when source and
    /// destination are the same column and index. Within one column
    /// `to_index` addresses the list after the task has been removed.
    pub fn move_task(&mut self, mv: &MoveTask) -> Result<bool, BoardError> {
        if !self.board.tasks.contains_key(&mv.task_id) {
            return Err(task_not_found(&mv.task_id));
        }

        let source = self.column(&mv.from_column_id)?;
        let source_len = source.task_ids.len();
        if mv.from_index >= source_len {
            return Err(BoardError::IndexOutOfBounds {
                column_id: mv.from_column_id.clone(),
                index: mv.from_index,
                len: source_len,
            });
        }
        if source.task_ids[mv.from_index] != mv.task_id {
            return Err(BoardError::TaskNotAtIndex {
                task_id: mv.task_id.clone(),
                column_id: mv.from_column_id.clone(),
                index: mv.from_index,
            });
        }

        let same_column = mv.from_column_id == mv.to_column_id;
        let (dest_len, insert_limit) = if same_column {
            (source_len, source_len - 1)
        } else {
            let len = self.column(&mv.to_column_id)?.task_ids.len();
            (len, len)
        };
        if mv.to_index > insert_limit {
            return Err(BoardError::IndexOutOfBounds {
                column_id: mv.to_column_id.clone(),
                index: mv.to_index,
                len: dest_len,
            });
        }

        if same_column && mv.from_index == mv.to_index {
            return Ok(false);
        }

        let task_id = self
            .column_mut(&mv.from_column_id)?
            .task_ids
            .remove(mv.from_index);
        self.column_mut(&mv.to_column_id)?
            .task_ids
            .insert(mv.to_index, task_id);

        let moved_task = self.board.tasks.get_mut(&mv.task_id);
        if let Some(task) = moved_task.filter(|_| !same_column) {
            task.column_id = mv.to_column_id.clone();
            task.updated_at = Utc::now();
        }
        Ok(true)
    }

    fn column(&self, id: &str) -> Result<&Column, BoardError> {
        self.board
            .column(id)
            .ok_or_else(|| BoardError::ColumnNotFound { id: id.to_string() })
    }

    fn column_mut(&mut self, id: &str) -> Result<&mut Column, BoardError> {
        self.board
            .column_mut(id)
            .ok_or_else(|| BoardError::ColumnNotFound { id: id.to_string() })
    }

    /// Drop `id` from every column sequence.
    fn unlist(&mut self, id: &str) {
        for column in &mut self.board.columns {
            column.task_ids.retain(|t| t != id);
        }
    }
}

fn task_not_found(id: &str) -> BoardError {
    BoardError::TaskNotFound { id: id.to_string() }
}
