use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// The fixed column set every board starts with.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultColumn {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl DefaultColumn {
    pub const ALL: [DefaultColumn; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl FromStr for DefaultColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }
}

impl From<DefaultColumn> for Column {
    fn from(column: DefaultColumn) -> Self {
        Column::new(column.as_str(), column.title())
    }
}

/// The unit of synchronization: every task plus the ordered columns that
/// reference them. Always read, mutated and sent as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// The three default columns with no tasks.
    pub fn empty() -> Self {
        Self {
            tasks: BTreeMap::new(),
            columns: DefaultColumn::ALL.into_iter().map(Column::from).collect(),
        }
    }

    /// Example data the server starts with unless seeding is disabled.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let seed = [
            (
                "task-1",
                "Research competitors",
                "Analyze top 5 competitors in the market",
                DefaultColumn::Todo,
                Priority::High,
                ["research", "marketing"],
            ),
            (
                "task-2",
                "Design homepage mockup",
                "Create wireframes for the new homepage",
                DefaultColumn::InProgress,
                Priority::Medium,
                ["design", "ui"],
            ),
            (
                "task-3",
                "Fix login bug",
                "Users are unable to login with Google account",
                DefaultColumn::Done,
                Priority::High,
                ["bug", "auth"],
            ),
        ];

        let mut board = Self::empty();
        for (id, title, description, column, priority, tags) in seed {
            board.tasks.insert(
                id.to_string(),
                Task {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    column_id: column.as_str().to_string(),
                    priority: Some(priority),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    created_at: now,
                    updated_at: now,
                },
            );
            if let Some(col) = board.column_mut(column.as_str()) {
                col.task_ids.push(id.to_string());
            }
        }
        board
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// The column whose sequence currently lists `task_id`.
    pub fn column_of(&self, task_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.task_ids.iter().any(|id| id == task_id))
    }

    /// Tasks of a column in card order. Ids without a task are skipped.
    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.column(column_id)
            .map(|c| c.task_ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Check the structural invariants tying tasks to column sequences.
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        let violated = |reason: String| BoardError::InvariantViolated { reason };

        let mut column_ids = HashSet::new();
        let mut placement: HashMap<&str, &str> = HashMap::new();
        for column in &self.columns {
            if !column_ids.insert(column.id.as_str()) {
                return Err(violated(format!("column {} appears twice", column.id)));
            }
            for task_id in &column.task_ids {
                if let Some(previous) = placement.insert(task_id.as_str(), column.id.as_str()) {
                    return Err(violated(format!(
                        "task {} listed in both {} and {}",
                        task_id, previous, column.id
                    )));
                }
                if !self.tasks.contains_key(task_id) {
                    return Err(violated(format!(
                        "column {} lists unknown task {}",
                        column.id, task_id
                    )));
                }
            }
        }

        for (id, task) in &self.tasks {
            match placement.get(id.as_str()) {
                None => {
                    return Err(violated(format!("task {} is not in any column", id)));
                }
                Some(column_id) if *column_id != task.column_id => {
                    return Err(violated(format!(
                        "task {} has columnId {} but is listed in {}",
                        id, task.column_id, column_id
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
