use thiserror::Error;

/// Errors from the board mutation API.
///
/// Every variant except [`BoardError::InvariantViolated`] is a "not found"
/// class failure: the operation referenced something the board does not
/// have, and the board was left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Task {id} not found")]
    TaskNotFound { id: String },

    #[error("Column {id} not found")]
    ColumnNotFound { id: String },

    #[error("Index {index} out of bounds for column {column_id} (len {len})")]
    IndexOutOfBounds {
        column_id: String,
        index: usize,
        len: usize,
    },

    #[error("Task {task_id} not found at index {index} of column {column_id}")]
    TaskNotAtIndex {
        task_id: String,
        column_id: String,
        index: usize,
    },

    #[error("Board invariant violated: {reason}")]
    InvariantViolated { reason: String },
}

impl BoardError {
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::InvariantViolated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(BoardError::TaskNotFound { id: "t".into() }.is_not_found());
        assert!(BoardError::ColumnNotFound { id: "c".into() }.is_not_found());
        assert!(
            BoardError::IndexOutOfBounds {
                column_id: "todo".into(),
                index: 4,
                len: 1
            }
            .is_not_found()
        );
        assert!(
            !BoardError::InvariantViolated {
                reason: "dup".into()
            }
            .is_not_found()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = BoardError::TaskNotFound {
            id: "task-9".into(),
        };
        assert_eq!(err.to_string(), "Task task-9 not found");

        let err = BoardError::IndexOutOfBounds {
            column_id: "done".into(),
            index: 3,
            len: 1,
        };
        assert_eq!(
            err.to_string(),
            "Index 3 out of bounds for column done (len 1)"
        );
    }
}
