//! Shared domain types for the taskboard server and its clients.
//!
//! Nothing in this crate touches the network. The server wraps a
//! [`BoardStore`] behind its sync hub; clients wrap one inside a
//! [`ClientProjection`].

pub mod error;
pub mod model;
pub mod projection;
pub mod protocol;
pub mod store;

pub use error::BoardError;
pub use model::{Board, Column, DefaultColumn, Priority, Task};
pub use projection::{ClientProjection, DragResult, DropLocation};
pub use protocol::SyncMessage;
pub use store::{BoardStore, MoveTask, NewTask, TaskPatch};
