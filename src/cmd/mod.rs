//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module   | Commands handled                             |
//! |----------|----------------------------------------------|
//! | `serve`  | `Serve`                                      |
//! | `board`  | `Board`, `Add`, `Update`, `Delete`, `Move`   |
//! | `watch`  | `Watch`                                      |
//! | `config` | `Config`                                     |

pub mod board;
pub mod config;
pub mod serve;
pub mod watch;

pub use board::{
    UpdateArgs, cmd_add, cmd_board, cmd_delete, cmd_move, cmd_update, new_task, server_url,
    task_patch,
};
pub use config::cmd_config;
pub use serve::cmd_serve;
pub use watch::cmd_watch;
