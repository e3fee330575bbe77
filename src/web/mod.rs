//! HTTP and WebSocket surface for the shared board.
//!
//! REST mutations and `update-board` frames both go through the one
//! [`hub::SyncHub`], which owns the board and fans out `board-update`s.

pub mod api;
pub mod hub;
pub mod server;
pub mod ws;
