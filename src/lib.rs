pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod watch;
pub mod web;
