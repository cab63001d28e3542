pub mod cmds;
pub mod config;
pub mod date;
pub mod dialog;
pub mod error;
pub mod events;
pub mod limiter;
pub mod registry;
pub mod ui;
