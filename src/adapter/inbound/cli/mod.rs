//! CLI module graph.

pub mod cache;
pub mod command;
pub mod dispatch;
pub mod export;
pub mod health;
pub mod history;
pub mod operator;
pub mod output;
pub mod snapshot;
