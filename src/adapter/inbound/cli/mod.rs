//! CLI module graph.

pub mod chains;
pub mod check;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod menu;
pub mod operator;
pub mod output;
pub mod paths;
pub mod run;
