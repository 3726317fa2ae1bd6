//! Library entry point for the sheriff CLI.

pub mod backend;
pub mod changeset;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod eligibility;
pub mod error;
pub mod gate;
pub mod model;
pub mod report;
pub mod scanner;
pub mod utils;
