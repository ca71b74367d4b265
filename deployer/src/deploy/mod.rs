//! Deployment module

pub mod config;
pub mod git;
pub mod network;
pub mod orchestrator;
pub mod process;
pub mod prompt;
pub mod runner;
pub mod venv;
