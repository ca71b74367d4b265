//! nasdeploy library
//!
//! Core modules of the easyNAS deployment orchestrator.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
